//! Time-boxed response cache with in-flight request deduplication.
//!
//! [`ResponseCache`] maps string keys to the last successfully fetched value
//! for that key. Each key moves through `Empty → Pending → Fresh → Stale →
//! Pending → …` (see [`EntryState`]). Failed fetches are never stored.
//!
//! # Deduplication
//!
//! The first caller that finds a key empty or stale records a shared fetch
//! future on the entry *while holding the store lock*. Every later caller for
//! the same key finds that record and awaits it instead of deciding on its
//! own to fetch, so at most one fetch per key is in flight and all of its
//! waiters see the same result.
//!
//! # Cancellation
//!
//! The fetch itself runs on a spawned tokio task. Dropping a caller's future
//! (e.g. a view torn down mid-load) only stops that caller from waiting; the
//! task still completes and populates the entry for future callers. A fetch
//! that panics settles the entry like any other failed fetch, even when no
//! caller is waiting on it.

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use futures_util::FutureExt;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use super::entry::{EntryState, InFlight, SharedFetch, Slot, Snapshot, Stored};
use super::options::{CacheOptions, RevalidateMode};
use crate::clock::{Clock, TokioClock};
use crate::telemetry;
use crate::{Result, ScoutboardError};

/// Keyed, TTL-bounded cache of fetched responses.
///
/// Cheap to clone: clones share the same store. Instances are independent of
/// each other; distinct keys never share entries, in-flight fetches, or
/// errors.
///
/// ```rust,no_run
/// # use std::time::Duration;
/// # use scoutboard::{CacheOptions, ResponseCache};
/// # async fn example() -> scoutboard::Result<()> {
/// let cache: ResponseCache<Vec<String>> = ResponseCache::new("players");
/// let options = CacheOptions::new(Duration::from_secs(300));
///
/// let players = cache
///     .get("players-leaders", || async { Ok(vec!["McDavid".to_string()]) }, &options)
///     .await?;
/// assert_eq!(players.len(), 1);
/// # Ok(())
/// # }
/// ```
pub struct ResponseCache<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for ResponseCache<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> std::fmt::Debug for ResponseCache<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCache")
            .field("name", &self.inner.name)
            .field("entries", &self.inner.lock_slots().len())
            .finish()
    }
}

struct Inner<T> {
    name: String,
    clock: Arc<dyn Clock>,
    slots: Mutex<HashMap<String, Slot<T>>>,
    next_fetch_id: AtomicU64,
}

impl<T> Inner<T> {
    /// Critical sections never panic midway, so a poisoned lock still guards
    /// consistent data.
    fn lock_slots(&self) -> MutexGuard<'_, HashMap<String, Slot<T>>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply the outcome of fetch `id` for `key`.
    ///
    /// Only the fetch currently recorded on the entry may write; anything
    /// else is handed back to its waiters but not stored.
    fn complete(&self, key: &str, id: u64, started: Instant, result: Result<T>) -> Result<Arc<T>> {
        let now = self.clock.now();
        let elapsed = now.saturating_duration_since(started);
        metrics::histogram!(telemetry::FETCH_DURATION_SECONDS, "cache" => self.name.clone())
            .record(elapsed.as_secs_f64());

        let mut slots = self.lock_slots();
        let is_current = slots
            .get(key)
            .and_then(|slot| slot.in_flight.as_ref())
            .is_some_and(|in_flight| in_flight.id == id);

        match result {
            Ok(value) => {
                metrics::counter!(telemetry::FETCHES_TOTAL,
                    "cache" => self.name.clone(),
                    "status" => "ok",
                )
                .increment(1);
                let value = Arc::new(value);
                match slots.get_mut(key) {
                    Some(slot) if is_current => {
                        slot.in_flight = None;
                        slot.stored = Some(Stored {
                            value: Arc::clone(&value),
                            fetched_at: now,
                        });
                        debug!(
                            cache = %self.name,
                            key,
                            fetch_id = id,
                            elapsed_ms = elapsed.as_millis() as u64,
                            "fetch stored"
                        );
                    }
                    _ => {
                        debug!(cache = %self.name, key, fetch_id = id, "discarding superseded fetch");
                    }
                }
                Ok(value)
            }
            Err(e) => {
                metrics::counter!(telemetry::FETCHES_TOTAL,
                    "cache" => self.name.clone(),
                    "status" => "error",
                )
                .increment(1);
                warn!(
                    cache = %self.name,
                    key,
                    fetch_id = id,
                    elapsed_ms = elapsed.as_millis() as u64,
                    error = %e,
                    "fetch failed"
                );
                if is_current {
                    slots.remove(key);
                }
                Err(e)
            }
        }
    }

    /// Clear the in-flight record of a fetch that ended without a result.
    fn abandon(&self, key: &str, id: u64) {
        let mut slots = self.lock_slots();
        if let Some(slot) = slots.get_mut(key) {
            if slot.in_flight.as_ref().is_some_and(|f| f.id == id) {
                slot.in_flight = None;
                if slot.is_vacant() {
                    slots.remove(key);
                }
            }
        }
    }
}

/// Clears the in-flight record of fetch `id` unless the fetch completed.
///
/// Dropped without completing when the fetcher panics while building its
/// request, or when the spawned task is dropped by a shutting-down runtime.
struct FetchGuard<T> {
    inner: Arc<Inner<T>>,
    key: String,
    id: u64,
    done: bool,
}

impl<T> FetchGuard<T> {
    fn complete(mut self, started: Instant, result: Result<T>) -> Result<Arc<T>> {
        self.done = true;
        self.inner.complete(&self.key, self.id, started, result)
    }
}

impl<T> Drop for FetchGuard<T> {
    fn drop(&mut self) {
        if !self.done {
            self.inner.abandon(&self.key, self.id);
        }
    }
}

/// A reserved fetch whose request has not been built yet.
struct FetchStart<T> {
    guard: FetchGuard<T>,
    started: Instant,
    tx: oneshot::Sender<Result<Arc<T>>>,
}

impl<T: Send + Sync + 'static> FetchStart<T> {
    /// Build the request and run it on its own task. The task always settles
    /// the entry, whether or not anyone is waiting on the result.
    fn spawn<F, Fut>(self, fetcher: F)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let Self { guard, started, tx } = self;
        let request = fetcher();
        tokio::spawn(async move {
            let result = match AssertUnwindSafe(request).catch_unwind().await {
                Ok(result) => result,
                Err(panic) => Err(ScoutboardError::Fetch(format!(
                    "fetch panicked: {}",
                    panic_message(panic.as_ref())
                ))),
            };
            // Waiters may all be gone (stale-while-revalidate, dropped callers).
            let _ = tx.send(guard.complete(started, result));
        });
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

impl<T: Send + Sync + 'static> ResponseCache<T> {
    /// Create an empty cache using tokio's clock.
    ///
    /// `name` labels this cache's metrics and log lines.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_clock(name, Arc::new(TokioClock))
    }

    /// Create an empty cache with a custom time source.
    pub fn with_clock(name: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(Inner {
                name: name.into(),
                clock,
                slots: Mutex::new(HashMap::new()),
                next_fetch_id: AtomicU64::new(0),
            }),
        }
    }

    /// Name used for metrics labels and logs.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Return the value for `key`, fetching it if needed.
    ///
    /// - Fresh: returns the stored value without calling `fetcher`.
    /// - Fetch in flight: joins it; `fetcher` is not called.
    /// - Empty or stale: calls `fetcher` once and records the fetch so
    ///   concurrent callers join it.
    ///
    /// In [`RevalidateMode::StaleWhileRevalidate`] a stale value is returned
    /// immediately while the refetch runs in the background. Errors are
    /// returned to every waiter of the failed fetch and are never stored.
    ///
    /// `fetcher` is called after the store lock is released, so it may read
    /// or invalidate this cache.
    ///
    /// # Errors
    ///
    /// [`ScoutboardError::InvalidKey`] for an empty key (no state is touched),
    /// otherwise whatever error the fetch produced. A fetch that panics is
    /// reported as [`ScoutboardError::Fetch`].
    ///
    /// # Panics
    ///
    /// The fetch is spawned onto the current tokio runtime, so starting one
    /// outside a runtime panics. A panic raised by `fetcher` itself (before
    /// it returns a future) propagates to this caller; the entry is left
    /// as it was before the call.
    pub async fn get<F, Fut>(&self, key: &str, fetcher: F, options: &CacheOptions) -> Result<Arc<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        validate_key(key)?;

        let (fetch, start, stale) = {
            let mut slots = self.inner.lock_slots();
            let now = self.inner.clock.now();
            let slot = slots.entry(key.to_owned()).or_default();

            let state = slot.state(now, options.ttl);
            let stored = slot.value();
            if let (EntryState::Fresh, Some(value)) = (state, &stored) {
                metrics::counter!(telemetry::CACHE_HITS_TOTAL, "cache" => self.inner.name.clone())
                    .increment(1);
                debug!(cache = %self.inner.name, key, "cache hit");
                return Ok(Arc::clone(value));
            }

            let joined = slot
                .in_flight
                .as_ref()
                .map(|in_flight| (in_flight.id, in_flight.fetch.clone()));
            let (fetch, start) = match joined {
                Some((fetch_id, fetch)) => {
                    metrics::counter!(telemetry::CACHE_DEDUPLICATED_TOTAL,
                        "cache" => self.inner.name.clone(),
                    )
                    .increment(1);
                    debug!(cache = %self.inner.name, key, fetch_id, "joining in-flight fetch");
                    (fetch, None)
                }
                None => {
                    metrics::counter!(telemetry::CACHE_MISSES_TOTAL, "cache" => self.inner.name.clone())
                        .increment(1);
                    let (fetch, start) = self.reserve_fetch(slot, key, now);
                    (fetch, Some(start))
                }
            };

            let stale = match (options.mode, stored) {
                (RevalidateMode::StaleWhileRevalidate, Some(stale)) => {
                    metrics::counter!(telemetry::CACHE_STALE_SERVED_TOTAL,
                        "cache" => self.inner.name.clone(),
                    )
                    .increment(1);
                    debug!(cache = %self.inner.name, key, "serving stale value while revalidating");
                    Some(stale)
                }
                _ => None,
            };
            (fetch, start, stale)
        };

        match start {
            Some(start) => start.spawn(fetcher),
            None => drop(fetcher),
        }
        match stale {
            Some(stale) => Ok(stale),
            None => fetch.await,
        }
    }

    /// Record a new in-flight fetch on `slot`. Caller holds the store lock,
    /// so later callers join the record; the request itself is built and
    /// spawned by [`FetchStart::spawn`] once the lock is released.
    fn reserve_fetch(&self, slot: &mut Slot<T>, key: &str, now: Instant) -> (SharedFetch<T>, FetchStart<T>) {
        let id = self.inner.next_fetch_id.fetch_add(1, Ordering::Relaxed);
        debug!(cache = %self.inner.name, key, fetch_id = id, "starting fetch");

        let (tx, rx) = oneshot::channel();
        let fetch = async move {
            rx.await.unwrap_or_else(|_| {
                Err(ScoutboardError::Fetch("fetch ended without a result".to_string()))
            })
        }
        .boxed()
        .shared();

        slot.in_flight = Some(InFlight {
            id,
            fetch: fetch.clone(),
        });
        let start = FetchStart {
            guard: FetchGuard {
                inner: Arc::clone(&self.inner),
                key: key.to_owned(),
                id,
                done: false,
            },
            started: now,
            tx,
        };
        (fetch, start)
    }

    /// Return the stored value only if it is fresh under `ttl`. Never fetches.
    pub fn get_fresh(&self, key: &str, ttl: Duration) -> Option<Arc<T>> {
        let slots = self.inner.lock_slots();
        let slot = slots.get(key)?;
        match slot.state(self.inner.clock.now(), ttl) {
            EntryState::Fresh => slot.value(),
            _ => None,
        }
    }

    /// Current state of `key` under `ttl`.
    pub fn state(&self, key: &str, ttl: Duration) -> EntryState {
        let slots = self.inner.lock_slots();
        slots
            .get(key)
            .map_or(EntryState::Empty, |slot| slot.state(self.inner.clock.now(), ttl))
    }

    /// Stored value, loading flag, and state of `key`, without fetching.
    pub fn snapshot(&self, key: &str, ttl: Duration) -> Snapshot<T> {
        let slots = self.inner.lock_slots();
        match slots.get(key) {
            Some(slot) => Snapshot {
                value: slot.value(),
                is_loading: slot.in_flight.is_some(),
                state: slot.state(self.inner.clock.now(), ttl),
            },
            None => Snapshot {
                value: None,
                is_loading: false,
                state: EntryState::Empty,
            },
        }
    }

    /// Drop the stored value for `key` so the next `get` refetches regardless
    /// of TTL.
    ///
    /// A fetch already in flight is kept; later callers join it. Returns
    /// whether a value was stored.
    pub fn invalidate(&self, key: &str) -> bool {
        let mut slots = self.inner.lock_slots();
        let Some(slot) = slots.get_mut(key) else {
            return false;
        };
        let had_value = slot.stored.take().is_some();
        if slot.is_vacant() {
            slots.remove(key);
        }
        debug!(cache = %self.inner.name, key, had_value, "invalidated");
        had_value
    }

    /// [`invalidate`](Self::invalidate) every key.
    pub fn invalidate_all(&self) {
        let mut slots = self.inner.lock_slots();
        slots.retain(|_, slot| {
            slot.stored = None;
            !slot.is_vacant()
        });
        debug!(cache = %self.inner.name, "invalidated all entries");
    }

    /// Number of keys with a stored value or a fetch in flight.
    pub fn len(&self) -> usize {
        self.inner.lock_slots().len()
    }

    /// Whether the cache holds nothing.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn validate_key(key: &str) -> Result<()> {
    if key.trim().is_empty() {
        return Err(ScoutboardError::InvalidKey(key.to_owned()));
    }
    Ok(())
}

//! Per-key cache entries and their observable state.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::future::{BoxFuture, Shared};

use crate::Result;

/// Observable state of a key, as seen with a particular TTL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    /// No value stored and nothing in flight.
    Empty,
    /// Stored value younger than the TTL.
    Fresh,
    /// Stored value at least as old as the TTL, nothing in flight.
    Stale,
    /// A fetch is in flight and no fresh value is stored.
    Pending,
}

/// Point-in-time view of a key: the `{ value, is_loading }` pair a view renders.
#[derive(Debug, Clone)]
pub struct Snapshot<T> {
    /// Last stored value, fresh or stale.
    pub value: Option<Arc<T>>,
    /// Whether a fetch for the key is in flight.
    pub is_loading: bool,
    /// State of the key under the TTL the snapshot was taken with.
    pub state: EntryState,
}

/// Fetch future shared by every caller waiting on the same key.
pub(crate) type SharedFetch<T> = Shared<BoxFuture<'static, Result<Arc<T>>>>;

pub(crate) struct InFlight<T> {
    pub(crate) id: u64,
    pub(crate) fetch: SharedFetch<T>,
}

/// Stored value together with the instant it was written.
pub(crate) struct Stored<T> {
    pub(crate) value: Arc<T>,
    pub(crate) fetched_at: Instant,
}

pub(crate) struct Slot<T> {
    pub(crate) stored: Option<Stored<T>>,
    pub(crate) in_flight: Option<InFlight<T>>,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            stored: None,
            in_flight: None,
        }
    }
}

impl<T> Slot<T> {
    /// Freshness is checked before the in-flight fetch: a value that is fresh
    /// under this caller's TTL is served even if a shorter-TTL caller started
    /// a refetch.
    pub(crate) fn state(&self, now: Instant, ttl: Duration) -> EntryState {
        match (&self.stored, &self.in_flight) {
            (Some(stored), _) if now.saturating_duration_since(stored.fetched_at) < ttl => {
                EntryState::Fresh
            }
            (_, Some(_)) => EntryState::Pending,
            (Some(_), None) => EntryState::Stale,
            (None, None) => EntryState::Empty,
        }
    }

    pub(crate) fn value(&self) -> Option<Arc<T>> {
        self.stored.as_ref().map(|s| Arc::clone(&s.value))
    }

    /// A slot with nothing stored and nothing in flight can be dropped.
    pub(crate) fn is_vacant(&self) -> bool {
        self.stored.is_none() && self.in_flight.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored_at(fetched_at: Instant) -> Slot<u32> {
        Slot {
            stored: Some(Stored {
                value: Arc::new(7),
                fetched_at,
            }),
            in_flight: None,
        }
    }

    #[test]
    fn empty_slot() {
        let slot: Slot<u32> = Slot::default();
        assert_eq!(
            slot.state(Instant::now(), Duration::from_secs(1)),
            EntryState::Empty
        );
        assert!(slot.is_vacant());
    }

    #[test]
    fn fresh_until_ttl_then_stale() {
        let t0 = Instant::now();
        let slot = stored_at(t0);
        let ttl = Duration::from_millis(5000);

        assert_eq!(slot.state(t0 + Duration::from_millis(4999), ttl), EntryState::Fresh);
        assert_eq!(slot.state(t0 + Duration::from_millis(5000), ttl), EntryState::Stale);
        assert_eq!(slot.state(t0 + Duration::from_millis(5001), ttl), EntryState::Stale);
    }

    #[test]
    fn zero_ttl_is_never_fresh() {
        let t0 = Instant::now();
        let slot = stored_at(t0);
        assert_eq!(slot.state(t0, Duration::ZERO), EntryState::Stale);
    }

    #[test]
    fn value_is_shared_not_cloned() {
        let slot = stored_at(Instant::now());
        let a = slot.value().unwrap();
        let b = slot.value().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }
}

//! Tests for cache metrics.
//!
//! Uses `metrics_util::debugging::DebuggingRecorder` to capture and assert
//! on emitted metrics without needing a real exporter. Only counters emitted
//! on the caller's thread are asserted: fetches complete on a spawned task,
//! which a thread-local recorder does not observe.

use std::time::Duration;

use metrics_util::MetricKind;
use metrics_util::debugging::{DebugValue, DebuggingRecorder};

use scoutboard::telemetry;
use scoutboard::{CacheOptions, ResponseCache, Result};

// ============================================================================
// Snapshot type alias for readability
// ============================================================================

type SnapshotVec = Vec<(
    metrics_util::CompositeKey,
    Option<metrics::Unit>,
    Option<metrics::SharedString>,
    DebugValue,
)>;

// ============================================================================
// Helpers
// ============================================================================

/// Sum all counter values matching a given metric name.
fn counter_total(snapshot: &SnapshotVec, name: &str) -> u64 {
    snapshot
        .iter()
        .filter(|(key, _, _, _)| key.kind() == MetricKind::Counter && key.key().name() == name)
        .map(|(_, _, _, value)| match value {
            DebugValue::Counter(v) => *v,
            _ => 0,
        })
        .sum()
}

/// Whether a counter carries the given `cache` label.
fn labelled_with_cache(snapshot: &SnapshotVec, name: &str, cache: &str) -> bool {
    snapshot.iter().any(|(key, _, _, _)| {
        key.key().name() == name
            && key
                .key()
                .labels()
                .any(|l| l.key() == "cache" && l.value() == cache)
    })
}

async fn slow_fetch(value: u32) -> Result<u32> {
    tokio::time::sleep(Duration::from_millis(50)).await;
    Ok(value)
}

// ============================================================================
// Tests
// ============================================================================

/// Runs async code within a local recorder scope on the multi-thread runtime.
///
/// `block_in_place` ensures the sync `with_local_recorder` closure stays
/// on the current thread while `block_on` drives the inner async work.
#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn miss_dedup_and_hit_are_counted() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    metrics::with_local_recorder(&recorder, || {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                let cache = ResponseCache::new("leaders");
                let options = CacheOptions::new(Duration::from_secs(60));

                let (a, b) = tokio::join!(
                    cache.get("players-leaders", || slow_fetch(1), &options),
                    cache.get("players-leaders", || slow_fetch(2), &options),
                );
                assert_eq!((*a.unwrap(), *b.unwrap()), (1, 1));

                cache.get("players-leaders", || slow_fetch(3), &options).await.unwrap();
            })
        })
    });

    let snapshot = snapshotter.snapshot().into_vec();

    assert_eq!(counter_total(&snapshot, telemetry::CACHE_MISSES_TOTAL), 1);
    assert_eq!(counter_total(&snapshot, telemetry::CACHE_DEDUPLICATED_TOTAL), 1);
    assert_eq!(counter_total(&snapshot, telemetry::CACHE_HITS_TOTAL), 1);
    assert!(labelled_with_cache(&snapshot, telemetry::CACHE_HITS_TOTAL, "leaders"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn stale_serve_is_counted() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    metrics::with_local_recorder(&recorder, || {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                let cache = ResponseCache::new("teams");
                // Zero TTL: every stored value is immediately stale.
                let options = CacheOptions::new(Duration::ZERO).stale_while_revalidate();

                cache.get("nhl-teams", || slow_fetch(1), &options).await.unwrap();
                let stale = cache.get("nhl-teams", || slow_fetch(2), &options).await.unwrap();
                assert_eq!(*stale, 1);
            })
        })
    });

    let snapshot = snapshotter.snapshot().into_vec();

    assert_eq!(counter_total(&snapshot, telemetry::CACHE_MISSES_TOTAL), 2);
    assert_eq!(counter_total(&snapshot, telemetry::CACHE_STALE_SERVED_TOTAL), 1);
    assert_eq!(counter_total(&snapshot, telemetry::CACHE_HITS_TOTAL), 0);
}

#[tokio::test]
async fn metrics_are_noop_without_recorder() {
    // Verify no panics when no recorder is installed.
    let cache = ResponseCache::new("noop");
    let options = CacheOptions::default();
    assert_eq!(*cache.get("k", || slow_fetch(7), &options).await.unwrap(), 7);
}

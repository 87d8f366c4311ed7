//! Telemetry metric name constants.
//!
//! Centralised metric names for scoutboard caches and API calls. Consumers
//! install their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `scoutboard_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `cache`: name of the [`ResponseCache`](crate::ResponseCache) instance
//! - `status`: "ok" or "error"
//! - `endpoint`: API endpoint path

/// Lookups answered from a fresh entry without a network call.
///
/// Labels: `cache`.
pub const CACHE_HITS_TOTAL: &str = "scoutboard_cache_hits_total";

/// Lookups that started a new fetch (empty, stale, or invalidated entry).
///
/// Labels: `cache`.
pub const CACHE_MISSES_TOTAL: &str = "scoutboard_cache_misses_total";

/// Lookups that joined a fetch already in flight for the same key.
///
/// Labels: `cache`.
pub const CACHE_DEDUPLICATED_TOTAL: &str = "scoutboard_cache_deduplicated_total";

/// Lookups answered with a stale value while revalidation runs.
///
/// Labels: `cache`.
pub const CACHE_STALE_SERVED_TOTAL: &str = "scoutboard_cache_stale_served_total";

/// Completed fetches started by a cache.
///
/// Labels: `cache`, `status` ("ok" | "error").
pub const FETCHES_TOTAL: &str = "scoutboard_fetches_total";

/// Fetch duration in seconds.
///
/// Labels: `cache`.
pub const FETCH_DURATION_SECONDS: &str = "scoutboard_fetch_duration_seconds";

/// Total retry attempts made by the API client (not counting the first).
///
/// Labels: `endpoint`.
pub const RETRIES_TOTAL: &str = "scoutboard_retries_total";

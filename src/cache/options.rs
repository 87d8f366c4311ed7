//! Per-call cache options: staleness window and revalidation mode.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Result, ScoutboardError};

/// What a lookup does when it finds a stale value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RevalidateMode {
    /// Wait for the refetch and return the new value.
    #[default]
    Strict,
    /// Return the stale value immediately and refresh in the background.
    StaleWhileRevalidate,
}

/// Options for a single [`ResponseCache::get`](super::ResponseCache::get) call.
///
/// ```rust
/// # use scoutboard::{CacheOptions, RevalidateMode};
/// # use std::time::Duration;
/// let options = CacheOptions::new(Duration::from_secs(300)).stale_while_revalidate();
/// assert_eq!(options.mode, RevalidateMode::StaleWhileRevalidate);
///
/// assert!(CacheOptions::from_millis(-1).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheOptions {
    /// Age at which a stored value becomes stale. Zero means always revalidate.
    pub ttl: Duration,
    /// Behaviour on a stale hit. Default: [`RevalidateMode::Strict`].
    pub mode: RevalidateMode,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(5 * 60),
            mode: RevalidateMode::Strict,
        }
    }
}

impl CacheOptions {
    /// Strict-mode options with the given TTL.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            mode: RevalidateMode::Strict,
        }
    }

    /// Build options from a millisecond TTL as found in config files.
    ///
    /// Negative values are rejected with [`ScoutboardError::Configuration`].
    pub fn from_millis(ttl_ms: i64) -> Result<Self> {
        let ms = u64::try_from(ttl_ms).map_err(|_| {
            ScoutboardError::Configuration(format!("ttl_ms must be non-negative, got {ttl_ms}"))
        })?;
        Ok(Self::new(Duration::from_millis(ms)))
    }

    /// Set the TTL.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the revalidation mode.
    pub fn mode(mut self, mode: RevalidateMode) -> Self {
        self.mode = mode;
        self
    }

    /// Shorthand for `.mode(RevalidateMode::StaleWhileRevalidate)`.
    pub fn stale_while_revalidate(self) -> Self {
        self.mode(RevalidateMode::StaleWhileRevalidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_strict() {
        let options = CacheOptions::default();
        assert_eq!(options.mode, RevalidateMode::Strict);
        assert_eq!(options.ttl, Duration::from_secs(300));
    }

    #[test]
    fn from_millis_accepts_zero() {
        let options = CacheOptions::from_millis(0).unwrap();
        assert_eq!(options.ttl, Duration::ZERO);
    }

    #[test]
    fn from_millis_rejects_negative() {
        let err = CacheOptions::from_millis(-5000).unwrap_err();
        assert!(matches!(err, ScoutboardError::Configuration(_)));
    }

    #[test]
    fn mode_deserializes_kebab_case() {
        let mode: RevalidateMode = serde_json::from_str("\"stale-while-revalidate\"").unwrap();
        assert_eq!(mode, RevalidateMode::StaleWhileRevalidate);
        let mode: RevalidateMode = serde_json::from_str("\"strict\"").unwrap();
        assert_eq!(mode, RevalidateMode::Strict);
    }
}

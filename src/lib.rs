//! Scoutboard - cached data access for NHL/NFL stats dashboards
//!
//! Every dashboard view reads from a stats API that returns
//! `{ "<collection>": [...] }`. This crate puts one component between views
//! and that API: [`ResponseCache`], a keyed cache with a per-call TTL,
//! in-flight request deduplication, optional stale-while-revalidate, and
//! manual invalidation. [`Dashboard`] wires the endpoint catalog, the HTTP
//! client, and typed caches together.
//!
//! # Cache Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use scoutboard::{CacheOptions, ResponseCache};
//!
//! #[tokio::main]
//! async fn main() -> scoutboard::Result<()> {
//!     let cache: ResponseCache<Vec<String>> = ResponseCache::new("leaders");
//!     let options = CacheOptions::new(Duration::from_secs(300));
//!
//!     // Concurrent callers share one fetch; later callers hit the cache
//!     // until the TTL runs out.
//!     let (a, b) = tokio::join!(
//!         cache.get("players-leaders", || async { Ok(vec!["McDavid".into()]) }, &options),
//!         cache.get("players-leaders", || async { Ok(vec!["Draisaitl".into()]) }, &options),
//!     );
//!     assert_eq!(a?, b?);
//!     Ok(())
//! }
//! ```
//!
//! # Dashboard Example
//!
//! ```rust,no_run
//! use scoutboard::{Config, Dashboard, PickWindow};
//!
//! #[tokio::main]
//! async fn main() -> scoutboard::Result<()> {
//!     let dashboard = Dashboard::from_config(&Config::load(None)?)?;
//!
//!     let picks = dashboard.scout_picks(PickWindow::Today).await?;
//!     for game in &picks.scout {
//!         println!("{} over {}", game.pick(), game.away_team);
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cache;
pub mod clock;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod picks;
pub mod telemetry;
pub mod types;

// Re-export main types at crate root
pub use api::{ApiClient, CollectionSource, Endpoint, EndpointKind, League, RetryConfig, ScheduleQuery};
pub use cache::{CacheOptions, EntryState, ResponseCache, RevalidateMode, Snapshot};
pub use config::Config;
pub use dashboard::{Dashboard, or_empty};
pub use error::{Result, ScoutboardError};
pub use picks::{PickWindow, ScoutPicks, filter_duplicates};
pub use types::{BestOddsGame, Player, PlayerId, Record};

/// Package version from Cargo.toml.
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

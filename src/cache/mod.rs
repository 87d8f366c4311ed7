//! Caching subsystem.
//!
//! One component, [`ResponseCache`], shared by every data-consuming view:
//!
//! - a fixed per-call TTL ([`CacheOptions::ttl`]) bounds how stale a served
//!   value can be;
//! - concurrent lookups for the same key collapse into a single fetch;
//! - [`RevalidateMode`] picks between blocking on a refetch (default) and
//!   serving the stale value while refreshing in the background;
//! - [`ResponseCache::invalidate`] forces the next lookup to refetch.
//!
//! The store lives for as long as the cache handle; nothing is persisted.

mod entry;
mod options;
mod response;

pub use entry::{EntryState, Snapshot};
pub use options::{CacheOptions, RevalidateMode};
pub use response::ResponseCache;

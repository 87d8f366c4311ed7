//! Stats API boundary: endpoint catalog, HTTP client, retry policy.

mod client;
pub mod endpoints;
pub mod retry;

pub use client::{ApiClient, CollectionSource, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use endpoints::{ENDPOINTS, Endpoint, EndpointKind, League, ScheduleQuery};
pub use retry::RetryConfig;

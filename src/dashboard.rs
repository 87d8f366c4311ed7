//! Dashboard data access: typed, cached reads of every API endpoint.
//!
//! [`Dashboard`] keeps one [`ResponseCache`] per record type and routes every
//! read through it, so all views share the same freshness and deduplication
//! guarantees. Decoding happens inside the fetch: a payload that does not
//! decode is a failed fetch and is never stored.
//!
//! Whether a failure renders as an error or as an empty list is a view
//! decision; [`or_empty`] implements the "empty list" policy for views that
//! want it.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::api::{CollectionSource, Endpoint, EndpointKind, ScheduleQuery};
use crate::cache::{CacheOptions, ResponseCache};
use crate::clock::{Clock, TokioClock};
use crate::config::{CacheConfig, Config};
use crate::picks::{PickWindow, ScoutPicks};
use crate::types::{BestOddsGame, Player, Record};
use crate::{Result, ScoutboardError};

/// Cached access to the stats API.
pub struct Dashboard {
    source: Arc<dyn CollectionSource>,
    cache_config: CacheConfig,
    players: ResponseCache<Vec<Player>>,
    picks: ResponseCache<Vec<BestOddsGame>>,
    records: ResponseCache<Vec<Record>>,
}

impl Dashboard {
    /// Build a dashboard over `source`. Fails if `cache_config` has a
    /// negative TTL.
    pub fn new(source: Arc<dyn CollectionSource>, cache_config: CacheConfig) -> Result<Self> {
        Self::with_clock(source, cache_config, Arc::new(TokioClock))
    }

    /// Build a dashboard whose caches read time from `clock`.
    pub fn with_clock(
        source: Arc<dyn CollectionSource>,
        cache_config: CacheConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        cache_config.validate()?;
        Ok(Self {
            source,
            cache_config,
            players: ResponseCache::with_clock("players", Arc::clone(&clock)),
            picks: ResponseCache::with_clock("picks", Arc::clone(&clock)),
            records: ResponseCache::with_clock("records", clock),
        })
    }

    /// Build a dashboard talking HTTP to the configured API.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = config.api.client()?;
        Self::new(Arc::new(client), config.cache.clone())
    }

    /// Effective cache options for an endpoint.
    pub fn options_for(&self, endpoint: &Endpoint) -> Result<CacheOptions> {
        self.cache_config.options_for(endpoint.key)
    }

    /// Players from a leaderboard or stats endpoint.
    pub async fn players(&self, endpoint: &Endpoint) -> Result<Arc<Vec<Player>>> {
        expect_kind(endpoint, EndpointKind::Players)?;
        self.cached(&self.players, endpoint, endpoint.key, endpoint.path.to_string())
            .await
    }

    /// Raw pick list from one best-odds endpoint.
    pub async fn picks(&self, endpoint: &Endpoint) -> Result<Arc<Vec<BestOddsGame>>> {
        expect_kind(endpoint, EndpointKind::Picks)?;
        self.cached(&self.picks, endpoint, endpoint.key, endpoint.path.to_string())
            .await
    }

    /// Scout picks for a window, with next-best games the scout list already
    /// covers removed. Both lists are fetched concurrently.
    pub async fn scout_picks(&self, window: PickWindow) -> Result<ScoutPicks> {
        let best = Endpoint::best_odds(window)?;
        let next = Endpoint::next_best_odds(window)?;
        let (scout, next_best) = tokio::join!(self.picks(best), self.picks(next));
        let (scout, next_best) = (scout?, next_best?);
        Ok(ScoutPicks::new(scout.as_ref().clone(), &next_best))
    }

    /// Untyped records (teams, standings).
    pub async fn records(&self, endpoint: &Endpoint) -> Result<Arc<Vec<Record>>> {
        expect_kind(endpoint, EndpointKind::Records)?;
        self.cached(&self.records, endpoint, endpoint.key, endpoint.path.to_string())
            .await
    }

    /// Scheduled games matching `query`. Each distinct query is its own
    /// cache entry.
    pub async fn schedule(&self, endpoint: &Endpoint, query: &ScheduleQuery) -> Result<Arc<Vec<Record>>> {
        expect_kind(endpoint, EndpointKind::Schedule)?;
        let query = query.to_query_string();
        let key = format!("{}{query}", endpoint.key);
        let path = format!("{}{query}", endpoint.path);
        self.cached(&self.records, endpoint, &key, path).await
    }

    /// Force the next read of `key` to refetch. Returns whether anything
    /// was stored under it.
    pub fn invalidate(&self, key: &str) -> bool {
        let players = self.players.invalidate(key);
        let picks = self.picks.invalidate(key);
        let records = self.records.invalidate(key);
        players || picks || records
    }

    /// Force every subsequent read to refetch.
    pub fn invalidate_all(&self) {
        self.players.invalidate_all();
        self.picks.invalidate_all();
        self.records.invalidate_all();
    }

    async fn cached<T>(
        &self,
        cache: &ResponseCache<Vec<T>>,
        endpoint: &Endpoint,
        key: &str,
        path: String,
    ) -> Result<Arc<Vec<T>>>
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        let options = self.options_for(endpoint)?;
        let source = Arc::clone(&self.source);
        let collection = endpoint.collection;
        cache
            .get(
                key,
                move || async move {
                    let items = source.fetch_collection(&path, collection).await?;
                    decode_all(items)
                },
                &options,
            )
            .await
    }
}

fn expect_kind(endpoint: &Endpoint, kind: EndpointKind) -> Result<()> {
    if endpoint.kind == kind {
        Ok(())
    } else {
        Err(ScoutboardError::UnknownEndpoint(format!(
            "{} is a {:?} endpoint, not {kind:?}",
            endpoint.key, endpoint.kind
        )))
    }
}

fn decode_all<T: DeserializeOwned>(items: Vec<Value>) -> Result<Vec<T>> {
    items
        .into_iter()
        .map(|item| serde_json::from_value(item).map_err(ScoutboardError::from))
        .collect()
}

/// Render-time fallback: log a failed read and show an empty list instead.
pub fn or_empty<T>(result: Result<Arc<Vec<T>>>, what: &str) -> Arc<Vec<T>> {
    result.unwrap_or_else(|e| {
        warn!(what, error = %e, "showing empty list after failed read");
        Arc::new(Vec::new())
    })
}

//! scoutboard: command-line reader for the stats API.
//!
//! Fetches dashboard collections through the same cache the views use and
//! prints them as JSON.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use clap::{Parser, Subcommand, ValueEnum};
use futures_util::future::join_all;
use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;

use scoutboard::api::ENDPOINTS;
use scoutboard::{
    CollectionSource, Config, Dashboard, Endpoint, EndpointKind, League, PickWindow,
    ScheduleQuery, ScoutboardError,
};

/// Scoutboard stats API client
#[derive(Parser)]
#[command(name = "scoutboard")]
#[command(version = scoutboard::PKG_VERSION)]
#[command(about = "Cached reader for the sports stats API")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the API base URL from the config file.
    #[arg(long, env = "SCOUTBOARD_API_URL")]
    base_url: Option<String>,

    /// Issue the request this many times concurrently (shows deduplication).
    #[arg(long, default_value_t = 1)]
    repeat: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List known endpoints
    Endpoints,

    /// Fetch one endpoint's collection
    Fetch {
        /// Endpoint key (see `endpoints`)
        endpoint: String,
    },

    /// Scout picks for a window, next-best list de-duplicated
    Picks {
        /// today, tomorrow, or future
        window: PickWindow,
    },

    /// League schedule
    Schedule {
        league: LeagueArg,
        /// Games on a date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
        /// Upcoming games instead of a single date
        #[arg(long)]
        upcoming: bool,
        /// Season year
        #[arg(long)]
        season: Option<u32>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum LeagueArg {
    Nhl,
    Nfl,
}

impl From<LeagueArg> for League {
    fn from(arg: LeagueArg) -> Self {
        match arg {
            LeagueArg::Nhl => League::Nhl,
            LeagueArg::Nfl => League::Nfl,
        }
    }
}

/// Counts upstream requests so `--repeat` can report how many were made.
struct CountingSource<S> {
    inner: S,
    calls: AtomicUsize,
}

#[async_trait]
impl<S: CollectionSource> CollectionSource for CountingSource<S> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn fetch_collection(&self, path: &str, collection: &str) -> scoutboard::Result<Vec<Value>> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.inner.fetch_collection(path, collection).await
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Command::Endpoints = args.command {
        for e in ENDPOINTS {
            println!("{:<26} {:<34} {}", e.key, e.path, e.description);
        }
        return Ok(());
    }

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(url) = args.base_url {
        config.api.base_url = url;
    }

    let source = Arc::new(CountingSource {
        inner: config.api.client()?,
        calls: AtomicUsize::new(0),
    });
    let dashboard = Dashboard::new(source.clone(), config.cache.clone())?;

    let repeat = args.repeat.max(1);
    let results = join_all((0..repeat).map(|_| run(&dashboard, &args.command))).await;
    info!(
        requests = repeat,
        upstream_calls = source.calls.load(Ordering::Relaxed),
        "done"
    );

    // Every deduplicated caller sees the same result; print it once.
    match results.into_iter().next() {
        Some(result) => println!("{}", serde_json::to_string_pretty(&result?)?),
        None => println!("null"),
    }
    Ok(())
}

async fn run(dashboard: &Dashboard, command: &Command) -> scoutboard::Result<Value> {
    match command {
        Command::Endpoints => Ok(Value::Null),
        Command::Fetch { endpoint } => {
            let endpoint = Endpoint::find(endpoint)?;
            match endpoint.kind {
                EndpointKind::Players => to_json(&*dashboard.players(endpoint).await?),
                EndpointKind::Picks => to_json(&*dashboard.picks(endpoint).await?),
                EndpointKind::Records => to_json(&*dashboard.records(endpoint).await?),
                EndpointKind::Schedule => {
                    to_json(&*dashboard.schedule(endpoint, &ScheduleQuery::new()).await?)
                }
            }
        }
        Command::Picks { window } => to_json(&dashboard.scout_picks(*window).await?),
        Command::Schedule {
            league,
            date,
            upcoming,
            season,
        } => {
            let endpoint = Endpoint::schedule((*league).into())?;
            let query = ScheduleQuery {
                date: date.clone(),
                upcoming: *upcoming,
                season: *season,
            };
            to_json(&*dashboard.schedule(endpoint, &query).await?)
        }
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> scoutboard::Result<Value> {
    serde_json::to_value(value).map_err(ScoutboardError::from)
}

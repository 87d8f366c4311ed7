//! Catalog of stats API endpoints.
//!
//! Each [`Endpoint`] names the cache key it is stored under, the request
//! path, and the collection field that wraps its records in the response
//! body (`{ "<collection>": [...] }`).

use std::fmt::Write as _;

use crate::picks::PickWindow;
use crate::{Result, ScoutboardError};

/// Sport an endpoint belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum League {
    Nhl,
    Nfl,
    /// Cross-league scout picks.
    Picks,
}

/// Record type an endpoint returns, which decides the cache it lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointKind {
    Players,
    Picks,
    Records,
    /// Records filtered by [`ScheduleQuery`].
    Schedule,
}

/// One upstream collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Endpoint {
    /// Cache key; also the name used on the command line.
    pub key: &'static str,
    pub path: &'static str,
    pub collection: &'static str,
    pub league: League,
    pub kind: EndpointKind,
    pub description: &'static str,
}

const fn endpoint(
    key: &'static str,
    path: &'static str,
    collection: &'static str,
    league: League,
    kind: EndpointKind,
    description: &'static str,
) -> Endpoint {
    Endpoint {
        key,
        path,
        collection,
        league,
        kind,
        description,
    }
}

use EndpointKind::{Picks as PicksKind, Players, Records, Schedule};
use League::{Nfl, Nhl, Picks};

/// Every endpoint the dashboard reads.
pub const ENDPOINTS: &[Endpoint] = &[
    // NHL
    endpoint("players-leaders", "/players/leaders", "players", Nhl, Players, "NHL point leaders"),
    endpoint("players-clutch", "/players/clutch", "players", Nhl, Players, "NHL game-winning-goal leaders"),
    endpoint("players-goalies", "/players/top/goalies", "goalies", Nhl, Players, "Top NHL goaltenders"),
    endpoint("players-stats", "/players/stats", "players", Nhl, Players, "NHL skater stat lines"),
    endpoint("nhl-teams", "/teams", "teams", Nhl, Records, "NHL teams"),
    endpoint("nhl-standings", "/team-standings", "standings", Nhl, Records, "NHL standings"),
    endpoint("nhl-schedule", "/nhl/schedule", "games", Nhl, Schedule, "NHL schedule"),
    // NFL
    endpoint("nfl-passing-leaders", "/nfl/players/leaders/passing", "players", Nfl, Players, "Top QBs by passing yards"),
    endpoint("nfl-rushing-leaders", "/nfl/players/leaders/rushing", "players", Nfl, Players, "Top rushers"),
    endpoint("nfl-receiving-leaders", "/nfl/players/leaders/receiving", "players", Nfl, Players, "Top receivers"),
    endpoint("nfl-tackling-leaders", "/nfl/players/leaders/defense", "players", Nfl, Players, "Top defenders by tackles and sacks"),
    endpoint("nfl-teams", "/nfl/teams", "teams", Nfl, Records, "NFL teams"),
    endpoint("nfl-standings", "/nfl/standings", "standings", Nfl, Records, "NFL standings"),
    endpoint("nfl-schedule", "/nfl/schedule", "games", Nfl, Schedule, "NFL schedule"),
    // Scout picks
    endpoint("best-odds-today", "/best-odds/back-to-back/today", "best_odds_matchups_today", Picks, PicksKind, "Scout picks for today"),
    endpoint("best-odds-tomorrow", "/best-odds/back-to-back/tomorrow", "best_odds_matchups_tomorrow", Picks, PicksKind, "Scout picks for tomorrow"),
    endpoint("best-odds-future", "/best-odds/back-to-back/future", "best_odds_matchups_future", Picks, PicksKind, "Scout picks for the upcoming week"),
    endpoint("next-best-odds-today", "/next-best-odds/today", "next_best_odds_matchups_today", Picks, PicksKind, "Next best picks for today"),
    endpoint("next-best-odds-tomorrow", "/next-best-odds/tomorrow", "next_best_odds_matchups_tomorrow", Picks, PicksKind, "Next best picks for tomorrow"),
    endpoint("next-best-odds-future", "/next-best-odds/future", "next_best_odds_matchups_future", Picks, PicksKind, "Next best picks for the upcoming week"),
];

impl Endpoint {
    /// Look up an endpoint by cache key.
    pub fn find(key: &str) -> Result<&'static Endpoint> {
        ENDPOINTS
            .iter()
            .find(|e| e.key == key)
            .ok_or_else(|| ScoutboardError::UnknownEndpoint(key.to_string()))
    }

    /// Primary (back-to-back) scout picks for a window.
    pub fn best_odds(window: PickWindow) -> Result<&'static Endpoint> {
        Self::find(&format!("best-odds-{window}"))
    }

    /// Next-best picks for a window.
    pub fn next_best_odds(window: PickWindow) -> Result<&'static Endpoint> {
        Self::find(&format!("next-best-odds-{window}"))
    }

    /// Schedule endpoint for a league.
    pub fn schedule(league: League) -> Result<&'static Endpoint> {
        ENDPOINTS
            .iter()
            .find(|e| e.league == league && e.kind == EndpointKind::Schedule)
            .ok_or_else(|| ScoutboardError::UnknownEndpoint(format!("{league:?} schedule")))
    }
}

/// Filters accepted by schedule endpoints.
///
/// The rendered query string is part of the cache key, so each distinct
/// query is cached separately.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ScheduleQuery {
    /// `YYYY-MM-DD`.
    pub date: Option<String>,
    pub upcoming: bool,
    pub season: Option<u32>,
}

impl ScheduleQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn upcoming(mut self, upcoming: bool) -> Self {
        self.upcoming = upcoming;
        self
    }

    pub fn season(mut self, season: u32) -> Self {
        self.season = Some(season);
        self
    }

    /// `?upcoming=true&date=...&season=...`, or an empty string when no
    /// filter is set. An upcoming query ignores `date`.
    pub fn to_query_string(&self) -> String {
        let mut params = Vec::new();
        if self.upcoming {
            params.push("upcoming=true".to_string());
        } else if let Some(date) = &self.date {
            params.push(format!("date={date}"));
        }
        if let Some(season) = self.season {
            params.push(format!("season={season}"));
        }

        let mut query = String::new();
        for (i, param) in params.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            let _ = write!(query, "{sep}{param}");
        }
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_unique() {
        let mut keys: Vec<_> = ENDPOINTS.iter().map(|e| e.key).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), ENDPOINTS.len());
    }

    #[test]
    fn pick_endpoints_exist_for_every_window() {
        for window in PickWindow::ALL {
            let best = Endpoint::best_odds(window).unwrap();
            let next = Endpoint::next_best_odds(window).unwrap();
            assert!(best.collection.ends_with(window.as_str()));
            assert!(next.collection.starts_with("next_best_odds_matchups_"));
        }
    }

    #[test]
    fn unknown_key_is_an_error() {
        assert!(matches!(
            Endpoint::find("players-hatricks"),
            Err(ScoutboardError::UnknownEndpoint(_))
        ));
    }

    #[test]
    fn query_string_rendering() {
        assert_eq!(ScheduleQuery::new().to_query_string(), "");
        assert_eq!(
            ScheduleQuery::new().upcoming(true).season(2025).to_query_string(),
            "?upcoming=true&season=2025"
        );
        assert_eq!(
            ScheduleQuery::new().date("2024-10-12").season(2024).to_query_string(),
            "?date=2024-10-12&season=2024"
        );
        assert_eq!(
            ScheduleQuery::new().upcoming(true).date("2024-10-12").to_query_string(),
            "?upcoming=true"
        );
    }
}

//! Scout picks: travel-fatigue matchups for a time window.
//!
//! Two upstream lists exist per window: the primary back-to-back picks and
//! a "next best" list. The next-best list is shown only for games the primary
//! list does not already cover.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ScoutboardError;
use crate::types::BestOddsGame;

/// Time window the picks cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PickWindow {
    Today,
    Tomorrow,
    /// The upcoming week.
    Future,
}

impl PickWindow {
    pub const ALL: [PickWindow; 3] = [PickWindow::Today, PickWindow::Tomorrow, PickWindow::Future];

    pub fn as_str(&self) -> &'static str {
        match self {
            PickWindow::Today => "today",
            PickWindow::Tomorrow => "tomorrow",
            PickWindow::Future => "future",
        }
    }
}

impl fmt::Display for PickWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PickWindow {
    type Err = ScoutboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "today" => Ok(PickWindow::Today),
            "tomorrow" => Ok(PickWindow::Tomorrow),
            "future" | "week" => Ok(PickWindow::Future),
            other => Err(ScoutboardError::UnknownEndpoint(format!(
                "no pick window named {other:?}"
            ))),
        }
    }
}

/// Picks for one window, with the next-best list already de-duplicated.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ScoutPicks {
    pub scout: Vec<BestOddsGame>,
    pub next_best: Vec<BestOddsGame>,
}

impl ScoutPicks {
    /// Combine the two upstream lists, dropping next-best games already
    /// present among the scout picks.
    pub fn new(scout: Vec<BestOddsGame>, next_best: &[BestOddsGame]) -> Self {
        let next_best = filter_duplicates(next_best, &scout);
        Self { scout, next_best }
    }

    pub fn is_empty(&self) -> bool {
        self.scout.is_empty() && self.next_best.is_empty()
    }
}

/// Games from `next` whose `game_id` does not appear in `scout`, in `next`'s
/// order.
pub fn filter_duplicates(next: &[BestOddsGame], scout: &[BestOddsGame]) -> Vec<BestOddsGame> {
    let taken: HashSet<&str> = scout.iter().map(|g| g.game_id.as_str()).collect();
    next.iter()
        .filter(|g| !taken.contains(g.game_id.as_str()))
        .cloned()
        .collect()
}

//! Scout-pick matchups.

use serde::{Deserialize, Serialize};

/// A matchup flagged by the travel-fatigue model.
///
/// The home team is the recommended pick; `away_travel` is the distance the
/// away team travelled into the game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestOddsGame {
    pub game_id: String,
    /// `YYYY-MM-DD`.
    pub game_date: String,
    pub away_team: String,
    pub home_team: String,
    pub away_travel: f64,
    /// `HH:MM` in the home venue's timezone, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_start_time: Option<String>,
}

impl BestOddsGame {
    /// The recommended side of the matchup.
    pub fn pick(&self) -> &str {
        &self.home_team
    }
}

//! Player records.
//!
//! NHL and NFL endpoints describe players with different field names
//! (`fullName` vs `full_name`, `sweaterNumber` vs `jersey`, ...). [`Player`]
//! accepts both and exposes normalised accessors for display.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Player identifier: numeric for NHL, string for NFL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlayerId {
    Number(i64),
    Text(String),
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerId::Number(n) => write!(f, "{n}"),
            PlayerId::Text(s) => f.write_str(s),
        }
    }
}

/// A player as returned by leaderboard and stats endpoints.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Player {
    #[serde(default, alias = "player_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<PlayerId>,
    #[serde(default, alias = "fullName", skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, rename = "firstName", skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, rename = "lastName", skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, rename = "positionCode", skip_serializing_if = "Option::is_none")]
    pub position_code: Option<String>,
    #[serde(default, rename = "sweaterNumber", skip_serializing_if = "Option::is_none")]
    pub sweater_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jersey: Option<String>,
    #[serde(default, alias = "headshot_url", skip_serializing_if = "Option::is_none")]
    pub headshot: Option<String>,
    /// Category-specific stat line (`gp`, `pts`, `passing_yards`, ...).
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub stats: Map<String, Value>,
    /// Any fields not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Player {
    /// Best available display name, falling back to `"Unknown Player"`.
    pub fn display_name(&self) -> String {
        if let Some(name) = self.full_name.as_deref().or(self.name.as_deref()) {
            if !name.trim().is_empty() {
                return name.to_string();
            }
        }
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(only), None) | (None, Some(only)) => only.to_string(),
            (None, None) => "Unknown Player".to_string(),
        }
    }

    /// Position code, then position, then `"F"` (forward).
    pub fn position_label(&self) -> &str {
        self.position_code
            .as_deref()
            .or(self.position.as_deref())
            .unwrap_or("F")
    }

    /// Sweater/jersey number as text.
    pub fn number(&self) -> Option<String> {
        self.sweater_number
            .map(|n| n.to_string())
            .or_else(|| self.jersey.clone())
    }

    /// Numeric stat by name, if present.
    pub fn stat(&self, name: &str) -> Option<f64> {
        self.stats.get(name).and_then(Value::as_f64)
    }

    /// Goaltender by position code or by a goals-against average in the stat line.
    pub fn is_goalie(&self) -> bool {
        self.position_label() == "G" || self.stats.contains_key("gaa")
    }
}

//! Domain records returned by the stats API.
//!
//! Team, standings, and schedule rows are passed through untyped as
//! [`Record`]s; players and scout picks are decoded because the crate
//! itself reads their fields.

mod game;
mod player;

pub use game::BestOddsGame;
pub use player::{Player, PlayerId};

/// Untyped API record (team, standing, scheduled game).
pub type Record = serde_json::Value;

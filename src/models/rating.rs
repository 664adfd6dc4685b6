//! Rating events: the append-only trace of rating history.

use crate::models::entrant::PlayerId;
use crate::models::game::GameId;
use crate::models::tournament::TournamentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One player's rating change from one game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RatingEvent {
    pub game_id: GameId,
    pub player_id: PlayerId,
    pub tournament_id: TournamentId,
    pub delta: f64,
    pub created_at: DateTime<Utc>,
}

//! Engine errors. Every error is local to one tournament.

use crate::models::entrant::{EntrantId, PlayerId};
use crate::models::game::GameId;
use crate::models::tournament::TournamentId;
use thiserror::Error;

/// Errors that can occur while seeding, scheduling, rating or advancing a tournament.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum EngineError {
    /// Advance requested while games of the current round or stage are unresolved.
    #[error("round {round} still has {unresolved} unresolved game(s)")]
    IncompleteRound { round: u32, unresolved: usize },

    /// Pool contents cannot support scheduling (e.g. fewer than 2 real entrants).
    #[error("invalid pool state: {0}")]
    InvalidPoolState(String),

    /// A pairing was already produced this season, or the finals hold more games than a stage allows.
    #[error("duplicate fixture: {0}")]
    DuplicateFixture(String),

    /// A rating event already exists for this (game, player).
    #[error("rating ledger already holds an event for player {player} in game {game}")]
    RatingLedgerConsistency { game: GameId, player: PlayerId },

    /// The number of final games matches no bracket stage.
    #[error("{final_games} final game(s) do not match any bracket stage")]
    BracketMismatch { final_games: usize },

    /// Operation not valid in the tournament's current phase.
    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("tournament {0} not found")]
    TournamentNotFound(TournamentId),

    #[error("entrant {0} not found")]
    EntrantNotFound(EntrantId),

    #[error("game {0} not found")]
    GameNotFound(GameId),
}

impl EngineError {
    /// Only an incomplete round may succeed later without operator action.
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::IncompleteRound { .. })
    }
}

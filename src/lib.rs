//! Tournament progression engine: rating-seeded pools, round-robin rounds,
//! a finals bracket and an append-only rating ledger.

pub mod config;
pub mod logic;
pub mod models;
pub mod store;

pub use config::{EngineConfig, RatingConfig};
pub use logic::{
    advance_round, apply_rating_updates, assign_pools, begin_tournament, bracket_state,
    generate_round, podium_of, tournament_standings, Advance, BracketState, BracketStep, Podium,
    PoolRound, RatingLedger, Record, Standing,
};
pub use models::{
    ByeRecord, EngineError, Entrant, EntrantId, FinalsStrategy, Format, GameId, GameRecord,
    GameResult, NewFixture, Pairing, PlayerId, Pool, PoolAssignment, RatingEvent, Resolution,
    Seat, Side, Tournament, TournamentId,
};
pub use store::{InMemoryStore, TournamentStore};

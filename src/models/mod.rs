//! Data structures for the engine: entrants, games, tournaments, rating events.

mod entrant;
mod error;
mod game;
mod rating;
mod tournament;

pub use entrant::{Entrant, EntrantId, PlayerId, Seat};
pub use error::EngineError;
pub use game::{ByeRecord, GameId, GameRecord, GameResult, NewFixture, Pairing, Resolution, Side};
pub use rating::RatingEvent;
pub use tournament::{
    FinalsStrategy, Format, Pool, PoolAssignment, Tournament, TournamentId,
};

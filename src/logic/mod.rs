//! Engine logic: rating, seeding, round-robin and Swiss rounds, ladder, finals, progression.

pub mod bracket;
pub mod ladder;
pub mod progression;
pub mod rating;
pub mod round_robin;
pub mod seeding;
pub mod swiss;

pub use bracket::{bracket_state, top_three_state, BracketState, BracketStep, Podium};
pub use ladder::{standings, Record, Standing};
pub use progression::{
    advance_round, apply_rating_updates, begin_tournament, podium_of, tournament_standings, Advance,
};
pub use rating::{expected_score, rating_delta, RatingLedger};
pub use round_robin::{generate_round, PoolRound};
pub use seeding::assign_pools;

//! Round-robin rounds by the circle method.
//!
//! The pool is padded with a bye to even length `n`. Round `r + 1` uses the
//! arrangement reached by rotating `r` times: seat 0 stays put, the last seat
//! moves to seat 1 and every other seat shifts one place right. Seat `i` then
//! meets seat `n - 1 - i`. After `n - 1` rounds every pair has met exactly once.

use crate::models::{EngineError, EntrantId, Pairing, Seat};
use serde::Serialize;
use std::collections::HashSet;

/// One round of a pool.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct PoolRound {
    /// Round number: one more than the rounds already played.
    pub round: u32,
    pub pairings: Vec<Pairing>,
    /// Entrants seated against the bye this round.
    pub byes: Vec<EntrantId>,
    /// True when the pool has no rounds left; `pairings` and `byes` are then empty.
    pub exhausted: bool,
}

/// Pool seats padded with a bye to even length.
pub fn padded(pool: &[EntrantId]) -> Vec<Seat> {
    let mut seats: Vec<Seat> = pool.iter().copied().map(Seat::Entrant).collect();
    if seats.len() % 2 != 0 {
        seats.push(Seat::Bye);
    }
    seats
}

/// Rounds a pool of this many real entrants plays in total.
pub fn total_rounds(pool_len: usize) -> u32 {
    let n = pool_len + pool_len % 2;
    n.saturating_sub(1) as u32
}

/// Whether a pool has no rounds left after `rounds_played`.
pub fn is_exhausted(pool_len: usize, rounds_played: u32) -> bool {
    rounds_played >= total_rounds(pool_len)
}

/// Seat arrangement after `rounds_played` rotations of the padded pool.
pub fn rotation(pool: &[EntrantId], rounds_played: u32) -> Vec<Seat> {
    let mut seats = padded(pool);
    if seats.len() > 2 {
        let period = seats.len() - 1;
        seats[1..].rotate_right(rounds_played as usize % period);
    }
    seats
}

/// Generate the next round of a pool.
pub fn generate_round(pool: &[EntrantId], rounds_played: u32) -> Result<PoolRound, EngineError> {
    validate_pool(pool)?;
    let round = rounds_played + 1;
    if is_exhausted(pool.len(), rounds_played) {
        return Ok(PoolRound {
            round,
            exhausted: true,
            ..PoolRound::default()
        });
    }

    let seats = rotation(pool, rounds_played);
    let n = seats.len();
    let mut pairings = Vec::with_capacity(n / 2);
    let mut byes = Vec::new();
    for i in 0..n / 2 {
        match (seats[i], seats[n - 1 - i]) {
            (Seat::Entrant(home), Seat::Entrant(away)) => pairings.push(Pairing::new(home, away)),
            (Seat::Entrant(id), Seat::Bye) | (Seat::Bye, Seat::Entrant(id)) => byes.push(id),
            (Seat::Bye, Seat::Bye) => {}
        }
    }
    log::debug!(
        "Pool round {}: {} pairing(s), {} bye(s)",
        round,
        pairings.len(),
        byes.len()
    );
    Ok(PoolRound {
        round,
        pairings,
        byes,
        exhausted: false,
    })
}

pub(crate) fn validate_pool(pool: &[EntrantId]) -> Result<(), EngineError> {
    if pool.len() < 2 {
        return Err(EngineError::InvalidPoolState(format!(
            "a pool needs at least 2 entrants, got {}",
            pool.len()
        )));
    }
    let mut seen = HashSet::with_capacity(pool.len());
    if let Some(dup) = pool.iter().find(|id| !seen.insert(**id)) {
        return Err(EngineError::InvalidPoolState(format!(
            "entrant {dup} appears twice in one pool"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn ids(n: usize) -> Vec<EntrantId> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    #[test]
    fn one_rotation_moves_last_seat_to_second() {
        let pool = ids(4);
        let seats = rotation(&pool, 1);
        let expected: Vec<Seat> = [pool[0], pool[3], pool[1], pool[2]]
            .into_iter()
            .map(Seat::Entrant)
            .collect();
        assert_eq!(seats, expected);
    }

    #[test]
    fn rotation_is_periodic() {
        let pool = ids(6);
        assert_eq!(rotation(&pool, 0), rotation(&pool, 5));
    }

    #[test]
    fn odd_pool_is_padded_with_bye() {
        let pool = ids(5);
        let seats = padded(&pool);
        assert_eq!(seats.len(), 6);
        assert_eq!(seats[5], Seat::Bye);
        assert_eq!(total_rounds(5), 5);
    }
}

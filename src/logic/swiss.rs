//! Swiss rounds: pair down the current ladder, avoiding rematches.
//!
//! The season lasts `ceil(log2 n)` rounds. Each round the highest remaining
//! entrant meets the highest remaining entrant it has not played yet; if it has
//! played all of them, it meets the highest remaining one anyway. An odd entrant
//! left at the bottom takes the bye.

use crate::logic::round_robin::{validate_pool, PoolRound};
use crate::models::{EngineError, EntrantId, Pairing};

/// Rounds a Swiss season of `field` entrants plays.
pub fn total_rounds(field: usize) -> u32 {
    if field < 2 {
        return 0;
    }
    (field - 1).ilog2() + 1
}

/// Pair the next round from `ladder` (current standings, best first).
///
/// `have_met` reports whether two entrants already played this season.
pub fn pair_round(
    ladder: &[EntrantId],
    rounds_played: u32,
    have_met: impl Fn(EntrantId, EntrantId) -> bool,
) -> Result<PoolRound, EngineError> {
    validate_pool(ladder)?;
    let round = rounds_played + 1;
    if round > total_rounds(ladder.len()) {
        return Ok(PoolRound {
            round,
            exhausted: true,
            ..PoolRound::default()
        });
    }

    let mut remaining: Vec<EntrantId> = ladder.to_vec();
    let mut pairings = Vec::with_capacity(ladder.len() / 2);
    while remaining.len() >= 2 {
        let top = remaining.remove(0);
        let pick = remaining
            .iter()
            .position(|&other| !have_met(top, other))
            .unwrap_or(0);
        if have_met(top, remaining[pick]) {
            log::debug!("Swiss round {}: {} has met everyone left, rematch", round, top);
        }
        let opponent = remaining.remove(pick);
        pairings.push(Pairing::new(top, opponent));
    }

    Ok(PoolRound {
        round,
        pairings,
        byes: remaining,
        exhausted: false,
    })
}

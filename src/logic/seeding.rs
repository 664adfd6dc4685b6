//! Seeding: split the field into two pools of near-equal strength.

use crate::logic::rating::RatingLedger;
use crate::models::{EngineError, Entrant, Pool, PoolAssignment};
use std::cmp::Ordering;

/// Fewest entrants a pooled tournament can start with (two per pool).
pub const MIN_POOLED_ENTRANTS: usize = 4;

/// Order entrants strongest first. Rated entrants come before unrated ones
/// (rating exactly the initial rating); unrated entrants keep input order.
pub fn seeding_order<'a>(entrants: &'a [Entrant], ledger: &RatingLedger) -> Vec<&'a Entrant> {
    let mut keyed: Vec<(&Entrant, bool, f64)> = entrants
        .iter()
        .map(|e| (e, ledger.is_unrated(e), ledger.entrant_rating(e, None)))
        .collect();
    // Stable sort: ties keep their relative input order.
    keyed.sort_by(|(_, a_unrated, a_rating), (_, b_unrated, b_rating)| {
        a_unrated
            .cmp(b_unrated)
            .then_with(|| b_rating.partial_cmp(a_rating).unwrap_or(Ordering::Equal))
    });
    keyed.into_iter().map(|(e, _, _)| e).collect()
}

/// Assign pools alternately (1, 2, 1, 2, ...) down the seeding order.
pub fn assign_pools(
    entrants: &[Entrant],
    ledger: &RatingLedger,
) -> Result<PoolAssignment, EngineError> {
    if entrants.len() < MIN_POOLED_ENTRANTS {
        return Err(EngineError::InvalidPoolState(format!(
            "need at least {} entrants to form two pools, got {}",
            MIN_POOLED_ENTRANTS,
            entrants.len()
        )));
    }
    let slots = seeding_order(entrants, ledger)
        .into_iter()
        .enumerate()
        .map(|(i, e)| (e.id, if i % 2 == 0 { Pool::One } else { Pool::Two }))
        .collect();
    Ok(PoolAssignment { slots })
}

//! Ladder: regular-season records and standings.

use crate::logic::rating::RatingLedger;
use crate::models::{Entrant, EntrantId, GameRecord};
use serde::Serialize;
use std::cmp::Ordering;

/// Regular-season record of one entrant.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Record {
    pub played: u32,
    pub wins: u32,
    pub losses: u32,
    pub points_for: u32,
    pub points_against: u32,
}

impl Record {
    pub fn point_difference(&self) -> i64 {
        i64::from(self.points_for) - i64::from(self.points_against)
    }
}

/// One row of a ladder.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Standing {
    pub entrant: EntrantId,
    pub record: Record,
    pub rating: f64,
}

/// Tally an entrant's record over resolved, non-final games.
pub fn record_of(entrant: EntrantId, games: &[GameRecord]) -> Record {
    let mut record = Record::default();
    for game in games.iter().filter(|g| !g.is_final) {
        let (Some(result), Some(side)) = (game.result, game.pairing.side_of(entrant)) else {
            continue;
        };
        record.played += 1;
        record.points_for += result.score(side);
        record.points_against += result.score(side.other());
        if result.winner == side {
            record.wins += 1;
        } else {
            record.losses += 1;
        }
    }
    record
}

/// Order entrants by wins, then point difference, then current rating (all
/// descending). Exact ties keep the order `entrants` were given in.
pub fn standings(entrants: &[Entrant], games: &[GameRecord], ledger: &RatingLedger) -> Vec<Standing> {
    let mut rows: Vec<Standing> = entrants
        .iter()
        .map(|e| Standing {
            entrant: e.id,
            record: record_of(e.id, games),
            rating: ledger.entrant_rating(e, None),
        })
        .collect();
    rows.sort_by(|a, b| {
        b.record
            .wins
            .cmp(&a.record.wins)
            .then_with(|| b.record.point_difference().cmp(&a.record.point_difference()))
            .then_with(|| b.rating.partial_cmp(&a.rating).unwrap_or(Ordering::Equal))
    });
    rows
}

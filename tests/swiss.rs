//! Integration tests for Swiss pairing.

use pool_finals_engine::logic::swiss::{pair_round, total_rounds};
use pool_finals_engine::{EngineError, EntrantId, Pairing};
use uuid::Uuid;

fn field(n: usize) -> Vec<EntrantId> {
    (0..n).map(|_| Uuid::new_v4()).collect()
}

fn met(history: &[(EntrantId, EntrantId)]) -> impl Fn(EntrantId, EntrantId) -> bool + '_ {
    move |a, b| history.iter().any(|&(x, y)| (x == a && y == b) || (x == b && y == a))
}

#[test]
fn first_round_pairs_down_the_ladder() {
    let l = field(6);
    let round = pair_round(&l, 0, met(&[])).unwrap();
    assert_eq!(round.round, 1);
    assert_eq!(
        round.pairings,
        vec![
            Pairing::new(l[0], l[1]),
            Pairing::new(l[2], l[3]),
            Pairing::new(l[4], l[5]),
        ]
    );
    assert!(round.byes.is_empty());
}

#[test]
fn leader_skips_opponents_already_met() {
    let l = field(4);
    let history = [(l[0], l[1])];
    let round = pair_round(&l, 1, met(&history)).unwrap();
    assert_eq!(
        round.pairings,
        vec![Pairing::new(l[0], l[2]), Pairing::new(l[1], l[3])]
    );
}

#[test]
fn rematch_when_everyone_left_was_met() {
    let l = field(3);
    let history = [(l[0], l[1]), (l[0], l[2])];
    let round = pair_round(&l, 1, met(&history)).unwrap();
    assert_eq!(round.pairings, vec![Pairing::new(l[0], l[1])]);
    assert_eq!(round.byes, vec![l[2]]);
}

#[test]
fn bottom_of_odd_field_takes_the_bye() {
    let l = field(5);
    let round = pair_round(&l, 0, met(&[])).unwrap();
    assert_eq!(round.pairings.len(), 2);
    assert_eq!(round.byes, vec![l[4]]);
}

#[test]
fn season_ends_after_ceil_log2_rounds() {
    let l = field(5);
    assert_eq!(total_rounds(l.len()), 3);
    assert!(!pair_round(&l, 2, met(&[])).unwrap().exhausted);
    let done = pair_round(&l, 3, met(&[])).unwrap();
    assert!(done.exhausted);
    assert!(done.pairings.is_empty() && done.byes.is_empty());
}

#[test]
fn single_entrant_field_is_invalid() {
    assert!(matches!(
        pair_round(&field(1), 0, met(&[])),
        Err(EngineError::InvalidPoolState(_))
    ));
}

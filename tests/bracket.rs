//! Integration tests for the finals bracket.

use pool_finals_engine::logic::bracket::{
    advance, advance_top_three, ladder_semifinals, pooled_semifinals, podium, top_three,
    top_three_podium, top_three_state, BracketState, BracketStep, Podium,
};
use pool_finals_engine::{
    bracket_state, EngineError, EntrantId, GameRecord, GameResult, Pairing, Record, Side,
    Standing,
};
use uuid::Uuid;

fn final_game(id: u64, round: u32, home: EntrantId, away: EntrantId, winner: Option<Side>) -> GameRecord {
    GameRecord {
        id,
        tournament_id: Uuid::nil(),
        round,
        pairing: Pairing::new(home, away),
        is_final: true,
        ranked: false,
        result: winner.map(|w| GameResult::played(w, 11, 6)),
    }
}

fn ids<const N: usize>() -> [EntrantId; N] {
    std::array::from_fn(|_| Uuid::new_v4())
}

fn standing(entrant: EntrantId) -> Standing {
    Standing {
        entrant,
        record: Record::default(),
        rating: 1500.0,
    }
}

fn no_semifinals() -> Result<[Pairing; 2], EngineError> {
    panic!("semifinal seeding must not be requested once the bracket has started")
}

#[test]
fn state_is_derived_from_final_games() {
    let [a, b, c, d] = ids::<4>();
    assert_eq!(bracket_state(&[]).unwrap(), BracketState::NotStarted);

    let semis = vec![
        final_game(1, 6, a, b, None),
        final_game(2, 6, c, d, Some(Side::Home)),
    ];
    assert_eq!(bracket_state(&semis).unwrap(), BracketState::SemifinalsScheduled);

    let mut all = semis.clone();
    all.push(final_game(3, 7, b, d, Some(Side::Away)));
    all.push(final_game(4, 7, a, c, None));
    assert_eq!(bracket_state(&all).unwrap(), BracketState::MedalGamesScheduled);

    all[0].result = Some(GameResult::played(Side::Home, 11, 2));
    all[3].result = Some(GameResult::played(Side::Home, 11, 2));
    assert_eq!(bracket_state(&all).unwrap(), BracketState::Complete);
}

#[test]
fn unexpected_final_game_counts_fail_loudly() {
    let [a, b, c, d] = ids::<4>();
    let one = vec![final_game(1, 6, a, b, Some(Side::Home))];
    assert!(matches!(
        bracket_state(&one),
        Err(EngineError::BracketMismatch { final_games: 1 })
    ));

    let three = vec![
        final_game(1, 6, a, b, Some(Side::Home)),
        final_game(2, 6, c, d, Some(Side::Home)),
        final_game(3, 6, a, c, Some(Side::Home)),
    ];
    assert!(matches!(bracket_state(&three), Err(EngineError::DuplicateFixture(_))));
    assert!(matches!(
        advance(&three, 6, no_semifinals),
        Err(EngineError::DuplicateFixture(_))
    ));
}

#[test]
fn not_started_schedules_semifinals_after_latest_round() {
    let [a1, a2, b1, b2] = ids::<4>();
    let step = advance(&[], 5, || {
        pooled_semifinals(&[standing(a1), standing(a2)], &[standing(b1), standing(b2)])
    })
    .unwrap();
    assert_eq!(
        step,
        BracketStep::Schedule {
            state: BracketState::SemifinalsScheduled,
            round: 6,
            pairings: vec![Pairing::new(a1, b2), Pairing::new(b1, a2)],
        }
    );
}

#[test]
fn resolved_semifinals_schedule_bronze_then_gold() {
    let [a, b, c, d] = ids::<4>();
    let semis = vec![
        final_game(10, 6, a, b, Some(Side::Home)),
        final_game(11, 7, d, c, Some(Side::Away)),
    ];
    let step = advance(&semis, 7, no_semifinals).unwrap();
    assert_eq!(
        step,
        BracketStep::Schedule {
            state: BracketState::MedalGamesScheduled,
            round: 8,
            pairings: vec![Pairing::new(b, d), Pairing::new(a, c)],
        }
    );
}

#[test]
fn unresolved_stage_is_an_incomplete_round() {
    let [a, b, c, d] = ids::<4>();
    let semis = vec![
        final_game(1, 6, a, b, Some(Side::Home)),
        final_game(2, 6, c, d, None),
    ];
    let err = advance(&semis, 6, no_semifinals).unwrap_err();
    assert_eq!(err, EngineError::IncompleteRound { round: 6, unresolved: 1 });
    assert!(err.is_retryable());

    // Repeating the call changes nothing.
    assert_eq!(advance(&semis, 6, no_semifinals).unwrap_err(), err);
}

#[test]
fn complete_bracket_reports_podium_every_time() {
    let [a, b, c, d] = ids::<4>();
    let games = vec![
        final_game(1, 6, a, b, Some(Side::Home)),
        final_game(2, 6, c, d, Some(Side::Home)),
        final_game(3, 7, b, d, Some(Side::Away)),
        final_game(4, 7, a, c, Some(Side::Away)),
    ];
    let expected = Podium {
        champion: c,
        runner_up: a,
        third: d,
    };
    assert_eq!(podium(&games).unwrap(), expected);
    assert_eq!(advance(&games, 7, no_semifinals).unwrap(), BracketStep::Complete(expected));
    assert_eq!(advance(&games, 7, no_semifinals).unwrap(), BracketStep::Complete(expected));
}

#[test]
fn gold_game_is_found_by_participants_not_position() {
    let [a, b, c, d] = ids::<4>();
    // Gold created before bronze this time.
    let games = vec![
        final_game(1, 6, a, b, Some(Side::Home)),
        final_game(2, 6, c, d, Some(Side::Home)),
        final_game(3, 7, a, c, Some(Side::Home)),
        final_game(4, 7, b, d, Some(Side::Home)),
    ];
    assert_eq!(
        podium(&games).unwrap(),
        Podium {
            champion: a,
            runner_up: c,
            third: b,
        }
    );
}

#[test]
fn bronze_winner_already_in_gold_game_yields_its_loser() {
    let [a, b, c, d] = ids::<4>();
    // Inconsistent data: the "bronze" game features gold finalist a.
    let games = vec![
        final_game(1, 6, a, b, Some(Side::Home)),
        final_game(2, 6, c, d, Some(Side::Home)),
        final_game(3, 7, a, c, Some(Side::Away)),
        final_game(4, 7, a, b, Some(Side::Home)),
    ];
    assert_eq!(
        podium(&games).unwrap(),
        Podium {
            champion: c,
            runner_up: a,
            third: b,
        }
    );
}

#[test]
fn ladder_semifinals_pair_first_with_fourth() {
    let [a, b, c, d, e] = ids::<5>();
    let ladder: Vec<Standing> = [a, b, c, d, e].into_iter().map(standing).collect();
    assert_eq!(
        ladder_semifinals(&ladder).unwrap(),
        [Pairing::new(a, d), Pairing::new(b, c)]
    );
    assert!(matches!(
        ladder_semifinals(&ladder[..3]),
        Err(EngineError::InvalidPoolState(_))
    ));
}

#[test]
fn top_three_series_qualifier_then_grand_final() {
    let [a, b, c] = ids::<3>();
    let ladder: Vec<Standing> = [a, b, c].into_iter().map(standing).collect();
    let seeds = || top_three(&ladder);

    let step = advance_top_three(&[], 3, seeds).unwrap();
    assert_eq!(
        step,
        BracketStep::Schedule {
            state: BracketState::SemifinalsScheduled,
            round: 4,
            pairings: vec![Pairing::new(b, c)],
        }
    );

    // c upsets b in the qualifier and meets the ladder leader.
    let qualifier = final_game(7, 4, b, c, Some(Side::Away));
    let step = advance_top_three(&[qualifier.clone()], 4, seeds).unwrap();
    assert_eq!(
        step,
        BracketStep::Schedule {
            state: BracketState::MedalGamesScheduled,
            round: 5,
            pairings: vec![Pairing::new(a, c)],
        }
    );

    let mut grand_final = final_game(8, 5, a, c, None);
    let open = [qualifier.clone(), grand_final.clone()];
    assert_eq!(top_three_state(&open), Ok(BracketState::MedalGamesScheduled));
    assert_eq!(
        advance_top_three(&open, 5, seeds),
        Err(EngineError::IncompleteRound { round: 5, unresolved: 1 })
    );

    grand_final.result = Some(GameResult::played(Side::Away, 8, 11));
    let done = [qualifier, grand_final];
    let expected = Podium {
        champion: c,
        runner_up: a,
        third: b,
    };
    assert_eq!(top_three_podium(&done), Ok(expected));
    assert_eq!(advance_top_three(&done, 5, seeds), Ok(BracketStep::Complete(expected)));
}

#[test]
fn top_three_series_rejects_extra_games_and_short_ladders() {
    let [a, b, c] = ids::<3>();
    let games = [
        final_game(1, 4, b, c, Some(Side::Home)),
        final_game(2, 5, a, b, Some(Side::Home)),
        final_game(3, 5, a, b, Some(Side::Home)),
    ];
    assert!(matches!(top_three_state(&games), Err(EngineError::DuplicateFixture(_))));
    assert!(matches!(
        top_three(&[standing(a), standing(b)]),
        Err(EngineError::InvalidPoolState(_))
    ));
}

//! Integration tests for the rating ledger.

use pool_finals_engine::{
    EngineError, Entrant, GameRecord, GameResult, Pairing, RatingConfig, RatingLedger,
    Resolution, Side,
};
use uuid::Uuid;

fn game(id: u64, home: &Entrant, away: &Entrant, result: GameResult) -> GameRecord {
    GameRecord {
        id,
        tournament_id: Uuid::nil(),
        round: 1,
        pairing: Pairing::new(home.id, away.id),
        is_final: false,
        ranked: true,
        result: Some(result),
    }
}

fn home_win() -> GameResult {
    GameResult::played(Side::Home, 11, 7)
}

#[test]
fn equal_ratings_winner_gains_twenty() {
    let mut ledger = RatingLedger::new(RatingConfig::default());
    let a = Entrant::solo("A");
    let b = Entrant::solo("B");
    let events = ledger.record_outcome(&game(1, &a, &b, home_win()), &a, &b).unwrap();

    assert_eq!(events.len(), 2);
    assert_eq!(ledger.rating_of(a.id, None), 1520.0);
    assert_eq!(ledger.rating_of(b.id, None), 1480.0);
}

#[test]
fn deltas_are_zero_sum_for_unequal_ratings() {
    let mut ledger = RatingLedger::new(RatingConfig::default());
    let a = Entrant::solo("A");
    let b = Entrant::solo("B");
    ledger.record_outcome(&game(1, &a, &b, home_win()), &a, &b).unwrap();
    let events = ledger.record_outcome(&game(2, &a, &b, home_win()), &a, &b).unwrap();

    let da = events.iter().find(|e| e.player_id == a.id).unwrap().delta;
    let db = events.iter().find(|e| e.player_id == b.id).unwrap().delta;
    assert!(da > 0.0 && da < 20.0, "favourite gains less than 20, got {da}");
    assert!((da + db).abs() < 1e-9);
}

#[test]
fn rating_is_base_plus_sum_of_deltas() {
    let mut ledger = RatingLedger::new(RatingConfig::default());
    let a = Entrant::solo("A");
    let b = Entrant::solo("B");
    let c = Entrant::solo("C");
    ledger.record_outcome(&game(1, &a, &b, home_win()), &a, &b).unwrap();
    ledger
        .record_outcome(&game(2, &c, &a, GameResult::played(Side::Home, 11, 3)), &c, &a)
        .unwrap();
    ledger.record_outcome(&game(3, &a, &c, home_win()), &a, &c).unwrap();

    let sum: f64 = ledger
        .events()
        .iter()
        .filter(|e| e.player_id == a.id)
        .map(|e| e.delta)
        .sum();
    assert!((ledger.rating_of(a.id, None) - (1500.0 + sum)).abs() < 1e-9);
}

#[test]
fn as_of_limits_history() {
    let mut ledger = RatingLedger::new(RatingConfig::default());
    let a = Entrant::solo("A");
    let b = Entrant::solo("B");
    ledger.record_outcome(&game(1, &a, &b, home_win()), &a, &b).unwrap();
    ledger.record_outcome(&game(2, &a, &b, home_win()), &a, &b).unwrap();

    assert_eq!(ledger.rating_of(a.id, Some(0)), 1500.0);
    assert_eq!(ledger.rating_of(a.id, Some(1)), 1520.0);
    assert!(ledger.rating_of(a.id, Some(2)) > 1520.0);
    assert_eq!(ledger.rating_of(a.id, Some(2)), ledger.rating_of(a.id, None));
}

#[test]
fn disjoint_games_are_order_independent() {
    let a = Entrant::solo("A");
    let b = Entrant::solo("B");
    let c = Entrant::solo("C");
    let d = Entrant::solo("D");
    let g1 = game(1, &a, &b, home_win());
    let g2 = game(2, &c, &d, GameResult::played(Side::Away, 4, 11));

    let mut forward = RatingLedger::new(RatingConfig::default());
    forward.record_outcome(&g1, &a, &b).unwrap();
    forward.record_outcome(&g2, &c, &d).unwrap();

    let mut backward = RatingLedger::new(RatingConfig::default());
    backward.record_outcome(&g2, &c, &d).unwrap();
    backward.record_outcome(&g1, &a, &b).unwrap();

    for e in [&a, &b, &c, &d] {
        assert_eq!(forward.rating_of(e.id, None), backward.rating_of(e.id, None));
    }
}

#[test]
fn recording_a_game_twice_is_rejected() {
    let mut ledger = RatingLedger::new(RatingConfig::default());
    let a = Entrant::solo("A");
    let b = Entrant::solo("B");
    let g = game(7, &a, &b, home_win());
    ledger.record_outcome(&g, &a, &b).unwrap();

    let err = ledger.record_outcome(&g, &a, &b).unwrap_err();
    assert!(matches!(err, EngineError::RatingLedgerConsistency { game: 7, .. }));
    assert_eq!(ledger.events().len(), 2);
    assert_eq!(ledger.rating_of(a.id, None), 1520.0);
}

#[test]
fn forfeits_unranked_and_short_abandonments_are_not_rated() {
    let mut ledger = RatingLedger::new(RatingConfig::default());
    let a = Entrant::solo("A");
    let b = Entrant::solo("B");

    let forfeit = game(1, &a, &b, GameResult::forfeit(Side::Home));
    assert!(ledger.record_outcome(&forfeit, &a, &b).unwrap().is_empty());

    let mut unranked = game(2, &a, &b, home_win());
    unranked.ranked = false;
    assert!(ledger.record_outcome(&unranked, &a, &b).unwrap().is_empty());

    let short = GameResult {
        winner: Side::Home,
        home_score: 4,
        away_score: 2,
        resolution: Resolution::Abandoned,
    };
    assert!(ledger.record_outcome(&game(3, &a, &b, short), &a, &b).unwrap().is_empty());

    let long = GameResult {
        home_score: 5,
        ..short
    };
    assert_eq!(ledger.record_outcome(&game(4, &a, &b, long), &a, &b).unwrap().len(), 2);
}

#[test]
fn team_rating_is_mean_of_players() {
    let mut ledger = RatingLedger::new(RatingConfig::default());
    let p1 = Uuid::new_v4();
    let p2 = Uuid::new_v4();
    let team = Entrant::new("Team", vec![p1, p2]);
    let solo = Entrant::solo("Solo");
    let warmup = Entrant::solo("Warmup");

    // Only p1's history moves; the team rating is the average of both players.
    let p1_entrant = Entrant {
        id: Uuid::new_v4(),
        name: "P1".into(),
        players: vec![p1],
    };
    ledger
        .record_outcome(&game(1, &p1_entrant, &warmup, home_win()), &p1_entrant, &warmup)
        .unwrap();
    assert_eq!(ledger.entrant_rating(&team, None), 1510.0);

    let events = ledger.record_outcome(&game(2, &team, &solo, home_win()), &team, &solo).unwrap();
    assert_eq!(events.len(), 3);
    let team_deltas: Vec<f64> = events
        .iter()
        .filter(|e| e.player_id == p1 || e.player_id == p2)
        .map(|e| e.delta)
        .collect();
    assert_eq!(team_deltas[0], team_deltas[1]);
}

#[test]
fn unrated_means_exactly_the_initial_rating() {
    let mut ledger = RatingLedger::new(RatingConfig::default());
    let a = Entrant::solo("A");
    let b = Entrant::solo("B");
    assert!(ledger.is_unrated(&a));
    ledger.record_outcome(&game(1, &a, &b, home_win()), &a, &b).unwrap();
    assert!(!ledger.is_unrated(&a));
}

#[test]
fn rebuild_matches_incremental_history() {
    let a = Entrant::solo("A");
    let b = Entrant::solo("B");
    let c = Entrant::solo("C");
    let games = vec![
        game(1, &a, &b, home_win()),
        game(2, &b, &c, GameResult::played(Side::Away, 9, 11)),
        game(3, &c, &a, home_win()),
        game(4, &a, &b, GameResult::forfeit(Side::Away)),
    ];
    let entrants = vec![a.clone(), b.clone(), c.clone()];

    let mut incremental = RatingLedger::new(RatingConfig::default());
    for g in &games[..3] {
        let home = entrants.iter().find(|e| e.id == g.pairing.home).unwrap();
        let away = entrants.iter().find(|e| e.id == g.pairing.away).unwrap();
        incremental.record_outcome(g, home, away).unwrap();
    }

    let mut rebuilt = RatingLedger::new(RatingConfig::default());
    // Rebuilding replaces whatever was there.
    rebuilt.record_outcome(&games[0], &a, &b).unwrap();
    rebuilt.rebuild(&games, &entrants).unwrap();

    assert_eq!(rebuilt.events().len(), 6);
    for e in &entrants {
        assert_eq!(rebuilt.rating_of(e.id, None), incremental.rating_of(e.id, None));
    }
}

#[test]
fn failed_rebuild_keeps_existing_history() {
    let a = Entrant::solo("A");
    let b = Entrant::solo("B");
    let stranger = Entrant::solo("Stranger");
    let mut ledger = RatingLedger::new(RatingConfig::default());
    ledger.record_outcome(&game(1, &a, &b, home_win()), &a, &b).unwrap();
    let before = ledger.events().to_vec();

    let games = vec![game(1, &a, &b, home_win()), game(2, &a, &stranger, home_win())];
    let err = ledger.rebuild(&games, &[a.clone(), b.clone()]).unwrap_err();

    assert_eq!(err, EngineError::EntrantNotFound(stranger.id));
    assert_eq!(ledger.events(), &before[..]);
    assert_eq!(ledger.rating_of(a.id, None), 1520.0);
}

#[test]
fn csv_export_has_one_row_per_event() {
    let mut ledger = RatingLedger::new(RatingConfig::default());
    let a = Entrant::solo("A");
    let b = Entrant::solo("B");
    ledger.record_outcome(&game(1, &a, &b, home_win()), &a, &b).unwrap();

    let mut buf = Vec::new();
    ledger.write_csv(&mut buf).unwrap();
    let text = String::from_utf8(buf).unwrap();
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("game_id,player_id,tournament_id,delta,created_at")
    );
    assert_eq!(lines.count(), 2);
    assert!(text.contains(&a.id.to_string()));
}

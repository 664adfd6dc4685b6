//! Rating ledger: append-only per-player deltas, ratings derived by summation.

use crate::config::RatingConfig;
use crate::models::{
    EngineError, Entrant, EntrantId, GameId, GameRecord, PlayerId, RatingEvent, Resolution, Side,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io;

/// Expected score of `me` against `other`.
pub fn expected_score(other: f64, me: f64, config: &RatingConfig) -> f64 {
    1.0 / (1.0 + 10f64.powf(config.k_factor * (other - me) / config.divisor))
}

/// Rating change for `me` after a game against `other`.
pub fn rating_delta(me: f64, other: f64, won: bool, config: &RatingConfig) -> f64 {
    let actual = if won { 1.0 } else { 0.0 };
    config.k_factor * (actual - expected_score(other, me, config))
}

/// Whether a resolved game moves ratings: ranked, and actually played
/// (an abandoned game counts once the leading side reached the threshold).
pub fn is_rated(game: &GameRecord, config: &RatingConfig) -> bool {
    let Some(result) = game.result else {
        return false;
    };
    if !game.ranked {
        return false;
    }
    match result.resolution {
        Resolution::Played => true,
        Resolution::Forfeit => false,
        Resolution::Abandoned => {
            result.home_score.max(result.away_score) >= config.abandon_min_score
        }
    }
}

/// Append-only history of rating events.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RatingLedger {
    config: RatingConfig,
    events: Vec<RatingEvent>,
}

impl RatingLedger {
    pub fn new(config: RatingConfig) -> Self {
        Self {
            config,
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &RatingConfig {
        &self.config
    }

    pub fn events(&self) -> &[RatingEvent] {
        &self.events
    }

    pub fn has_events_for(&self, game: GameId) -> bool {
        self.events.iter().any(|e| e.game_id == game)
    }

    /// Player rating from events with `game_id <= as_of` (all events when None).
    pub fn rating_of(&self, player: PlayerId, as_of: Option<GameId>) -> f64 {
        self.sum_deltas(player, |g| as_of.map_or(true, |limit| g <= limit))
    }

    /// Player rating going into `game` (events of strictly earlier games).
    pub fn rating_before(&self, player: PlayerId, game: GameId) -> f64 {
        self.sum_deltas(player, |g| g < game)
    }

    /// Deltas are summed in game-id order, so the result does not depend on
    /// the order in which independent games were appended.
    fn sum_deltas(&self, player: PlayerId, include: impl Fn(GameId) -> bool) -> f64 {
        let mut deltas: Vec<(GameId, f64)> = self
            .events
            .iter()
            .filter(|e| e.player_id == player && include(e.game_id))
            .map(|e| (e.game_id, e.delta))
            .collect();
        deltas.sort_by_key(|(g, _)| *g);
        deltas
            .into_iter()
            .fold(self.config.initial_rating, |acc, (_, d)| acc + d)
    }

    /// Entrant rating: the mean of its players' ratings.
    pub fn entrant_rating(&self, entrant: &Entrant, as_of: Option<GameId>) -> f64 {
        self.mean_rating(entrant, |p| self.rating_of(p, as_of))
    }

    fn entrant_rating_before(&self, entrant: &Entrant, game: GameId) -> f64 {
        self.mean_rating(entrant, |p| self.rating_before(p, game))
    }

    fn mean_rating(&self, entrant: &Entrant, rating: impl Fn(PlayerId) -> f64) -> f64 {
        if entrant.players.is_empty() {
            return self.config.initial_rating;
        }
        let total: f64 = entrant.players.iter().map(|&p| rating(p)).sum();
        total / entrant.players.len() as f64
    }

    /// An entrant with no rating history sits exactly on the initial rating.
    pub fn is_unrated(&self, entrant: &Entrant) -> bool {
        self.entrant_rating(entrant, None) == self.config.initial_rating
    }

    /// Compute the events a resolved game would append, without appending them.
    /// Returns no events for games that do not move ratings.
    pub fn outcome_events(
        &self,
        game: &GameRecord,
        home: &Entrant,
        away: &Entrant,
    ) -> Result<Vec<RatingEvent>, EngineError> {
        check_roster(game, home, Side::Home)?;
        check_roster(game, away, Side::Away)?;
        if !is_rated(game, &self.config) {
            return Ok(Vec::new());
        }
        let Some(result) = game.result else {
            return Ok(Vec::new());
        };

        let home_rating = self.entrant_rating_before(home, game.id);
        let away_rating = self.entrant_rating_before(away, game.id);
        let home_delta =
            rating_delta(home_rating, away_rating, result.winner == Side::Home, &self.config);
        let away_delta =
            rating_delta(away_rating, home_rating, result.winner == Side::Away, &self.config);

        let created_at = Utc::now();
        let events = home
            .players
            .iter()
            .map(|&p| (p, home_delta))
            .chain(away.players.iter().map(|&p| (p, away_delta)))
            .map(|(player_id, delta)| RatingEvent {
                game_id: game.id,
                player_id,
                tournament_id: game.tournament_id,
                delta,
                created_at,
            })
            .collect();
        Ok(events)
    }

    /// Append one game's events as a unit: either all are written or none.
    pub fn append(&mut self, events: Vec<RatingEvent>) -> Result<(), EngineError> {
        let existing: HashSet<(GameId, PlayerId)> = self
            .events
            .iter()
            .map(|e| (e.game_id, e.player_id))
            .collect();
        let mut incoming = HashSet::new();
        for e in &events {
            let key = (e.game_id, e.player_id);
            if existing.contains(&key) || !incoming.insert(key) {
                log::warn!(
                    "Rejected rating events for game {}: player {} already rated",
                    e.game_id,
                    e.player_id
                );
                return Err(EngineError::RatingLedgerConsistency {
                    game: e.game_id,
                    player: e.player_id,
                });
            }
        }
        self.events.extend(events);
        Ok(())
    }

    /// Compute and append the events for one resolved game.
    pub fn record_outcome(
        &mut self,
        game: &GameRecord,
        home: &Entrant,
        away: &Entrant,
    ) -> Result<Vec<RatingEvent>, EngineError> {
        let events = self.outcome_events(game, home, away)?;
        self.append(events.clone())?;
        if !events.is_empty() {
            log::debug!("Recorded {} rating event(s) for game {}", events.len(), game.id);
        }
        Ok(events)
    }

    /// Administrative rebuild: replay all rated games in id order into a fresh
    /// ledger. The current events are replaced only if the whole replay succeeds.
    pub fn rebuild(&mut self, games: &[GameRecord], entrants: &[Entrant]) -> Result<(), EngineError> {
        let mut ordered: Vec<&GameRecord> = games.iter().collect();
        ordered.sort_by_key(|g| g.id);
        let mut fresh = RatingLedger::new(self.config);
        for game in ordered {
            if !is_rated(game, &fresh.config) {
                continue;
            }
            let replayed = find_entrant(entrants, game.pairing.home).and_then(|home| {
                let away = find_entrant(entrants, game.pairing.away)?;
                fresh.record_outcome(game, home, away)
            });
            if let Err(e) = replayed {
                log::warn!("Rating rebuild aborted at game {}: {}", game.id, e);
                return Err(e);
            }
        }
        log::info!(
            "Rebuilt rating ledger: {} event(s), previously {}",
            fresh.events.len(),
            self.events.len()
        );
        *self = fresh;
        Ok(())
    }

    /// Export every event as CSV rows.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut wtr = csv::Writer::from_writer(writer);
        for event in &self.events {
            wtr.serialize(event)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

fn check_roster(game: &GameRecord, entrant: &Entrant, side: Side) -> Result<(), EngineError> {
    if game.pairing.get(side) == entrant.id {
        Ok(())
    } else {
        Err(EngineError::EntrantNotFound(entrant.id))
    }
}

fn find_entrant(entrants: &[Entrant], id: EntrantId) -> Result<&Entrant, EngineError> {
    entrants
        .iter()
        .find(|e| e.id == id)
        .ok_or(EngineError::EntrantNotFound(id))
}

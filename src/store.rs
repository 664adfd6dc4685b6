//! The game/tournament store the engine reads from and writes through.
//!
//! The engine never keeps state between calls; everything is re-read from a
//! `TournamentStore`. `InMemoryStore` is the implementation used by the web
//! binary and the tests.

use crate::config::RatingConfig;
use crate::logic::rating::RatingLedger;
use crate::models::{
    ByeRecord, EngineError, EntrantId, GameId, GameRecord, GameResult, NewFixture,
    PoolAssignment, RatingEvent, Tournament, TournamentId,
};
use std::collections::HashMap;

/// Persistence operations the engine depends on.
pub trait TournamentStore {
    fn tournament(&self, id: TournamentId) -> Result<Tournament, EngineError>;

    fn save_tournament(&mut self, tournament: Tournament) -> Result<(), EngineError>;

    /// All games of a tournament, in creation order.
    fn games_of(&self, id: TournamentId) -> Vec<GameRecord>;

    fn byes_of(&self, id: TournamentId) -> Vec<ByeRecord>;

    /// Request a game. Creating the same (round, pair, is_final) twice returns the first id.
    fn create_fixture(
        &mut self,
        id: TournamentId,
        fixture: NewFixture,
    ) -> Result<GameId, EngineError>;

    fn record_bye(
        &mut self,
        id: TournamentId,
        round: u32,
        entrant: EntrantId,
    ) -> Result<(), EngineError>;

    /// Snapshot of the rating ledger.
    fn rating_ledger(&self) -> RatingLedger;

    /// Append all events of one game as a single unit.
    fn append_rating_events(&mut self, events: Vec<RatingEvent>) -> Result<(), EngineError>;

    /// Final-flagged games in creation order.
    fn final_games_of(&self, id: TournamentId) -> Vec<GameRecord> {
        self.games_of(id).into_iter().filter(|g| g.is_final).collect()
    }

    /// Highest round of any game or bye so far (0 before the first round).
    fn latest_round_of(&self, id: TournamentId) -> u32 {
        let games = self.games_of(id).into_iter().map(|g| g.round);
        let byes = self.byes_of(id).into_iter().map(|b| b.round);
        games.chain(byes).max().unwrap_or(0)
    }

    fn pool_assignment_of(&self, id: TournamentId) -> Result<Option<PoolAssignment>, EngineError> {
        Ok(self.tournament(id)?.pools)
    }
}

/// Store holding everything in process memory.
#[derive(Clone, Debug)]
pub struct InMemoryStore {
    tournaments: HashMap<TournamentId, Tournament>,
    games: Vec<GameRecord>,
    byes: Vec<ByeRecord>,
    ledger: RatingLedger,
    next_game_id: GameId,
}

impl InMemoryStore {
    pub fn new(rating: RatingConfig) -> Self {
        Self {
            tournaments: HashMap::new(),
            games: Vec::new(),
            byes: Vec::new(),
            ledger: RatingLedger::new(rating),
            next_game_id: 1,
        }
    }

    pub fn insert_tournament(&mut self, tournament: Tournament) -> TournamentId {
        let id = tournament.id;
        self.tournaments.insert(id, tournament);
        id
    }

    pub fn tournaments(&self) -> impl Iterator<Item = &Tournament> {
        self.tournaments.values()
    }

    pub fn tournament_mut(&mut self, id: TournamentId) -> Result<&mut Tournament, EngineError> {
        self.tournaments
            .get_mut(&id)
            .ok_or(EngineError::TournamentNotFound(id))
    }

    pub fn game(&self, id: GameId) -> Result<&GameRecord, EngineError> {
        self.games
            .iter()
            .find(|g| g.id == id)
            .ok_or(EngineError::GameNotFound(id))
    }

    /// Every game across all tournaments.
    pub fn all_games(&self) -> &[GameRecord] {
        &self.games
    }

    pub fn ledger(&self) -> &RatingLedger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut RatingLedger {
        &mut self.ledger
    }

    /// Record a game's result. A resolved game cannot be resolved again.
    pub fn resolve_game(&mut self, id: GameId, result: GameResult) -> Result<(), EngineError> {
        result.validate()?;
        let game = self
            .games
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or(EngineError::GameNotFound(id))?;
        if game.result.is_some() {
            return Err(EngineError::InvalidState(format!(
                "game {id} already has a result"
            )));
        }
        game.result = Some(result);
        Ok(())
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new(RatingConfig::default())
    }
}

impl TournamentStore for InMemoryStore {
    fn tournament(&self, id: TournamentId) -> Result<Tournament, EngineError> {
        self.tournaments
            .get(&id)
            .cloned()
            .ok_or(EngineError::TournamentNotFound(id))
    }

    fn save_tournament(&mut self, tournament: Tournament) -> Result<(), EngineError> {
        let slot = self.tournament_mut(tournament.id)?;
        *slot = tournament;
        Ok(())
    }

    fn games_of(&self, id: TournamentId) -> Vec<GameRecord> {
        self.games
            .iter()
            .filter(|g| g.tournament_id == id)
            .cloned()
            .collect()
    }

    fn byes_of(&self, id: TournamentId) -> Vec<ByeRecord> {
        self.byes
            .iter()
            .filter(|b| b.tournament_id == id)
            .copied()
            .collect()
    }

    fn create_fixture(
        &mut self,
        id: TournamentId,
        fixture: NewFixture,
    ) -> Result<GameId, EngineError> {
        if !self.tournaments.contains_key(&id) {
            return Err(EngineError::TournamentNotFound(id));
        }
        let existing = self.games.iter().find(|g| {
            g.tournament_id == id
                && g.round == fixture.round
                && g.is_final == fixture.is_final
                && g.pairing.same_matchup(&fixture.pairing)
        });
        if let Some(game) = existing {
            return Ok(game.id);
        }
        let game_id = self.next_game_id;
        self.next_game_id += 1;
        self.games.push(GameRecord {
            id: game_id,
            tournament_id: id,
            round: fixture.round,
            pairing: fixture.pairing,
            is_final: fixture.is_final,
            ranked: fixture.ranked,
            result: None,
        });
        Ok(game_id)
    }

    fn record_bye(
        &mut self,
        id: TournamentId,
        round: u32,
        entrant: EntrantId,
    ) -> Result<(), EngineError> {
        if !self.tournaments.contains_key(&id) {
            return Err(EngineError::TournamentNotFound(id));
        }
        let bye = ByeRecord {
            tournament_id: id,
            round,
            entrant,
        };
        if !self.byes.contains(&bye) {
            self.byes.push(bye);
        }
        Ok(())
    }

    fn rating_ledger(&self) -> RatingLedger {
        self.ledger.clone()
    }

    fn append_rating_events(&mut self, events: Vec<RatingEvent>) -> Result<(), EngineError> {
        self.ledger.append(events)
    }
}

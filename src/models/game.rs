//! Fixtures, game records and results.

use crate::models::entrant::EntrantId;
use crate::models::error::EngineError;
use crate::models::tournament::TournamentId;
use serde::{Deserialize, Serialize};

/// Store-assigned game identifier. Ids grow with creation order.
pub type GameId = u64;

/// Which slot of a pairing an entrant occupies (and which slot won).
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    #[default]
    Home,
    Away,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::Home => Side::Away,
            Side::Away => Side::Home,
        }
    }
}

/// Two entrants meeting in one game, in explicit home/away slots.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Pairing {
    pub home: EntrantId,
    pub away: EntrantId,
}

impl Pairing {
    pub fn new(home: EntrantId, away: EntrantId) -> Self {
        Self { home, away }
    }

    pub fn get(&self, side: Side) -> EntrantId {
        match side {
            Side::Home => self.home,
            Side::Away => self.away,
        }
    }

    pub fn side_of(&self, entrant: EntrantId) -> Option<Side> {
        if self.home == entrant {
            Some(Side::Home)
        } else if self.away == entrant {
            Some(Side::Away)
        } else {
            None
        }
    }

    pub fn involves(&self, entrant: EntrantId) -> bool {
        self.side_of(entrant).is_some()
    }

    /// True when both pairings hold the same two entrants, in either order.
    pub fn same_matchup(&self, other: &Pairing) -> bool {
        (self.home == other.home && self.away == other.away)
            || (self.home == other.away && self.away == other.home)
    }
}

/// How a game came to an end.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    Played,
    Forfeit,
    Abandoned,
}

/// Final outcome of a game.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameResult {
    pub winner: Side,
    pub home_score: u32,
    pub away_score: u32,
    pub resolution: Resolution,
}

impl GameResult {
    pub fn played(winner: Side, home_score: u32, away_score: u32) -> Self {
        Self {
            winner,
            home_score,
            away_score,
            resolution: Resolution::Played,
        }
    }

    pub fn forfeit(winner: Side) -> Self {
        Self {
            winner,
            home_score: 0,
            away_score: 0,
            resolution: Resolution::Forfeit,
        }
    }

    pub fn score(&self, side: Side) -> u32 {
        match side {
            Side::Home => self.home_score,
            Side::Away => self.away_score,
        }
    }

    /// A played game must be won by the side holding the higher score.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.resolution == Resolution::Played
            && self.score(self.winner) <= self.score(self.winner.other())
        {
            return Err(EngineError::InvalidState(format!(
                "winner {:?} does not hold the higher score ({}-{})",
                self.winner, self.home_score, self.away_score
            )));
        }
        Ok(())
    }
}

/// A fixture the engine asks the store to create.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct NewFixture {
    pub round: u32,
    pub pairing: Pairing,
    pub is_final: bool,
    pub ranked: bool,
}

/// A game as persisted by the store.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: GameId,
    pub tournament_id: TournamentId,
    pub round: u32,
    pub pairing: Pairing,
    pub is_final: bool,
    pub ranked: bool,
    /// None until the game has been resolved.
    pub result: Option<GameResult>,
}

impl GameRecord {
    pub fn is_resolved(&self) -> bool {
        self.result.is_some()
    }

    pub fn winner(&self) -> Option<EntrantId> {
        self.result.map(|r| self.pairing.get(r.winner))
    }

    pub fn loser(&self) -> Option<EntrantId> {
        self.result.map(|r| self.pairing.get(r.winner.other()))
    }
}

/// A round slot where an entrant drew the bye. Never played, never rated.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ByeRecord {
    pub tournament_id: TournamentId,
    pub round: u32,
    pub entrant: EntrantId,
}

//! Tournament, its format, finals strategy and pool assignment.

use crate::models::entrant::{Entrant, EntrantId, PlayerId};
use crate::models::error::EngineError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// How the regular season is organised.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    /// Two rating-balanced pools, each a round-robin.
    #[default]
    Pooled,
    /// The whole field plays one round-robin ladder.
    RoundRobin,
    /// One ladder, paired top-down each round without rematches, for `ceil(log2 n)` rounds.
    Swiss,
}

/// How the finals bracket is seeded.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalsStrategy {
    /// Pool-one #1 vs pool-two #2, pool-two #1 vs pool-one #2.
    #[default]
    PooledFinals,
    /// Overall ladder #1 vs #4, #2 vs #3.
    BasicFinals,
    /// Overall ladder #2 vs #3, then #1 vs that winner.
    TopThreeFinals,
}

impl FinalsStrategy {
    /// Fewest entrants the finals can be seeded from.
    pub fn min_entrants(self) -> usize {
        match self {
            FinalsStrategy::PooledFinals | FinalsStrategy::BasicFinals => 4,
            FinalsStrategy::TopThreeFinals => 3,
        }
    }
}

/// One of the two pools of a pooled tournament.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pool {
    One,
    Two,
}

impl Pool {
    pub const ALL: [Pool; 2] = [Pool::One, Pool::Two];

    /// 1 or 2.
    pub fn number(self) -> u8 {
        match self {
            Pool::One => 1,
            Pool::Two => 2,
        }
    }
}

/// Entrant → pool mapping, kept in seeding order (strongest first).
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct PoolAssignment {
    pub slots: Vec<(EntrantId, Pool)>,
}

impl PoolAssignment {
    /// Members of one pool, in seeding order.
    pub fn members(&self, pool: Pool) -> Vec<EntrantId> {
        self.slots
            .iter()
            .filter(|(_, p)| *p == pool)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn pool_of(&self, entrant: EntrantId) -> Option<Pool> {
        self.slots
            .iter()
            .find(|(id, _)| *id == entrant)
            .map(|(_, p)| *p)
    }
}

/// A tournament: its field, format and lifecycle flags. Games live in the store.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub format: Format,
    pub finals: FinalsStrategy,
    pub entrants: Vec<Entrant>,
    /// Set once by seeding; None for `Format::RoundRobin`.
    pub pools: Option<PoolAssignment>,
    pub started: bool,
    pub finished: bool,
}

impl Tournament {
    pub fn new(name: impl Into<String>, format: Format, finals: FinalsStrategy) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            format,
            finals,
            entrants: Vec::new(),
            pools: None,
            started: false,
            finished: false,
        }
    }

    /// Create a tournament with an initial field. Still unstarted.
    pub fn with_entrants(
        name: impl Into<String>,
        format: Format,
        finals: FinalsStrategy,
        entrants: Vec<Entrant>,
    ) -> Self {
        Self {
            entrants,
            ..Self::new(name, format, finals)
        }
    }

    pub fn entrant(&self, id: EntrantId) -> Option<&Entrant> {
        self.entrants.iter().find(|e| e.id == id)
    }

    /// Add an entrant before the tournament starts. Names are unique (case-insensitive).
    pub fn add_entrant(
        &mut self,
        name: impl Into<String>,
        players: Vec<PlayerId>,
    ) -> Result<EntrantId, EngineError> {
        if self.started {
            return Err(EngineError::InvalidState(
                "entrants cannot be added after the tournament has started".into(),
            ));
        }
        let name = name.into();
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::InvalidState("entrant name is empty".into()));
        }
        if self.entrants.iter().any(|e| e.name.eq_ignore_ascii_case(name)) {
            return Err(EngineError::InvalidState(format!(
                "an entrant named {name:?} already exists"
            )));
        }
        let entrant = if players.is_empty() {
            Entrant::solo(name)
        } else {
            Entrant::new(name, players)
        };
        check_roster(&self.entrants, &entrant)?;
        let id = entrant.id;
        self.entrants.push(entrant);
        Ok(id)
    }

    /// Remove an entrant (only before the tournament starts).
    pub fn remove_entrant(&mut self, id: EntrantId) -> Result<(), EngineError> {
        if self.started {
            return Err(EngineError::InvalidState(
                "entrants cannot be removed after the tournament has started".into(),
            ));
        }
        let idx = self
            .entrants
            .iter()
            .position(|e| e.id == id)
            .ok_or(EngineError::EntrantNotFound(id))?;
        self.entrants.remove(idx);
        Ok(())
    }

    /// Every player belongs to at most one entrant, and at most once.
    pub fn validate_rosters(&self) -> Result<(), EngineError> {
        for (i, entrant) in self.entrants.iter().enumerate() {
            check_roster(&self.entrants[..i], entrant)?;
        }
        Ok(())
    }

    /// Entrant ids of each regular-season group: two pools, or one ladder.
    pub fn groups(&self) -> Vec<(Option<Pool>, Vec<EntrantId>)> {
        match (&self.format, &self.pools) {
            (Format::Pooled, Some(pools)) => Pool::ALL
                .iter()
                .map(|&p| (Some(p), pools.members(p)))
                .collect(),
            _ => vec![(None, self.entrants.iter().map(|e| e.id).collect())],
        }
    }
}

/// Reject a roster that repeats a player or shares one with `others`.
fn check_roster(others: &[Entrant], entrant: &Entrant) -> Result<(), EngineError> {
    let mut seen = HashSet::with_capacity(entrant.players.len());
    if let Some(dup) = entrant.players.iter().find(|p| !seen.insert(**p)) {
        return Err(EngineError::InvalidState(format!(
            "player {dup} is listed twice for {}",
            entrant.name
        )));
    }
    for other in others {
        if let Some(shared) = other.players.iter().find(|p| seen.contains(*p)) {
            return Err(EngineError::InvalidState(format!(
                "player {shared} already plays for {}",
                other.name
            )));
        }
    }
    Ok(())
}

//! Entrant (a team or a solo competitor) and its player roster.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an entrant (used in fixtures, pools and standings).
pub type EntrantId = Uuid;

/// Unique identifier for a player (rating events are written per player).
pub type PlayerId = Uuid;

/// A competitor in a tournament. Its rating is never stored here; it is always
/// derived from the rating ledger.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Entrant {
    pub id: EntrantId,
    pub name: String,
    /// Players whose ledger history makes up this entrant's rating.
    pub players: Vec<PlayerId>,
}

impl Entrant {
    /// Create a team entrant with the given roster.
    pub fn new(name: impl Into<String>, players: Vec<PlayerId>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            players,
        }
    }

    /// Create a one-player entrant whose only player id is the entrant id itself.
    pub fn solo(name: impl Into<String>) -> Self {
        let id = Uuid::new_v4();
        Self {
            id,
            name: name.into(),
            players: vec![id],
        }
    }
}

/// One slot of a pool's rotation: a real entrant or the synthetic bye.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Seat {
    Entrant(EntrantId),
    Bye,
}

//! Finals bracket: semifinals, then bronze and gold, then the podium.
//!
//! The bracket state is never stored. It is derived from the tournament's
//! final-flagged games every time, so it cannot drift from the game records.

use crate::logic::ladder::Standing;
use crate::models::{EngineError, EntrantId, GameRecord, Pairing};
use serde::Serialize;

/// Number of games in each bracket stage.
const STAGE_GAMES: usize = 2;

/// Stage of the finals, derived from the final games.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketState {
    NotStarted,
    SemifinalsScheduled,
    MedalGamesScheduled,
    Complete,
}

/// Top three of a finished tournament.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct Podium {
    pub champion: EntrantId,
    pub runner_up: EntrantId,
    pub third: EntrantId,
}

/// What one bracket advance produced.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketStep {
    /// New final games to create, all in `round`. `state` is the stage they open.
    Schedule {
        state: BracketState,
        round: u32,
        pairings: Vec<Pairing>,
    },
    Complete(Podium),
}

/// Derive the bracket state from the final games of one tournament.
pub fn bracket_state(final_games: &[GameRecord]) -> Result<BracketState, EngineError> {
    match final_games.len() {
        0 => Ok(BracketState::NotStarted),
        STAGE_GAMES => Ok(BracketState::SemifinalsScheduled),
        n if n == 2 * STAGE_GAMES => {
            if final_games.iter().all(GameRecord::is_resolved) {
                Ok(BracketState::Complete)
            } else {
                Ok(BracketState::MedalGamesScheduled)
            }
        }
        1 => Err(EngineError::BracketMismatch { final_games: 1 }),
        n => Err(EngineError::DuplicateFixture(format!(
            "{n} final games exist; a stage holds exactly {STAGE_GAMES}"
        ))),
    }
}

/// Cross-pool semifinals: pool-one #1 vs pool-two #2, pool-two #1 vs pool-one #2.
pub fn pooled_semifinals(
    pool_one: &[Standing],
    pool_two: &[Standing],
) -> Result<[Pairing; 2], EngineError> {
    let (a1, a2) = top_two(pool_one, "pool 1")?;
    let (b1, b2) = top_two(pool_two, "pool 2")?;
    Ok([Pairing::new(a1, b2), Pairing::new(b1, a2)])
}

/// Single-ladder semifinals: #1 vs #4, #2 vs #3.
pub fn ladder_semifinals(ladder: &[Standing]) -> Result<[Pairing; 2], EngineError> {
    match ladder {
        [first, second, third, fourth, ..] => Ok([
            Pairing::new(first.entrant, fourth.entrant),
            Pairing::new(second.entrant, third.entrant),
        ]),
        _ => Err(EngineError::InvalidPoolState(format!(
            "finals need 4 ranked entrants, ladder has {}",
            ladder.len()
        ))),
    }
}

/// First three entrants of the overall ladder.
pub fn top_three(ladder: &[Standing]) -> Result<[EntrantId; 3], EngineError> {
    match ladder {
        [first, second, third, ..] => Ok([first.entrant, second.entrant, third.entrant]),
        _ => Err(EngineError::InvalidPoolState(format!(
            "top-three finals need 3 ranked entrants, ladder has {}",
            ladder.len()
        ))),
    }
}

fn top_two(standings: &[Standing], label: &str) -> Result<(EntrantId, EntrantId), EngineError> {
    match standings {
        [first, second, ..] => Ok((first.entrant, second.entrant)),
        _ => Err(EngineError::InvalidPoolState(format!(
            "{label} needs 2 ranked entrants for the finals, has {}",
            standings.len()
        ))),
    }
}

/// Advance the bracket one stage.
///
/// `latest_round` is the tournament's highest round so far; semifinals go in the
/// round after it. `semifinals` is only called when the bracket has not started.
/// Once complete, advancing again just reports the podium.
pub fn advance<F>(
    final_games: &[GameRecord],
    latest_round: u32,
    semifinals: F,
) -> Result<BracketStep, EngineError>
where
    F: FnOnce() -> Result<[Pairing; 2], EngineError>,
{
    let mut games: Vec<&GameRecord> = final_games.iter().collect();
    games.sort_by_key(|g| g.id);

    match bracket_state(final_games)? {
        BracketState::NotStarted => Ok(BracketStep::Schedule {
            state: BracketState::SemifinalsScheduled,
            round: latest_round + 1,
            pairings: semifinals()?.to_vec(),
        }),
        BracketState::SemifinalsScheduled => {
            ensure_resolved(&games)?;
            let (g1, g2) = (games[0], games[1]);
            let round = g1.round.max(g2.round) + 1;
            let bronze = Pairing::new(loser(g1)?, loser(g2)?);
            let gold = Pairing::new(winner(g1)?, winner(g2)?);
            Ok(BracketStep::Schedule {
                state: BracketState::MedalGamesScheduled,
                round,
                pairings: vec![bronze, gold],
            })
        }
        BracketState::MedalGamesScheduled => {
            ensure_resolved(&games)?;
            // All resolved means the state would have derived as Complete.
            Err(EngineError::BracketMismatch {
                final_games: games.len(),
            })
        }
        BracketState::Complete => podium(final_games).map(BracketStep::Complete),
    }
}

/// Derive the podium from a complete bracket.
///
/// The gold game is the medal game between the two semifinal winners (falling
/// back to the most recent final game). If the other medal game's winner also
/// played in the gold game, third place goes to that game's loser instead.
pub fn podium(final_games: &[GameRecord]) -> Result<Podium, EngineError> {
    let state = bracket_state(final_games)?;
    if state != BracketState::Complete {
        ensure_resolved(&final_games.iter().collect::<Vec<_>>())?;
        return Err(EngineError::InvalidState(format!(
            "no podium while the bracket is {state:?}"
        )));
    }
    let mut games: Vec<&GameRecord> = final_games.iter().collect();
    // Most recent first: highest round, then highest id.
    games.sort_by(|a, b| b.round.cmp(&a.round).then(b.id.cmp(&a.id)));
    let (medal, semis) = games.split_at(STAGE_GAMES);
    let semi_winners = [winner(semis[0])?, winner(semis[1])?];

    let is_gold = |g: &GameRecord| {
        semi_winners.contains(&g.pairing.home) && semi_winners.contains(&g.pairing.away)
    };
    let (gold, bronze) = if !is_gold(medal[0]) && is_gold(medal[1]) {
        (medal[1], medal[0])
    } else {
        (medal[0], medal[1])
    };

    let champion = winner(gold)?;
    let runner_up = loser(gold)?;
    let bronze_winner = winner(bronze)?;
    let third = if gold.pairing.involves(bronze_winner) {
        log::warn!(
            "Bronze game {} winner also played the gold game {}; awarding third to its loser",
            bronze.id,
            gold.id
        );
        loser(bronze)?
    } else {
        bronze_winner
    };
    Ok(Podium {
        champion,
        runner_up,
        third,
    })
}

/// Stage of a top-three finals series, derived from its final games: none is
/// `NotStarted`, the #2 v #3 qualifier alone is `SemifinalsScheduled`, and the
/// grand final against #1 is `MedalGamesScheduled` until resolved, then `Complete`.
pub fn top_three_state(final_games: &[GameRecord]) -> Result<BracketState, EngineError> {
    match final_games.len() {
        0 => Ok(BracketState::NotStarted),
        1 => Ok(BracketState::SemifinalsScheduled),
        2 if final_games.iter().all(GameRecord::is_resolved) => Ok(BracketState::Complete),
        2 => Ok(BracketState::MedalGamesScheduled),
        n => Err(EngineError::DuplicateFixture(format!(
            "{n} final games exist; a top-three series holds at most 2"
        ))),
    }
}

/// Advance a top-three finals series one stage: ladder #2 v #3, then #1 v that winner.
///
/// `top_three` yields the ladder's first three entrants and is only called
/// when a game has to be scheduled.
pub fn advance_top_three<F>(
    final_games: &[GameRecord],
    latest_round: u32,
    top_three: F,
) -> Result<BracketStep, EngineError>
where
    F: FnOnce() -> Result<[EntrantId; 3], EngineError>,
{
    let mut games: Vec<&GameRecord> = final_games.iter().collect();
    games.sort_by_key(|g| g.id);

    match top_three_state(final_games)? {
        BracketState::NotStarted => {
            let [_, second, third] = top_three()?;
            Ok(BracketStep::Schedule {
                state: BracketState::SemifinalsScheduled,
                round: latest_round + 1,
                pairings: vec![Pairing::new(second, third)],
            })
        }
        BracketState::SemifinalsScheduled => {
            ensure_resolved(&games)?;
            let qualifier = games[0];
            let [first, _, _] = top_three()?;
            Ok(BracketStep::Schedule {
                state: BracketState::MedalGamesScheduled,
                round: qualifier.round + 1,
                pairings: vec![Pairing::new(first, winner(qualifier)?)],
            })
        }
        BracketState::MedalGamesScheduled => {
            ensure_resolved(&games)?;
            Err(EngineError::BracketMismatch {
                final_games: games.len(),
            })
        }
        BracketState::Complete => top_three_podium(final_games).map(BracketStep::Complete),
    }
}

/// Podium of a complete top-three series: the grand final decides first and
/// second, the qualifier's loser is third.
pub fn top_three_podium(final_games: &[GameRecord]) -> Result<Podium, EngineError> {
    let state = top_three_state(final_games)?;
    if state != BracketState::Complete {
        ensure_resolved(&final_games.iter().collect::<Vec<_>>())?;
        return Err(EngineError::InvalidState(format!(
            "no podium while the finals are {state:?}"
        )));
    }
    let mut games: Vec<&GameRecord> = final_games.iter().collect();
    games.sort_by_key(|g| g.id);
    let (qualifier, grand_final) = (games[0], games[1]);
    Ok(Podium {
        champion: winner(grand_final)?,
        runner_up: loser(grand_final)?,
        third: loser(qualifier)?,
    })
}

fn ensure_resolved(games: &[&GameRecord]) -> Result<(), EngineError> {
    let pending: Vec<&&GameRecord> = games.iter().filter(|g| !g.is_resolved()).collect();
    match pending.first() {
        None => Ok(()),
        Some(first) => Err(EngineError::IncompleteRound {
            round: first.round,
            unresolved: pending.len(),
        }),
    }
}

fn winner(game: &GameRecord) -> Result<EntrantId, EngineError> {
    game.winner().ok_or(EngineError::IncompleteRound {
        round: game.round,
        unresolved: 1,
    })
}

fn loser(game: &GameRecord) -> Result<EntrantId, EngineError> {
    game.loser().ok_or(EngineError::IncompleteRound {
        round: game.round,
        unresolved: 1,
    })
}

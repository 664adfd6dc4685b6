//! Tournament progression: begin, then advance round by round into the finals.
//!
//! Callers must serialise `advance_round` per tournament. Two concurrent
//! advances could both see a finished round and schedule the next one twice.

use crate::config::EngineConfig;
use crate::logic::bracket::{self, BracketState, BracketStep, Podium};
use crate::logic::ladder::{self, Standing};
use crate::logic::rating::{self, RatingLedger};
use crate::logic::round_robin::{self, PoolRound};
use crate::logic::seeding;
use crate::logic::swiss;
use crate::models::{
    EngineError, Entrant, EntrantId, FinalsStrategy, Format, GameId, GameRecord, NewFixture,
    Pairing, Pool, Tournament, TournamentId,
};
use crate::store::TournamentStore;
use serde::Serialize;

/// What one begin/advance call did.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Advance {
    /// A regular-season round was scheduled.
    PoolRound {
        round: u32,
        games: Vec<GameId>,
        byes: Vec<EntrantId>,
    },
    /// A finals stage was scheduled.
    Bracket {
        state: BracketState,
        round: u32,
        games: Vec<GameId>,
    },
    /// The tournament is over.
    Complete(Podium),
}

/// Seed pools (pooled format), mark the tournament started and schedule round 1.
pub fn begin_tournament<S: TournamentStore>(
    store: &mut S,
    id: TournamentId,
) -> Result<Advance, EngineError> {
    let mut tournament = store.tournament(id)?;
    if tournament.started {
        return Err(EngineError::InvalidState(
            "tournament has already started".into(),
        ));
    }
    if tournament.finals == FinalsStrategy::PooledFinals && tournament.format != Format::Pooled {
        return Err(EngineError::InvalidState(
            "pooled finals need a pooled format".into(),
        ));
    }
    let needed = tournament.finals.min_entrants();
    if tournament.entrants.len() < needed {
        return Err(EngineError::InvalidPoolState(format!(
            "need at least {} entrants for the finals, got {}",
            needed,
            tournament.entrants.len()
        )));
    }
    tournament.validate_rosters()?;

    let ledger = store.rating_ledger();
    if tournament.format == Format::Pooled {
        tournament.pools = Some(seeding::assign_pools(&tournament.entrants, &ledger)?);
    }
    let plan = plan_pool_round(&tournament, &[], &ledger, 0)?;
    tournament.started = true;
    store.save_tournament(tournament.clone())?;
    log::info!(
        "Tournament {} ({}) started with {} entrants",
        tournament.name,
        id,
        tournament.entrants.len()
    );
    schedule_pool_round(store, &tournament, &[], plan)
}

/// Advance a started tournament once every game so far has been resolved.
///
/// Applies pending rating updates first, then schedules the next pool round,
/// or the next finals stage once every pool is exhausted. After the podium is
/// decided this is a no-op that reports it again.
pub fn advance_round<S: TournamentStore>(
    store: &mut S,
    config: &EngineConfig,
    id: TournamentId,
) -> Result<Advance, EngineError> {
    let mut tournament = store.tournament(id)?;
    if !tournament.started {
        return Err(EngineError::InvalidState(
            "tournament has not started".into(),
        ));
    }
    let games = store.games_of(id);
    let final_games: Vec<GameRecord> = games.iter().filter(|g| g.is_final).cloned().collect();
    if tournament.finished {
        return finals_podium(&tournament, &final_games).map(Advance::Complete);
    }

    let unresolved = games.iter().filter(|g| !g.is_resolved()).count();
    if unresolved > 0 {
        return Err(EngineError::IncompleteRound {
            round: store.latest_round_of(id),
            unresolved,
        });
    }

    apply_rating_updates(store, &tournament, &games)?;

    let latest_round = store.latest_round_of(id);
    if final_games.is_empty() {
        let ledger = store.rating_ledger();
        let plan = plan_pool_round(&tournament, &games, &ledger, latest_round)?;
        if plan.iter().any(|(_, r)| !r.exhausted) {
            return schedule_pool_round(store, &tournament, &games, plan);
        }
        log::info!(
            "Tournament {}: pools exhausted after {} round(s), moving to finals",
            id,
            latest_round
        );
    }

    let step = finals_step(&*store, &tournament, &final_games, latest_round)?;
    match step {
        BracketStep::Schedule {
            state,
            round,
            pairings,
        } => {
            let mut created = Vec::with_capacity(pairings.len());
            for pairing in pairings {
                created.push(store.create_fixture(
                    id,
                    NewFixture {
                        round,
                        pairing,
                        is_final: true,
                        ranked: config.rank_finals,
                    },
                )?);
            }
            log::info!("Tournament {}: {:?} in round {}", id, state, round);
            Ok(Advance::Bracket {
                state,
                round,
                games: created,
            })
        }
        BracketStep::Complete(podium) => {
            tournament.finished = true;
            store.save_tournament(tournament)?;
            log::info!("Tournament {} complete: champion {}", id, podium.champion);
            Ok(Advance::Complete(podium))
        }
    }
}

/// Append rating events for every resolved, rated game that has none yet, in game order.
pub fn apply_rating_updates<S: TournamentStore>(
    store: &mut S,
    tournament: &Tournament,
    games: &[GameRecord],
) -> Result<usize, EngineError> {
    let mut ledger = store.rating_ledger();
    let mut pending: Vec<&GameRecord> = games
        .iter()
        .filter(|g| rating::is_rated(g, ledger.config()) && !ledger.has_events_for(g.id))
        .collect();
    pending.sort_by_key(|g| g.id);

    for game in &pending {
        let home = entrant(tournament, game.pairing.home)?;
        let away = entrant(tournament, game.pairing.away)?;
        let events = ledger.outcome_events(game, home, away)?;
        store.append_rating_events(events.clone())?;
        ledger.append(events)?;
    }
    if !pending.is_empty() {
        log::info!(
            "Tournament {}: applied ratings for {} game(s)",
            tournament.id,
            pending.len()
        );
    }
    Ok(pending.len())
}

/// Standings of one pool, or of the whole field when `pool` is None.
pub fn tournament_standings<S: TournamentStore>(
    store: &S,
    id: TournamentId,
    pool: Option<Pool>,
) -> Result<Vec<Standing>, EngineError> {
    let tournament = store.tournament(id)?;
    let ledger = store.rating_ledger();
    let games = store.games_of(id);
    Ok(group_standings(&tournament, pool, &games, &ledger))
}

/// Podium of a tournament whose finals are complete.
pub fn podium_of<S: TournamentStore>(store: &S, id: TournamentId) -> Result<Podium, EngineError> {
    let tournament = store.tournament(id)?;
    finals_podium(&tournament, &store.final_games_of(id))
}

fn finals_podium(tournament: &Tournament, final_games: &[GameRecord]) -> Result<Podium, EngineError> {
    match tournament.finals {
        FinalsStrategy::TopThreeFinals => bracket::top_three_podium(final_games),
        FinalsStrategy::PooledFinals | FinalsStrategy::BasicFinals => bracket::podium(final_games),
    }
}

/// One finals step for the tournament's finals strategy.
fn finals_step<S: TournamentStore>(
    store: &S,
    tournament: &Tournament,
    final_games: &[GameRecord],
    latest_round: u32,
) -> Result<BracketStep, EngineError> {
    match tournament.finals {
        FinalsStrategy::TopThreeFinals => {
            bracket::advance_top_three(final_games, latest_round, || {
                bracket::top_three(&overall_standings(store, tournament))
            })
        }
        FinalsStrategy::PooledFinals | FinalsStrategy::BasicFinals => {
            bracket::advance(final_games, latest_round, || {
                semifinal_pairings(store, tournament)
            })
        }
    }
}

fn overall_standings<S: TournamentStore>(store: &S, tournament: &Tournament) -> Vec<Standing> {
    let games = store.games_of(tournament.id);
    let ledger = store.rating_ledger();
    group_standings(tournament, None, &games, &ledger)
}

fn group_standings(
    tournament: &Tournament,
    pool: Option<Pool>,
    games: &[GameRecord],
    ledger: &RatingLedger,
) -> Vec<Standing> {
    let members: Vec<Entrant> = match (pool, &tournament.pools) {
        (Some(p), Some(pools)) => pools
            .members(p)
            .into_iter()
            .filter_map(|id| tournament.entrant(id).cloned())
            .collect(),
        (Some(_), None) => Vec::new(),
        (None, _) => tournament.entrants.clone(),
    };
    ladder::standings(&members, games, ledger)
}

fn semifinal_pairings<S: TournamentStore>(
    store: &S,
    tournament: &Tournament,
) -> Result<[Pairing; 2], EngineError> {
    if tournament.finals != FinalsStrategy::PooledFinals {
        return bracket::ladder_semifinals(&overall_standings(store, tournament));
    }
    let games = store.games_of(tournament.id);
    let ledger = store.rating_ledger();
    let one = group_standings(tournament, Some(Pool::One), &games, &ledger);
    let two = group_standings(tournament, Some(Pool::Two), &games, &ledger);
    bracket::pooled_semifinals(&one, &two)
}

/// Next round of every regular-season group.
fn plan_pool_round(
    tournament: &Tournament,
    games: &[GameRecord],
    ledger: &RatingLedger,
    rounds_played: u32,
) -> Result<Vec<(Option<Pool>, PoolRound)>, EngineError> {
    if tournament.format == Format::Swiss {
        let ladder: Vec<EntrantId> = group_standings(tournament, None, games, ledger)
            .into_iter()
            .map(|s| s.entrant)
            .collect();
        let season: Vec<&GameRecord> = games.iter().filter(|g| !g.is_final).collect();
        let round = swiss::pair_round(&ladder, rounds_played, |a, b| {
            let pairing = Pairing::new(a, b);
            season.iter().any(|g| g.pairing.same_matchup(&pairing))
        })?;
        return Ok(vec![(None, round)]);
    }
    if tournament.format == Format::Pooled && tournament.pools.is_none() {
        return Err(EngineError::InvalidPoolState(
            "pooled tournament has no pool assignment".into(),
        ));
    }
    tournament
        .groups()
        .into_iter()
        .map(|(pool, members)| {
            round_robin::generate_round(&members, rounds_played).map(|round| (pool, round))
        })
        .collect()
}

fn schedule_pool_round<S: TournamentStore>(
    store: &mut S,
    tournament: &Tournament,
    previous: &[GameRecord],
    plan: Vec<(Option<Pool>, PoolRound)>,
) -> Result<Advance, EngineError> {
    // Swiss pairing falls back to a rematch once every other opponent is used up.
    let season: Vec<&GameRecord> = match tournament.format {
        Format::Swiss => Vec::new(),
        Format::Pooled | Format::RoundRobin => {
            previous.iter().filter(|g| !g.is_final).collect()
        }
    };
    for (_, round) in &plan {
        for pairing in &round.pairings {
            if let Some(game) = season.iter().find(|g| g.pairing.same_matchup(pairing)) {
                return Err(EngineError::DuplicateFixture(format!(
                    "{} vs {} already met in round {} (game {})",
                    pairing.home, pairing.away, game.round, game.id
                )));
            }
        }
    }

    let round = plan.first().map_or(1, |(_, r)| r.round);
    let mut games = Vec::new();
    let mut byes = Vec::new();
    for (pool, pool_round) in plan.into_iter().filter(|(_, r)| !r.exhausted) {
        for pairing in pool_round.pairings {
            games.push(store.create_fixture(
                tournament.id,
                NewFixture {
                    round,
                    pairing,
                    is_final: false,
                    ranked: true,
                },
            )?);
        }
        for entrant in pool_round.byes {
            store.record_bye(tournament.id, round, entrant)?;
            byes.push(entrant);
        }
        if let Some(p) = pool {
            log::debug!(
                "Tournament {}: pool {} scheduled for round {}",
                tournament.id,
                p.number(),
                round
            );
        }
    }
    log::info!(
        "Tournament {}: round {} scheduled ({} game(s), {} bye(s))",
        tournament.id,
        round,
        games.len(),
        byes.len()
    );
    Ok(Advance::PoolRound { round, games, byes })
}

fn entrant(tournament: &Tournament, id: EntrantId) -> Result<&Entrant, EngineError> {
    tournament.entrant(id).ok_or(EngineError::EntrantNotFound(id))
}

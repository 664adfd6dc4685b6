//! Single binary web server: drives the progression engine over an in-memory store.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT.
//! Rating constants come from the JSON file named by ENGINE_CONFIG, if set.

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path, Query},
    App, HttpResponse, HttpServer, Responder,
};
use pool_finals_engine::{
    advance_round, begin_tournament, podium_of, tournament_standings, EngineConfig, EngineError,
    EntrantId, FinalsStrategy, Format, GameId, GameResult, InMemoryStore, PlayerId, Pool,
    Resolution, Side, Tournament, TournamentId, TournamentStore,
};
use serde::Deserialize;
use std::sync::RwLock;

/// Store plus the config every advance runs with.
struct AppState {
    store: InMemoryStore,
    config: EngineConfig,
}

/// One lock for the whole store, so advances never run concurrently.
type SharedState = Data<RwLock<AppState>>;

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    name: String,
    #[serde(default)]
    format: Format,
    #[serde(default)]
    finals: FinalsStrategy,
}

#[derive(Deserialize)]
struct AddEntrantBody {
    name: String,
    #[serde(default)]
    players: Vec<PlayerId>,
}

#[derive(Deserialize)]
struct GameResultBody {
    winner: Side,
    #[serde(default)]
    home_score: u32,
    #[serde(default)]
    away_score: u32,
    #[serde(default = "default_resolution")]
    resolution: Resolution,
}

fn default_resolution() -> Resolution {
    Resolution::Played
}

#[derive(Deserialize)]
struct StandingsQuery {
    /// 1 or 2; omitted for the whole field.
    pool: Option<u8>,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

#[derive(Deserialize)]
struct TournamentEntrantPath {
    id: TournamentId,
    entrant_id: EntrantId,
}

#[derive(Deserialize)]
struct TournamentGamePath {
    id: TournamentId,
    game_id: GameId,
}

#[derive(Deserialize)]
struct PlayerPath {
    player_id: PlayerId,
}

fn lock_error() -> HttpResponse {
    HttpResponse::InternalServerError().body("lock error")
}

/// Map an engine error onto a status code. Orchestration bugs are logged for an operator.
fn engine_error(e: EngineError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string(), "retryable": e.is_retryable() });
    match e {
        EngineError::TournamentNotFound(_)
        | EngineError::EntrantNotFound(_)
        | EngineError::GameNotFound(_) => HttpResponse::NotFound().json(body),
        EngineError::IncompleteRound { .. } => HttpResponse::Conflict().json(body),
        EngineError::InvalidState(_) => HttpResponse::BadRequest().json(body),
        EngineError::InvalidPoolState(_)
        | EngineError::DuplicateFixture(_)
        | EngineError::RatingLedgerConsistency { .. }
        | EngineError::BracketMismatch { .. } => {
            log::error!("Engine error needs operator attention: {}", e);
            HttpResponse::InternalServerError().json(body)
        }
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "pool-finals-engine",
    })
}

#[post("/api/tournaments")]
async fn api_create_tournament(state: SharedState, body: Json<CreateTournamentBody>) -> HttpResponse {
    let tournament = Tournament::new(body.name.trim(), body.format, body.finals);
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let id = g.store.insert_tournament(tournament);
    log::info!("Created tournament {}", id);
    match g.store.tournament(id) {
        Ok(t) => HttpResponse::Ok().json(t),
        Err(e) => engine_error(e),
    }
}

#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: SharedState, path: Path<TournamentPath>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.store.tournament(path.id) {
        Ok(t) => HttpResponse::Ok().json(t),
        Err(e) => engine_error(e),
    }
}

/// Add an entrant (tournament must not have started).
#[post("/api/tournaments/{id}/entrants")]
async fn api_add_entrant(
    state: SharedState,
    path: Path<TournamentPath>,
    body: Json<AddEntrantBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let t = match g.store.tournament_mut(path.id) {
        Ok(t) => t,
        Err(e) => return engine_error(e),
    };
    match t.add_entrant(body.name.as_str(), body.players.clone()) {
        Ok(_) => HttpResponse::Ok().json(&*t),
        Err(e) => engine_error(e),
    }
}

#[delete("/api/tournaments/{id}/entrants/{entrant_id}")]
async fn api_remove_entrant(state: SharedState, path: Path<TournamentEntrantPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let t = match g.store.tournament_mut(path.id) {
        Ok(t) => t,
        Err(e) => return engine_error(e),
    };
    match t.remove_entrant(path.entrant_id) {
        Ok(()) => HttpResponse::Ok().json(&*t),
        Err(e) => engine_error(e),
    }
}

/// Seed pools and schedule round 1.
#[post("/api/tournaments/{id}/begin")]
async fn api_begin(state: SharedState, path: Path<TournamentPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match begin_tournament(&mut g.store, path.id) {
        Ok(advance) => HttpResponse::Ok().json(advance),
        Err(e) => engine_error(e),
    }
}

#[get("/api/tournaments/{id}/games")]
async fn api_games(state: SharedState, path: Path<TournamentPath>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    if let Err(e) = g.store.tournament(path.id) {
        return engine_error(e);
    }
    HttpResponse::Ok().json(serde_json::json!({
        "games": g.store.games_of(path.id),
        "byes": g.store.byes_of(path.id),
    }))
}

/// Record the result of one game.
#[put("/api/tournaments/{id}/games/{game_id}/result")]
async fn api_set_result(
    state: SharedState,
    path: Path<TournamentGamePath>,
    body: Json<GameResultBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.store.game(path.game_id) {
        Ok(game) if game.tournament_id == path.id => {}
        Ok(_) => return engine_error(EngineError::GameNotFound(path.game_id)),
        Err(e) => return engine_error(e),
    }
    let result = GameResult {
        winner: body.winner,
        home_score: body.home_score,
        away_score: body.away_score,
        resolution: body.resolution,
    };
    match g.store.resolve_game(path.game_id, result) {
        Ok(()) => match g.store.game(path.game_id) {
            Ok(game) => HttpResponse::Ok().json(game),
            Err(e) => engine_error(e),
        },
        Err(e) => engine_error(e),
    }
}

/// Apply ratings and schedule the next round or finals stage.
#[post("/api/tournaments/{id}/advance")]
async fn api_advance(state: SharedState, path: Path<TournamentPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let AppState { store, config } = &mut *g;
    match advance_round(store, config, path.id) {
        Ok(advance) => HttpResponse::Ok().json(advance),
        Err(e) => engine_error(e),
    }
}

#[get("/api/tournaments/{id}/standings")]
async fn api_standings(
    state: SharedState,
    path: Path<TournamentPath>,
    query: Query<StandingsQuery>,
) -> HttpResponse {
    let pool = match query.pool {
        None => None,
        Some(1) => Some(Pool::One),
        Some(2) => Some(Pool::Two),
        Some(_) => {
            return HttpResponse::BadRequest()
                .json(serde_json::json!({ "error": "pool must be 1 or 2" }))
        }
    };
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match tournament_standings(&g.store, path.id, pool) {
        Ok(rows) => HttpResponse::Ok().json(rows),
        Err(e) => engine_error(e),
    }
}

#[get("/api/tournaments/{id}/podium")]
async fn api_podium(state: SharedState, path: Path<TournamentPath>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match podium_of(&g.store, path.id) {
        Ok(podium) => HttpResponse::Ok().json(podium),
        Err(e) => engine_error(e),
    }
}

#[get("/api/players/{player_id}/rating")]
async fn api_player_rating(state: SharedState, path: Path<PlayerPath>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let rating = g.store.ledger().rating_of(path.player_id, None);
    HttpResponse::Ok().json(serde_json::json!({ "player_id": path.player_id, "rating": rating }))
}

/// Whole rating ledger as CSV.
#[get("/api/ratings.csv")]
async fn api_ratings_csv(state: SharedState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let mut buf = Vec::new();
    if let Err(e) = g.store.ledger().write_csv(&mut buf) {
        log::error!("Failed to export rating ledger: {}", e);
        return HttpResponse::InternalServerError().body("export error");
    }
    HttpResponse::Ok().content_type("text/csv; charset=utf-8").body(buf)
}

/// Administrative rebuild: replay every rated game into a fresh ledger.
#[post("/api/ratings/rebuild")]
async fn api_rebuild_ratings(state: SharedState) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let games = g.store.all_games().to_vec();
    let entrants: Vec<_> = g
        .store
        .tournaments()
        .flat_map(|t| t.entrants.iter().cloned())
        .collect();
    match g.store.ledger_mut().rebuild(&games, &entrants) {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "events": g.store.ledger().events().len() })),
        Err(e) => engine_error(e),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = EngineConfig::from_env()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(RwLock::new(AppState {
        store: InMemoryStore::new(config.rating),
        config,
    }));

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_create_tournament)
            .service(api_get_tournament)
            .service(api_add_entrant)
            .service(api_remove_entrant)
            .service(api_begin)
            .service(api_games)
            .service(api_set_result)
            .service(api_advance)
            .service(api_standings)
            .service(api_podium)
            .service(api_player_rating)
            .service(api_ratings_csv)
            .service(api_rebuild_ratings)
    })
    .bind(bind)?
    .run()
    .await
}

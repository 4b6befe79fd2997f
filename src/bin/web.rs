//! Web server exposing the scheduling engine over a JSON REST API.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT.
//! ENGINE_CONFIG points at the JSON config (court rules, scheduling constants),
//! TIMETABLE at the venue CSV used to generate slots.

use actix_web::{
    get, post, put,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use chrono::NaiveDate;
use handball_scheduler::{
    apply_variant, compute_standings, create_blank_matches, fixtures_for_edition, load_timetable,
    partition_variants, schedule_category, schedule_edition, Category, CategoryId, CourtSchedule,
    EditionId, EngineConfig, EngineError, GroupAssignmentVariant, GroupId, MatchId, MatchStore,
    MemoryStore, Team, TeamId, TeamWithAttributes,
};
use serde::Deserialize;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Shared server state: the store plus everything loaded at startup.
struct Engine {
    store: MemoryStore,
    config: EngineConfig,
    timetable: Vec<CourtSchedule>,
    /// Held for the whole of a run that writes to the slot pool.
    run_lock: Mutex<()>,
}

type AppState = Data<Engine>;

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateCategoryBody {
    edition_id: EditionId,
    code: String,
    name: String,
}

#[derive(Deserialize)]
struct AddTeamBody {
    name: String,
    #[serde(default)]
    club: Option<String>,
}

/// Draw attributes for one team; teams not listed draw with strength 0.
#[derive(Deserialize)]
struct TeamAttributesBody {
    team_id: TeamId,
    #[serde(default)]
    strength: i32,
    #[serde(default)]
    girls: bool,
}

#[derive(Deserialize)]
struct PartitionBody {
    #[serde(default)]
    teams: Vec<TeamAttributesBody>,
}

#[derive(Deserialize)]
struct GenerateSlotsBody {
    start_date: NaiveDate,
}

#[derive(Deserialize)]
struct MatchResultBody {
    home_score: u32,
    away_score: u32,
}

#[derive(Deserialize)]
struct CategoryPath {
    id: CategoryId,
}

#[derive(Deserialize)]
struct EditionPath {
    id: EditionId,
}

#[derive(Deserialize)]
struct GroupPath {
    id: GroupId,
}

#[derive(Deserialize)]
struct MatchPath {
    id: MatchId,
}

/// JSON error body; not-found errors become 404, storage failures 500.
fn error_response(e: &EngineError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    if e.is_not_found() {
        HttpResponse::NotFound().json(body)
    } else if matches!(e, EngineError::Storage(_)) {
        HttpResponse::InternalServerError().json(body)
    } else {
        HttpResponse::BadRequest().json(body)
    }
}

fn require_category(state: &Engine, id: CategoryId) -> Result<Category, EngineError> {
    state
        .store
        .load_category(id)?
        .ok_or(EngineError::CategoryNotFound(id))
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "handball-scheduler",
    })
}

/// Register a category within an edition.
#[post("/api/categories")]
async fn api_create_category(state: AppState, body: Json<CreateCategoryBody>) -> HttpResponse {
    let body = body.into_inner();
    let category = Category::new(body.edition_id, body.code.trim(), body.name.trim());
    match state.store.add_category(category.clone()) {
        Ok(()) => HttpResponse::Ok().json(category),
        Err(e) => error_response(&e),
    }
}

/// Add a team to a category.
#[post("/api/categories/{id}/teams")]
async fn api_add_team(state: AppState, path: Path<CategoryPath>, body: Json<AddTeamBody>) -> HttpResponse {
    if let Err(e) = require_category(&state, path.id) {
        return error_response(&e);
    }
    let body = body.into_inner();
    let mut team = Team::new(path.id, body.name.trim());
    if let Some(club) = body.club {
        team = team.with_club(club);
    }
    match state.store.add_team(team.clone()) {
        Ok(()) => HttpResponse::Ok().json(team),
        Err(e) => error_response(&e),
    }
}

/// Offer the 3/4/5-group draws for a category. Nothing is stored.
#[post("/api/categories/{id}/partition")]
async fn api_partition(state: AppState, path: Path<CategoryPath>, body: Json<PartitionBody>) -> HttpResponse {
    if let Err(e) = require_category(&state, path.id) {
        return error_response(&e);
    }
    let teams = match state.store.load_teams_by_category(path.id) {
        Ok(t) => t,
        Err(e) => return error_response(&e),
    };
    let attributes: HashMap<TeamId, &TeamAttributesBody> =
        body.teams.iter().map(|a| (a.team_id, a)).collect();
    let entries: Vec<TeamWithAttributes> = teams
        .into_iter()
        .map(|team| {
            let (strength, girls) = attributes
                .get(&team.id)
                .map(|a| (a.strength, a.girls))
                .unwrap_or((0, false));
            TeamWithAttributes::new(team, strength, girls)
        })
        .collect();
    HttpResponse::Ok().json(partition_variants(&entries, path.id))
}

/// Store the draw the organiser picked, replacing any earlier one.
#[post("/api/categories/{id}/groups")]
async fn api_save_groups(
    state: AppState,
    path: Path<CategoryPath>,
    body: Json<GroupAssignmentVariant>,
) -> HttpResponse {
    if let Err(e) = require_category(&state, path.id) {
        return error_response(&e);
    }
    let _run = state.run_lock.lock().await;
    match apply_variant(&state.store, path.id, &body) {
        Ok(()) => HttpResponse::Ok().json(&body.groups),
        Err(e) => error_response(&e),
    }
}

/// Create one blank match per fixture the edition needs, from the loaded timetable.
#[post("/api/editions/{id}/slots")]
async fn api_generate_slots(
    state: AppState,
    path: Path<EditionPath>,
    body: Json<GenerateSlotsBody>,
) -> HttpResponse {
    let _run = state.run_lock.lock().await;
    let required = match fixtures_for_edition(&state.store, &state.config.scheduling, path.id) {
        Ok(n) => n,
        Err(e) => return error_response(&e),
    };
    match create_blank_matches(&state.store, body.start_date, &state.timetable, required) {
        Ok(matches) => HttpResponse::Ok().json(matches),
        Err(e) => error_response(&e),
    }
}

/// Schedule one category's outstanding fixtures.
#[post("/api/categories/{id}/schedule")]
async fn api_schedule_category(state: AppState, path: Path<CategoryPath>) -> HttpResponse {
    let _run = state.run_lock.lock().await;
    match schedule_category(
        &state.store,
        &state.config.court_rules,
        &state.config.scheduling,
        path.id,
    ) {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(e) => error_response(&e),
    }
}

/// Schedule every category of an edition against the shared pool.
#[post("/api/editions/{id}/schedule")]
async fn api_schedule_edition(state: AppState, path: Path<EditionPath>) -> HttpResponse {
    let _run = state.run_lock.lock().await;
    match schedule_edition(
        &state.store,
        &state.config.court_rules,
        &state.config.scheduling,
        path.id,
    ) {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(e) => error_response(&e),
    }
}

/// Record (or correct) the final score of a match.
#[put("/api/matches/{id}/result")]
async fn api_set_result(state: AppState, path: Path<MatchPath>, body: Json<MatchResultBody>) -> HttpResponse {
    match state
        .store
        .record_result(path.id, body.home_score, body.away_score)
    {
        Ok(m) => HttpResponse::Ok().json(m),
        Err(e) => error_response(&e),
    }
}

#[get("/api/groups/{id}/standings")]
async fn api_standings(state: AppState, path: Path<GroupPath>) -> HttpResponse {
    match compute_standings(&state.store, path.id) {
        Ok(table) => HttpResponse::Ok().json(table),
        Err(e) => error_response(&e),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn invalid_input(e: EngineError) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
}

fn load_engine_config() -> Result<EngineConfig, EngineError> {
    match std::env::var("ENGINE_CONFIG") {
        Ok(path) => {
            log::info!("Loading engine config from {}", path);
            EngineConfig::from_path(path)
        }
        Err(_) => {
            log::warn!("ENGINE_CONFIG not set; using defaults with no court rules");
            Ok(EngineConfig::default())
        }
    }
}

fn load_venue(default_interval: u32) -> Result<Vec<CourtSchedule>, EngineError> {
    match std::env::var("TIMETABLE") {
        Ok(path) => {
            let rules = load_timetable(&path, default_interval)?;
            log::info!("Loaded {} timetable rules from {}", rules.len(), path);
            Ok(rules)
        }
        Err(_) => {
            log::warn!("TIMETABLE not set; slot generation will create no matches");
            Ok(Vec::new())
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = load_engine_config().map_err(invalid_input)?;
    let timetable = load_venue(config.scheduling.default_interval_minutes).map_err(invalid_input)?;

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(Engine {
        store: MemoryStore::new(),
        config,
        timetable,
        run_lock: Mutex::new(()),
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_create_category)
            .service(api_add_team)
            .service(api_partition)
            .service(api_save_groups)
            .service(api_generate_slots)
            .service(api_schedule_category)
            .service(api_schedule_edition)
            .service(api_set_result)
            .service(api_standings)
    })
    .bind(bind)?
    .run()
    .await
}

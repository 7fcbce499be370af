//! Single binary web server: JSON API over the tournament scheduler.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default; see `Config::from_env` for overrides.

use actix_web::{
    get, post, put,
    web::{self, Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use serde::Deserialize;
use std::time::Duration;
use tournament_scheduler::config::Config;
use tournament_scheduler::{
    assign_courts, build_bracket, cancel_match, cancel_tournament, generate_next_swiss_round,
    report_match_result, standings, start_match, validate_schedule, BracketOptions, Competitor, Court,
    CourtAssignmentCriteria, CourtReservation, MatchId, ScheduledMatch, TournamentError, TournamentFormat,
    TournamentId, TournamentRepository, TournamentStore,
};

/// Shared server state: tournaments plus runtime configuration.
struct AppContext {
    store: TournamentStore,
    config: Config,
}

type AppState = Data<AppContext>;

/// Commit attempts for one assignment batch before giving up on a busy tournament.
const ASSIGN_ATTEMPTS: u32 = 3;
const ASSIGN_BACKOFF: Duration = Duration::from_millis(50);

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    name: String,
    #[serde(default)]
    format: TournamentFormat,
    #[serde(default)]
    options: BracketOptions,
    competitors: Vec<Competitor>,
    #[serde(default)]
    courts: Vec<Court>,
}

#[derive(Deserialize)]
struct SetCourtsBody {
    courts: Vec<Court>,
}

#[derive(Deserialize)]
struct VersionBody {
    version: u64,
}

#[derive(Deserialize)]
struct ReportResultBody {
    score_1: u32,
    score_2: u32,
    version: u64,
}

#[derive(Deserialize)]
struct ValidateScheduleBody {
    assignments: Vec<ScheduledMatch>,
    #[serde(default)]
    reservations: Vec<CourtReservation>,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

/// Path segments: tournament id and match id (e.g. /api/tournaments/{id}/matches/{match_id})
#[derive(Deserialize)]
struct TournamentMatchPath {
    id: TournamentId,
    match_id: MatchId,
}

fn error_response(e: &TournamentError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match e {
        TournamentError::TournamentNotFound(_)
        | TournamentError::MatchNotFound(_)
        | TournamentError::CourtNotFound(_) => HttpResponse::NotFound().json(body),
        TournamentError::ConcurrentModification { .. }
        | TournamentError::StaleSnapshot { .. }
        | TournamentError::StaleBracketState { .. } => HttpResponse::Conflict().json(body),
        TournamentError::DoubleBookingConflict(conflicts) => HttpResponse::Conflict().json(serde_json::json!({
            "error": e.to_string(),
            "conflicts": conflicts,
        })),
        TournamentError::StoreUnavailable => HttpResponse::InternalServerError().json(body),
        _ => HttpResponse::BadRequest().json(body),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "tournament-scheduler",
    })
}

/// Seed competitors and build the bracket (returns the tournament with its id).
#[post("/api/tournaments")]
async fn api_create_tournament(state: AppState, body: Json<CreateTournamentBody>) -> HttpResponse {
    let body = body.into_inner();
    let mut tournament = match build_bracket(body.name, body.competitors, body.format, body.options) {
        Ok(t) => t,
        Err(e) => return error_response(&e),
    };
    tournament.courts = body.courts;
    let response = HttpResponse::Ok().json(&tournament);
    match state.store.insert(tournament) {
        Ok(()) => response,
        Err(e) => error_response(&e),
    }
}

/// Get a tournament by id (404 if not found). Touching it refreshes last activity.
#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    match state.store.load(path.id) {
        Ok(t) => HttpResponse::Ok().json(&t),
        Err(e) => error_response(&e),
    }
}

#[get("/api/tournaments/{id}/standings")]
async fn api_standings(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    match state.store.load(path.id) {
        Ok(t) => HttpResponse::Ok().json(standings(&t)),
        Err(e) => error_response(&e),
    }
}

/// Replace the tournament's courts and availability windows.
#[put("/api/tournaments/{id}/courts")]
async fn api_set_courts(state: AppState, path: Path<TournamentPath>, body: Json<SetCourtsBody>) -> HttpResponse {
    let courts = body.into_inner().courts;
    match state.store.update(path.id, |t| {
        t.set_courts(courts)?;
        Ok(t.clone())
    }) {
        Ok(t) => HttpResponse::Ok().json(&t),
        Err(e) => error_response(&e),
    }
}

/// Assign courts to every playable match. Solved on a blocking worker against a
/// snapshot; committed only if the tournament did not change meanwhile.
#[post("/api/tournaments/{id}/courts/assign")]
async fn api_assign_courts(
    state: AppState,
    path: Path<TournamentPath>,
    body: Option<Json<CourtAssignmentCriteria>>,
) -> HttpResponse {
    let criteria = body.map(Json::into_inner).unwrap_or_default();
    let settings = state.config.optimizer;
    let mut backoff = ASSIGN_BACKOFF;
    let mut attempt = 0;
    loop {
        attempt += 1;
        let snapshot = match state.store.load(path.id) {
            Ok(t) => t,
            Err(e) => return error_response(&e),
        };
        let expected = snapshot.revision;
        let job_criteria = criteria.clone();
        let job = tokio::task::spawn_blocking(move || {
            let mut planned = snapshot;
            assign_courts(&mut planned, &job_criteria, &settings).map(|outcome| (planned, outcome))
        });
        let (planned, outcome) = match job.await {
            Ok(Ok(done)) => done,
            Ok(Err(e)) => return error_response(&e),
            Err(e) => {
                log::error!("Assignment worker failed: {}", e);
                return HttpResponse::InternalServerError().json(serde_json::json!({ "error": "assignment worker failed" }));
            }
        };
        match state.store.save(planned, expected) {
            Ok(()) => return HttpResponse::Ok().json(&outcome),
            Err(TournamentError::StaleSnapshot { .. }) if attempt < ASSIGN_ATTEMPTS => {
                log::warn!(
                    "Tournament {} changed during court assignment; retrying in {:?}",
                    path.id,
                    backoff
                );
                tokio::time::sleep(backoff).await;
                backoff *= 2;
            }
            Err(e) => return error_response(&e),
        }
    }
}

/// Start signal from live scoring (scheduled -> in progress).
#[post("/api/tournaments/{id}/matches/{match_id}/start")]
async fn api_start_match(state: AppState, path: Path<TournamentMatchPath>, body: Json<VersionBody>) -> HttpResponse {
    match state.store.update(path.id, |t| start_match(t, path.match_id, body.version)) {
        Ok(m) => HttpResponse::Ok().json(&m),
        Err(e) => error_response(&e),
    }
}

/// Report a final score; returns every match updated by the advancement.
#[post("/api/tournaments/{id}/matches/{match_id}/result")]
async fn api_report_result(
    state: AppState,
    path: Path<TournamentMatchPath>,
    body: Json<ReportResultBody>,
) -> HttpResponse {
    let result = state.store.update(path.id, |t| {
        let updated = report_match_result(t, path.match_id, body.score_1, body.score_2, body.version)?;
        Ok(serde_json::json!({
            "updated": updated,
            "state": t.state,
            "champion": t.champion,
        }))
    });
    match result {
        Ok(v) => HttpResponse::Ok().json(v),
        Err(e) => error_response(&e),
    }
}

#[post("/api/tournaments/{id}/matches/{match_id}/cancel")]
async fn api_cancel_match(state: AppState, path: Path<TournamentMatchPath>) -> HttpResponse {
    match state.store.update(path.id, |t| cancel_match(t, path.match_id)) {
        Ok(m) => HttpResponse::Ok().json(&m),
        Err(e) => error_response(&e),
    }
}

/// Pair the next swiss round (previous round must be finished).
#[post("/api/tournaments/{id}/swiss/next-round")]
async fn api_next_swiss_round(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    match state.store.update(path.id, generate_next_swiss_round) {
        Ok(matches) => HttpResponse::Ok().json(&matches),
        Err(e) => error_response(&e),
    }
}

#[post("/api/tournaments/{id}/cancel")]
async fn api_cancel_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    match state.store.update(path.id, |t| {
        cancel_tournament(t)?;
        Ok(t.clone())
    }) {
        Ok(t) => HttpResponse::Ok().json(&t),
        Err(e) => error_response(&e),
    }
}

/// Check a proposed schedule for double bookings.
#[post("/api/schedule/validate")]
async fn api_validate_schedule(body: Json<ValidateScheduleBody>) -> HttpResponse {
    HttpResponse::Ok().json(validate_schedule(&body.assignments, &body.reservations))
}

fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(api_health)
        .service(api_create_tournament)
        .service(api_get_tournament)
        .service(api_standings)
        .service(api_set_courts)
        .service(api_assign_courts)
        .service(api_start_match)
        .service(api_report_result)
        .service(api_cancel_match)
        .service(api_next_swiss_round)
        .service(api_cancel_tournament)
        .service(api_validate_schedule);
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env();
    let bind = (config.host.clone(), config.port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(AppContext {
        store: TournamentStore::new(),
        config,
    });

    // Background task: periodically remove tournaments idle past the inactivity timeout
    let state_cleanup = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(state_cleanup.config.cleanup_interval);
        loop {
            interval.tick().await;
            if let Err(e) = state_cleanup.store.remove_idle(state_cleanup.config.inactivity_timeout) {
                log::warn!("Tournament cleanup skipped: {}", e);
            }
        }
    });

    HttpServer::new(move || App::new().app_data(state.clone()).configure(routes))
        .bind(bind)?
        .run()
        .await
}

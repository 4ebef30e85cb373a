use actix_web::{middleware, web, App, HttpResponse, HttpServer, Result};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use tracing::{info, warn};

use crate::config::{AllocationConfig, PlannerConfig};
use crate::form::{
    export_submissions_to_csv, validate_publish, validate_submission, AvailabilityFormRequest, ScheduleRecord,
    SchedulePublishRequest,
};
use crate::schedule::{
    allocate_legacy, day_time_slots, summarize_coverage, Assignment, ProportionalAllocator, RandomTieBreak,
    ShiftBlockCatalog,
};

const SHARE_CODE_LEN: usize = 8;

// In-memory storage for schedules (in production, use a database)
pub struct AppState {
    pub schedules: Mutex<HashMap<String, ScheduleRecord>>,
    pub catalog: ShiftBlockCatalog,
    pub allocation: AllocationConfig,
    pub archive_dir: Option<PathBuf>,
}

impl AppState {
    pub fn new(config: &PlannerConfig) -> Self {
        Self {
            schedules: Mutex::new(HashMap::new()),
            catalog: config.catalog(),
            allocation: config.allocation.clone(),
            archive_dir: config.server.archive_dir.clone(),
        }
    }

    fn schedules(&self) -> Result<MutexGuard<'_, HashMap<String, ScheduleRecord>>> {
        self.schedules
            .lock()
            .map_err(|_| actix_web::error::ErrorInternalServerError("schedule store unavailable"))
    }
}

#[derive(Deserialize)]
pub struct AssignmentQuery {
    mode: Option<String>,
    seed: Option<u64>,
}

#[derive(Serialize)]
pub struct AssignmentResponse {
    share_code: String,
    mode: String,
    assignments: Vec<Assignment>,
}

fn new_share_code(taken: &HashMap<String, ScheduleRecord>) -> String {
    let mut rng = rand::thread_rng();
    loop {
        let code: String = (&mut rng)
            .sample_iter(&Alphanumeric)
            .take(SHARE_CODE_LEN)
            .map(char::from)
            .collect();
        if !taken.contains_key(&code) {
            return code;
        }
    }
}

fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({"success": false, "error": "Schedule not found"}))
}

fn bad_request(message: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({"success": false, "error": message.into()}))
}

// Organizer publishes required hours
async fn publish_schedule(
    req: web::Json<SchedulePublishRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if let Err(message) = validate_publish(&req) {
        return Ok(bad_request(message));
    }
    let daily_schedule = match req.coverage() {
        Ok(coverage) => coverage,
        Err(e) => return Ok(bad_request(e.to_string())),
    };

    let mut schedules = state.schedules()?;
    let share_code = new_share_code(&schedules);
    schedules.insert(
        share_code.clone(),
        ScheduleRecord {
            share_code: share_code.clone(),
            name: req.name.trim().to_string(),
            start_date: req.start_date,
            end_date: req.end_date,
            daily_schedule,
            availability: Vec::new(),
        },
    );
    info!(%share_code, "schedule published");

    Ok(HttpResponse::Ok().json(serde_json::json!({"success": true, "share_code": share_code})))
}

async fn get_schedule(code: web::Path<String>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let schedules = state.schedules()?;
    match schedules.get(code.as_str()) {
        Some(record) => Ok(HttpResponse::Ok().json(record)),
        None => Ok(not_found()),
    }
}

// Participant availability form
async fn submit_availability(
    code: web::Path<String>,
    req: web::Json<AvailabilityFormRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let submissions = {
        let mut schedules = state.schedules()?;
        let Some(record) = schedules.get_mut(code.as_str()) else {
            return Ok(not_found());
        };

        if let Err(message) = validate_submission(&req, &record.daily_schedule) {
            return Ok(bad_request(message));
        }
        let submissions = match req.to_submissions() {
            Ok(submissions) => submissions,
            Err(e) => return Ok(bad_request(e.to_string())),
        };
        record.submit(submissions.clone());
        submissions
    };

    // file I/O happens after the store lock is released
    if let Some(dir) = &state.archive_dir {
        let path = dir.join(format!("{}.csv", code.as_str()));
        if let Err(e) = export_submissions_to_csv(&path, &submissions) {
            warn!(path = %path.display(), error = %e, "could not archive availability");
        }
    }

    let submitted = submissions.len();
    info!(share_code = %code, participant = %req.participant_name.trim(), days = submitted, "availability recorded");

    Ok(HttpResponse::Ok().json(serde_json::json!({"success": true, "submitted": submitted})))
}

async fn get_coverage(code: web::Path<String>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let schedules = state.schedules()?;
    match schedules.get(code.as_str()) {
        Some(record) => Ok(HttpResponse::Ok().json(summarize_coverage(&record.daily_schedule, &record.availability))),
        None => Ok(not_found()),
    }
}

async fn get_assignments(
    code: web::Path<String>,
    query: web::Query<AssignmentQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let schedules = state.schedules()?;
    let Some(record) = schedules.get(code.as_str()) else {
        return Ok(not_found());
    };

    let mode = query.mode.as_deref().unwrap_or("proportional");
    let assignments = match mode {
        "proportional" => {
            let mut tie = RandomTieBreak::from_seed_option(query.seed.or(state.allocation.seed));
            ProportionalAllocator::new(&state.catalog)
                .with_full_cover_ratio(state.allocation.full_cover_ratio)
                .allocate(&record.daily_schedule, &record.availability, &mut tie)
        }
        "legacy" => {
            let slots = day_time_slots(state.allocation.legacy_slot_minutes);
            allocate_legacy(&record.daily_schedule, &record.availability, &slots)
        }
        other => {
            warn!(mode = other, "unknown allocation mode requested");
            return Ok(bad_request(format!("Unknown allocation mode '{}'", other)));
        }
    };

    Ok(HttpResponse::Ok().json(AssignmentResponse {
        share_code: record.share_code.clone(),
        mode: mode.to_string(),
        assignments,
    }))
}

/// Registers the API routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/schedules", web::post().to(publish_schedule))
        .service(web::resource("/api/schedules/{code}").route(web::get().to(get_schedule)))
        .service(web::resource("/api/schedules/{code}/availability").route(web::post().to(submit_availability)))
        .service(web::resource("/api/schedules/{code}/coverage").route(web::get().to(get_coverage)))
        .service(web::resource("/api/schedules/{code}/assignments").route(web::get().to(get_assignments)));
}

pub async fn start_server(config: PlannerConfig) -> std::io::Result<()> {
    let app_state = web::Data::new(AppState::new(&config));
    let bind = (config.server.host.clone(), config.server.port);

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .configure(configure)
    })
    .bind(bind)?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test;
    use serde_json::{json, Value};

    fn state() -> web::Data<AppState> {
        let mut config = PlannerConfig::default();
        config.allocation.seed = Some(3);
        web::Data::new(AppState::new(&config))
    }

    macro_rules! app {
        ($state:expr) => {
            test::init_service(App::new().app_data($state.clone()).configure(configure)).await
        };
    }

    fn publish_body() -> Value {
        json!({
            "name": "Front desk",
            "start_date": "2024-06-03",
            "end_date": "2024-06-09",
            "daily_schedule": {"monday": {"start": "10:00", "end": "19:30"}}
        })
    }

    #[actix_web::test]
    async fn publish_submit_and_allocate() {
        let state = state();
        let app = app!(state);

        let req = test::TestRequest::post().uri("/api/schedules").set_json(publish_body()).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
        let code = body["share_code"].as_str().unwrap().to_string();
        assert_eq!(code.len(), SHARE_CODE_LEN);

        for (name, start, end) in [("A", "10:00", "13:00"), ("B", "12:00", "19:30")] {
            let form = json!({
                "participant_name": name,
                "days": {"monday": {"available": true, "start": start, "end": end}}
            });
            let req = test::TestRequest::post()
                .uri(&format!("/api/schedules/{}/availability", code))
                .set_json(form)
                .to_request();
            let body: Value = test::call_and_read_body_json(&app, req).await;
            assert_eq!(body["submitted"], 1);
        }

        let req = test::TestRequest::get()
            .uri(&format!("/api/schedules/{}/assignments", code))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let assignments = body["assignments"].as_array().unwrap();
        assert_eq!(assignments.len(), 3);
        assert_eq!(assignments[0]["participant"], "A");
        assert_eq!(assignments[2]["participant"], "B");
        assert_eq!(assignments[2]["flag"], "multi-shift");

        let req = test::TestRequest::get()
            .uri(&format!("/api/schedules/{}/assignments?mode=legacy", code))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["mode"], "legacy");
        assert_eq!(body["assignments"].as_array().unwrap().len(), 19);

        let req = test::TestRequest::get()
            .uri(&format!("/api/schedules/{}/coverage", code))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body[0]["day"], "monday");
        assert_eq!(body[0]["status"], "partial");
    }

    #[actix_web::test]
    async fn submissions_are_archived() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = PlannerConfig::default();
        config.server.archive_dir = Some(dir.path().to_path_buf());
        let state = web::Data::new(AppState::new(&config));
        let app = app!(state);

        let req = test::TestRequest::post().uri("/api/schedules").set_json(publish_body()).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let code = body["share_code"].as_str().unwrap().to_string();

        let form = json!({
            "participant_name": "Ana",
            "days": {"monday": {"available": true, "start": "10:00", "end": "13:00"}}
        });
        let req = test::TestRequest::post()
            .uri(&format!("/api/schedules/{}/availability", code))
            .set_json(form)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let archived = crate::parser::load_availability(dir.path().join(format!("{}.csv", code))).unwrap();
        assert_eq!(archived.len(), 1);
        assert_eq!(archived[0].participant, "Ana");

        // the store is free again once the archive is written
        assert!(state.schedules.try_lock().is_ok());
    }

    #[actix_web::test]
    async fn unknown_code_is_not_found() {
        let state = state();
        let app = app!(state);
        let req = test::TestRequest::get().uri("/api/schedules/nope/coverage").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn invalid_input_is_bad_request() {
        let state = state();
        let app = app!(state);

        let mut body = publish_body();
        body["daily_schedule"] = json!({"monday": {"start": "19:30", "end": "10:00"}});
        let req = test::TestRequest::post().uri("/api/schedules").set_json(body).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post().uri("/api/schedules").set_json(publish_body()).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let code = body["share_code"].as_str().unwrap().to_string();

        let form = json!({
            "participant_name": "A",
            "days": {"sunday": {"available": true, "start": "10:00", "end": "13:00"}}
        });
        let req = test::TestRequest::post()
            .uri(&format!("/api/schedules/{}/availability", code))
            .set_json(form)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);

        let req = test::TestRequest::get()
            .uri(&format!("/api/schedules/{}/assignments?mode=magic", code))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }
}

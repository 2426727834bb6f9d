use crate::config::ServerConfig;
use crate::data::{
    Assignment, Conflict, ConflictId, Course, Day, Faculty, GenerationSummary, Room,
    SchedulingInput, SchedulingOutput, SchedulingPreferences, Student, TimeSlot, Timetable,
    UnscheduledId, UnscheduledItem,
};
use crate::error::SchedulerError;
use crate::export;
use crate::state::{DashboardStats, ScheduleView, SchedulingState, Upsert};
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use chrono::Utc;
use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};

type ApiResult<T> = Result<T, SchedulerError>;

/// The workspace behind the stateful endpoints.
pub struct Workspace {
    pub state: SchedulingState,
    rng: StdRng,
}

pub type AppState = Arc<Mutex<Workspace>>;

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

pub fn app_state(seed: Option<u64>) -> AppState {
    Arc::new(Mutex::new(Workspace {
        state: SchedulingState::new(),
        rng: seeded_rng(seed),
    }))
}

fn lock(app: &AppState) -> ApiResult<MutexGuard<'_, Workspace>> {
    app.lock().map_err(|_| SchedulerError::StateUnavailable)
}

fn upserted(result: Upsert) -> (StatusCode, Json<Upsert>) {
    let status = match result {
        Upsert::Created => StatusCode::CREATED,
        Upsert::Updated => StatusCode::OK,
    };
    (status, Json(result))
}

/// Runs a full generate-then-detect pass on a throwaway state.
pub fn solve(input: SchedulingInput) -> ApiResult<SchedulingOutput> {
    let mut rng = seeded_rng(input.seed);
    let mut state = SchedulingState::from_input(input)?;
    let summary = state.generate_timetable(&mut rng)?;
    Ok(SchedulingOutput {
        timetable: state.timetable,
        unscheduled: state.unscheduled,
        conflicts: state.conflicts,
        summary,
    })
}

async fn solve_handler(Json(input): Json<SchedulingInput>) -> ApiResult<Json<SchedulingOutput>> {
    solve(input).map(Json)
}

async fn get_state(State(app): State<AppState>) -> ApiResult<Json<SchedulingState>> {
    Ok(Json(lock(&app)?.state.clone()))
}

async fn get_dashboard(State(app): State<AppState>) -> ApiResult<Json<DashboardStats>> {
    Ok(Json(lock(&app)?.state.dashboard()))
}

async fn upsert_course(
    State(app): State<AppState>,
    Json(course): Json<Course>,
) -> ApiResult<impl IntoResponse> {
    Ok(upserted(lock(&app)?.state.upsert_course(course)?))
}

async fn delete_course(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Course>> {
    Ok(Json(lock(&app)?.state.delete_course(&id)?))
}

async fn upsert_faculty(
    State(app): State<AppState>,
    Json(faculty): Json<Faculty>,
) -> ApiResult<impl IntoResponse> {
    Ok(upserted(lock(&app)?.state.upsert_faculty(faculty)?))
}

async fn delete_faculty(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Faculty>> {
    Ok(Json(lock(&app)?.state.delete_faculty(&id)?))
}

async fn upsert_student(
    State(app): State<AppState>,
    Json(student): Json<Student>,
) -> ApiResult<impl IntoResponse> {
    Ok(upserted(lock(&app)?.state.upsert_student(student)?))
}

async fn delete_student(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Student>> {
    Ok(Json(lock(&app)?.state.delete_student(&id)?))
}

async fn upsert_room(
    State(app): State<AppState>,
    Json(room): Json<Room>,
) -> ApiResult<impl IntoResponse> {
    Ok(upserted(lock(&app)?.state.upsert_room(room)?))
}

async fn delete_room(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Room>> {
    Ok(Json(lock(&app)?.state.delete_room(&id)?))
}

async fn upsert_time_slot(
    State(app): State<AppState>,
    Json(slot): Json<TimeSlot>,
) -> ApiResult<impl IntoResponse> {
    Ok(upserted(lock(&app)?.state.upsert_time_slot(slot)?))
}

async fn delete_time_slot(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<TimeSlot>> {
    Ok(Json(lock(&app)?.state.delete_time_slot(&id)?))
}

async fn put_preferences(
    State(app): State<AppState>,
    Json(preferences): Json<SchedulingPreferences>,
) -> ApiResult<Json<SchedulingPreferences>> {
    lock(&app)?.state.set_preferences(preferences);
    Ok(Json(preferences))
}

async fn generate_handler(State(app): State<AppState>) -> ApiResult<Json<GenerationSummary>> {
    let mut guard = lock(&app)?;
    let Workspace { state, rng } = &mut *guard;
    Ok(Json(state.generate_timetable(rng)?))
}

async fn retry_handler(State(app): State<AppState>) -> ApiResult<Json<GenerationSummary>> {
    let mut guard = lock(&app)?;
    let Workspace { state, rng } = &mut *guard;
    Ok(Json(state.retry_scheduling(rng)?))
}

async fn get_timetable(State(app): State<AppState>) -> ApiResult<Json<Timetable>> {
    Ok(Json(lock(&app)?.state.timetable.clone()))
}

fn parse_day(day: &str) -> ApiResult<Day> {
    day.parse().map_err(|e| SchedulerError::invalid("day", e))
}

fn parse_view(view: &str) -> ApiResult<ScheduleView> {
    view.parse().map_err(|e| SchedulerError::invalid("view", e))
}

async fn place_handler(
    State(app): State<AppState>,
    Path((day, slot)): Path<(String, String)>,
    Json(assignment): Json<Assignment>,
) -> ApiResult<Json<Vec<Conflict>>> {
    let day = parse_day(&day)?;
    let mut guard = lock(&app)?;
    guard.state.place_assignment(day, &slot, assignment)?;
    Ok(Json(guard.state.conflicts.clone()))
}

async fn remove_handler(
    State(app): State<AppState>,
    Path((day, slot, course)): Path<(String, String, String)>,
) -> ApiResult<Json<Assignment>> {
    let day = parse_day(&day)?;
    Ok(Json(lock(&app)?.state.remove_assignment(day, &slot, &course)?))
}

async fn individual_schedule(
    State(app): State<AppState>,
    Path((view, id)): Path<(String, String)>,
) -> ApiResult<Json<Timetable>> {
    let view = parse_view(&view)?;
    Ok(Json(lock(&app)?.state.individual_schedule(view, &id)))
}

async fn individual_csv(
    State(app): State<AppState>,
    Path((view, id)): Path<(String, String)>,
) -> ApiResult<impl IntoResponse> {
    let view = parse_view(&view)?;
    let guard = lock(&app)?;
    if guard.state.entity_name(view, &id).is_none() {
        return Err(SchedulerError::not_found("entity", format!("{view} {id}")));
    }
    let schedule = guard.state.individual_schedule(view, &id);
    let csv = export::schedule_to_csv(&guard.state, view, &schedule)?;
    let file_name = export::csv_file_name(view, &id, Utc::now().date_naive());
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        csv,
    ))
}

async fn export_schedules(
    State(app): State<AppState>,
    Path(view): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let view = parse_view(&view)?;
    let now = Utc::now();
    let guard = lock(&app)?;
    let body = serde_json::to_value(export::export_all_schedules(&guard.state, view, now)?)?;
    let file_name = export::bulk_file_name(view, now.date_naive());
    Ok((
        [(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{file_name}\""),
        )],
        Json(body),
    ))
}

async fn scan_handler(State(app): State<AppState>) -> ApiResult<Json<Vec<Conflict>>> {
    let mut guard = lock(&app)?;
    Ok(Json(guard.state.scan_conflicts().to_vec()))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AutoResolved {
    resolved: usize,
    conflicts: Vec<Conflict>,
}

async fn auto_resolve_handler(State(app): State<AppState>) -> ApiResult<Json<AutoResolved>> {
    let mut guard = lock(&app)?;
    let resolved = guard.state.auto_resolve_conflicts();
    Ok(Json(AutoResolved {
        resolved,
        conflicts: guard.state.conflicts.clone(),
    }))
}

async fn conflict_report(State(app): State<AppState>) -> ApiResult<Json<serde_json::Value>> {
    let guard = lock(&app)?;
    let report = export::conflict_report(&guard.state.conflicts, Utc::now());
    Ok(Json(serde_json::to_value(report)?))
}

async fn resolve_conflict(
    State(app): State<AppState>,
    Path(id): Path<ConflictId>,
) -> ApiResult<Json<Conflict>> {
    Ok(Json(lock(&app)?.state.resolve_conflict(id)?))
}

async fn ignore_conflict(
    State(app): State<AppState>,
    Path(id): Path<ConflictId>,
) -> ApiResult<Json<Conflict>> {
    Ok(Json(lock(&app)?.state.ignore_conflict(id)?))
}

async fn dismiss_unscheduled(
    State(app): State<AppState>,
    Path(id): Path<UnscheduledId>,
) -> ApiResult<Json<UnscheduledItem>> {
    Ok(Json(lock(&app)?.state.dismiss_unscheduled(id)?))
}

async fn export_handler(State(app): State<AppState>) -> ApiResult<Json<serde_json::Value>> {
    let guard = lock(&app)?;
    let bundle = export::export_all(&guard.state, Utc::now());
    Ok(Json(serde_json::to_value(bundle)?))
}

pub fn router(app: AppState) -> Router {
    Router::new()
        .route("/v1/schedule/solve", post(solve_handler))
        .route("/v1/state", get(get_state))
        .route("/v1/dashboard", get(get_dashboard))
        .route("/v1/courses", post(upsert_course))
        .route("/v1/courses/:id", delete(delete_course))
        .route("/v1/faculty", post(upsert_faculty))
        .route("/v1/faculty/:id", delete(delete_faculty))
        .route("/v1/students", post(upsert_student))
        .route("/v1/students/:id", delete(delete_student))
        .route("/v1/rooms", post(upsert_room))
        .route("/v1/rooms/:id", delete(delete_room))
        .route("/v1/time-slots", post(upsert_time_slot))
        .route("/v1/time-slots/:id", delete(delete_time_slot))
        .route("/v1/preferences", put(put_preferences))
        .route("/v1/timetable", get(get_timetable))
        .route("/v1/timetable/generate", post(generate_handler))
        .route("/v1/timetable/:day/:slot", post(place_handler))
        .route("/v1/timetable/:day/:slot/:course", delete(remove_handler))
        .route("/v1/schedules/:view/export", get(export_schedules))
        .route("/v1/schedules/:view/:id", get(individual_schedule))
        .route("/v1/schedules/:view/:id/csv", get(individual_csv))
        .route("/v1/conflicts/scan", post(scan_handler))
        .route("/v1/conflicts/auto-resolve", post(auto_resolve_handler))
        .route("/v1/conflicts/report", get(conflict_report))
        .route("/v1/conflicts/:id/resolve", post(resolve_conflict))
        .route("/v1/conflicts/:id/ignore", post(ignore_conflict))
        .route("/v1/unscheduled/retry", post(retry_handler))
        .route("/v1/unscheduled/:id", delete(dismiss_unscheduled))
        .route("/v1/export", get(export_handler))
        .with_state(app)
}

pub async fn run_server(config: ServerConfig) -> std::io::Result<()> {
    let app = router(app_state(config.seed));

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;

    info!("Server running at http://{}", listener.local_addr()?);

    axum::serve(listener, app).await
}

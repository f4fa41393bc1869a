use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::NaiveDate;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

use crate::{
    Activity, Habit, HabitError, HabitId, HabitRating, HabitReport, HabitStore, PersistenceError,
    Schedule, Tier, Tracker,
};

pub type SharedStore = Arc<dyn HabitStore + Send + Sync>;

#[derive(Clone)]
pub struct AppState {
    tracker: Arc<RwLock<Tracker>>,
    store: Option<SharedStore>,
}

impl AppState {
    pub fn new(tracker: Tracker) -> Self {
        Self::with_shared(Arc::new(RwLock::new(tracker)))
    }

    pub fn with_shared(tracker: Arc<RwLock<Tracker>>) -> Self {
        Self {
            tracker,
            store: None,
        }
    }

    /// State whose mutations are written through to `store`.
    pub fn with_store(tracker: Tracker, store: SharedStore) -> Self {
        Self {
            store: Some(store),
            ..Self::new(tracker)
        }
    }

    fn tracker(&self) -> Arc<RwLock<Tracker>> {
        self.tracker.clone()
    }

    /// Called with the write lock still held so saves land in mutation order.
    fn persist(&self, tracker: &Tracker) -> Result<(), ApiError> {
        let Some(store) = &self.store else {
            return Ok(());
        };
        store.save_tracker(tracker).map_err(|err| {
            error!(error = %err, "failed to persist tracker");
            ApiError::from(err)
        })
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Conflict(String),
    Invalid(String),
    Internal(String),
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }
}

impl From<HabitError> for ApiError {
    fn from(value: HabitError) -> Self {
        match value {
            HabitError::UnknownHabit(_) => ApiError::NotFound(value.to_string()),
            HabitError::DuplicateHabit(_) | HabitError::DuplicateDate { .. } => {
                ApiError::Conflict(value.to_string())
            }
            HabitError::Invariant { .. } => ApiError::Internal(value.to_string()),
        }
    }
}

impl From<PersistenceError> for ApiError {
    fn from(value: PersistenceError) -> Self {
        ApiError::Internal(value.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, "conflict", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
            ApiError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
            }
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct CreateHabitPayload {
    #[serde(default)]
    id: Option<HabitId>,
    task: String,
    schedule: Schedule,
    #[serde(default)]
    created: Option<NaiveDate>,
    #[serde(default)]
    active: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct TodayQuery {
    today: Option<NaiveDate>,
}

impl TodayQuery {
    /// The one place the server falls back to its own clock.
    fn resolve(&self) -> NaiveDate {
        self.today
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}

#[derive(Debug, Serialize)]
struct RatingBody {
    habit_id: HabitId,
    today: NaiveDate,
    tier: Tier,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/habits", get(list_habits).post(create_habit))
        .route("/habits/:id", get(get_habit).delete(delete_habit))
        .route("/habits/:id/activities", post(log_activity))
        .route("/habits/:id/streaks", get(habit_streaks))
        .route("/habits/:id/rating", get(habit_rating))
        .route("/ratings", get(all_ratings))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let persistent = state.store.is_some();
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, persistent, "habit tracker HTTP API listening");
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn list_habits(State(state): State<AppState>) -> Json<Vec<Habit>> {
    let tracker = state.tracker();
    let habits = {
        let guard = tracker.read();
        guard.habits().cloned().collect()
    };
    Json(habits)
}

async fn get_habit(
    State(state): State<AppState>,
    Path(habit_id): Path<HabitId>,
) -> Result<Json<Habit>, ApiError> {
    let tracker = state.tracker();
    let habit = {
        let guard = tracker.read();
        guard.habit(habit_id).cloned()
    };
    habit
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("habit {habit_id} not found")))
}

async fn create_habit(
    State(state): State<AppState>,
    Json(payload): Json<CreateHabitPayload>,
) -> Result<(StatusCode, Json<Habit>), ApiError> {
    if payload.task.trim().is_empty() {
        return Err(ApiError::invalid("task must not be empty"));
    }
    let tracker = state.tracker();
    let created = {
        let mut guard = tracker.write();
        let id = payload.id.unwrap_or_else(|| guard.next_id());
        let created = payload
            .created
            .unwrap_or_else(|| chrono::Local::now().date_naive());
        let mut habit = Habit::new(id, payload.task.trim(), payload.schedule, created);
        habit.active = payload.active.unwrap_or(true);
        guard.add_habit(habit.clone())?;
        state.persist(&guard)?;
        habit
    };
    Ok((StatusCode::CREATED, Json(created)))
}

async fn delete_habit(
    State(state): State<AppState>,
    Path(habit_id): Path<HabitId>,
) -> Result<StatusCode, ApiError> {
    let tracker = state.tracker();
    let mut guard = tracker.write();
    if guard.remove_habit(habit_id).is_none() {
        return Err(ApiError::not_found(format!("habit {habit_id} not found")));
    }
    state.persist(&guard)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn log_activity(
    State(state): State<AppState>,
    Path(habit_id): Path<HabitId>,
    Json(activity): Json<Activity>,
) -> Result<(StatusCode, Json<Activity>), ApiError> {
    let tracker = state.tracker();
    {
        let mut guard = tracker.write();
        guard.log_activity(habit_id, activity.clone())?;
        state.persist(&guard)?;
    }
    Ok((StatusCode::CREATED, Json(activity)))
}

async fn habit_streaks(
    State(state): State<AppState>,
    Path(habit_id): Path<HabitId>,
    Query(query): Query<TodayQuery>,
) -> Result<Json<HabitReport>, ApiError> {
    let today = query.resolve();
    let tracker = state.tracker();
    // write lock: the report fills the streak cache
    let report = {
        let mut guard = tracker.write();
        guard.report(habit_id, today)?
    };
    Ok(Json(report))
}

async fn habit_rating(
    State(state): State<AppState>,
    Path(habit_id): Path<HabitId>,
    Query(query): Query<TodayQuery>,
) -> Result<Json<RatingBody>, ApiError> {
    let today = query.resolve();
    let tracker = state.tracker();
    let tier = {
        let guard = tracker.read();
        guard.rating(habit_id, today)?
    };
    Ok(Json(RatingBody {
        habit_id,
        today,
        tier,
    }))
}

async fn all_ratings(
    State(state): State<AppState>,
    Query(query): Query<TodayQuery>,
) -> Result<Json<Vec<HabitRating>>, ApiError> {
    let today = query.resolve();
    let tracker = state.tracker();
    let ratings = {
        let guard = tracker.read();
        guard.ratings(today)?
    };
    Ok(Json(ratings))
}

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use tower_http::cors::CorsLayer;

use crate::api::sensors::{SensorKey, sensor_states};
use crate::services::coordinator::Coordinator;
use crate::services::snapshot::Snapshot;

#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<Coordinator>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub name: String,
    pub last_update_success: bool,
    pub auth_failed: bool,
    pub last_error: Option<String>,
    pub refreshed_at: Option<DateTime<Utc>>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "ok" }))
        .route("/api/status", get(status_handler))
        .route("/api/snapshot", get(snapshot_handler))
        .route("/api/sensors", get(sensors_handler))
        .route("/api/sensors/{key}", get(sensor_handler))
        .route("/api/workouts/{workout_id}", get(workout_handler))
        .route(
            "/api/workouts/{workout_id}/exercises/{exercise_key}",
            get(exercise_handler),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn status_handler(State(state): State<AppState>) -> Json<StatusResponse> {
    let status = state.coordinator.status();

    Json(StatusResponse {
        name: state.coordinator.name().to_string(),
        last_update_success: status.last_update_success,
        auth_failed: status.auth_failed,
        last_error: status.last_error,
        refreshed_at: status.data.and_then(|s| s.refreshed_at),
    })
}

// Before the first refresh this is an empty snapshot, not an error.
pub async fn snapshot_handler(State(state): State<AppState>) -> Json<Snapshot> {
    let snapshot = match state.coordinator.data() {
        Some(snapshot) => Snapshot::clone(&snapshot),
        None => Snapshot::empty(state.coordinator.name()),
    };
    Json(snapshot)
}

pub async fn sensors_handler(State(state): State<AppState>) -> impl IntoResponse {
    let status = state.coordinator.status();
    Json(sensor_states(&status, state.coordinator.name(), &Local::now()))
}

pub async fn sensor_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> impl IntoResponse {
    let Some(sensor) = SensorKey::from_key(&key) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let snapshot = state.coordinator.data();
    Json(serde_json::json!({
        "key": sensor.as_str(),
        "value": sensor.value(snapshot.as_deref(), &Local::now()),
    }))
    .into_response()
}

pub async fn workout_handler(
    State(state): State<AppState>,
    Path(workout_id): Path<String>,
) -> impl IntoResponse {
    let snapshot = state.coordinator.data();
    match snapshot.as_deref().and_then(|s| s.workout(&workout_id)) {
        Some(workout) => Json(workout.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

pub async fn exercise_handler(
    State(state): State<AppState>,
    Path((workout_id, exercise_key)): Path<(String, String)>,
) -> impl IntoResponse {
    let snapshot = state.coordinator.data();
    let exercise = snapshot
        .as_deref()
        .and_then(|s| s.workout(&workout_id))
        .and_then(|w| w.exercise(&exercise_key));

    match exercise {
        Some(exercise) => Json(exercise.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

//! Handlers for the weekly timetable.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;

use crate::models::{SessionTask, WeekSchedule};
use crate::parse::dates::today_spanish;
use crate::parse::schedule;
use crate::state::AppState;
use crate::web::auth::Session;
use crate::web::error::ApiError;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekRequest {
    pub student_id: String,
    /// `DD/MM/YYYY` anchor; the containing school week is returned.
    /// Defaults to today.
    pub date: Option<String>,
}

/// `POST /api/schedule/week`
pub async fn get_week(
    State(state): State<AppState>,
    Session(cookie): Session,
    Json(request): Json<WeekRequest>,
) -> Result<Json<WeekSchedule>, ApiError> {
    let reference = request.date.unwrap_or_else(today_spanish);
    let raw = state
        .upstream
        .week_schedule(&cookie, &request.student_id, &reference)
        .await?;
    Ok(Json(schedule::normalize_week(raw)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionTasksRequest {
    pub session_id: String,
    /// `DD/MM/YYYY`.
    pub date: String,
}

/// `POST /api/schedule/session-tasks`
pub async fn get_session_tasks(
    State(state): State<AppState>,
    Session(cookie): Session,
    Json(request): Json<SessionTasksRequest>,
) -> Result<Json<Vec<SessionTask>>, ApiError> {
    let raw = state
        .upstream
        .session_tasks(&cookie, &request.session_id, &request.date)
        .await?;
    Ok(Json(schedule::normalize_session_tasks(raw)))
}

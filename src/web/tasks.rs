//! Handlers for homework tasks.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::models::{Task, TaskDetail};
use crate::parse::dates::today_spanish;
use crate::parse::tasks;
use crate::state::AppState;
use crate::web::auth::Session;
use crate::web::error::ApiError;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskListRequest {
    pub student_id: String,
    /// `DD/MM/YYYY`; defaults to today.
    pub start_date: Option<String>,
    /// `DD/MM/YYYY`; empty means no upper bound.
    pub end_date: Option<String>,
}

/// `POST /api/tasks`
pub async fn list_tasks(
    State(state): State<AppState>,
    Session(cookie): Session,
    Json(request): Json<TaskListRequest>,
) -> Result<Json<Vec<Task>>, ApiError> {
    let start = request.start_date.unwrap_or_else(today_spanish);
    let end = request.end_date.unwrap_or_default();
    let html = state
        .upstream
        .tasks(&cookie, &request.student_id, &start, &end)
        .await?;
    Ok(Json(tasks::parse_task_grid(&html)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDetailRequest {
    pub task_id: String,
    pub student_id: String,
}

/// `POST /api/tasks/detail`
///
/// Fetching the detail also marks the task read upstream, matching what the
/// platform does when a family opens it.
pub async fn get_task(
    State(state): State<AppState>,
    Session(cookie): Session,
    Json(request): Json<TaskDetailRequest>,
) -> Result<Json<TaskDetail>, ApiError> {
    let html = state
        .upstream
        .task_detail(&cookie, &request.task_id, &request.student_id)
        .await?;
    Ok(Json(tasks::parse_task_detail(&html)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatusRequest {
    pub task_id: String,
    pub seen: bool,
}

#[derive(Serialize)]
pub struct TaskStatusResponse {
    pub success: bool,
}

/// `POST /api/tasks/status`
pub async fn set_task_status(
    State(state): State<AppState>,
    Session(cookie): Session,
    Json(request): Json<TaskStatusRequest>,
) -> Result<Json<TaskStatusResponse>, ApiError> {
    state
        .upstream
        .set_task_status(&cookie, &request.task_id, request.seen)
        .await?;
    Ok(Json(TaskStatusResponse { success: true }))
}

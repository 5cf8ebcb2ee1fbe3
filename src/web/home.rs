//! Handlers for the home-screen widgets: counters, unread marks, birthdays.

use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;

use crate::models::{Birthday, Counter, UnreadMark};
use crate::parse::birthdays::normalize_birthdays;
use crate::parse::counters::{normalize_counters, normalize_unread_marks};
use crate::parse::dates::today_iso;
use crate::state::AppState;
use crate::web::auth::Session;
use crate::web::error::ApiError;

/// Role id Educamos assigns to family/tutor accounts.
const FAMILY_ROLE: &str = "3";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountersQuery {
    pub student_id: String,
    pub role_id: Option<String>,
}

/// `GET /api/counters`
pub async fn get_counters(
    State(state): State<AppState>,
    Session(cookie): Session,
    Query(query): Query<CountersQuery>,
) -> Result<Json<Vec<Counter>>, ApiError> {
    let role = query.role_id.as_deref().unwrap_or(FAMILY_ROLE);
    let raw = state
        .upstream
        .counters(&cookie, &query.student_id, role)
        .await?;
    Ok(Json(normalize_counters(raw)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadMarksQuery {
    pub student_id: String,
    pub role_id: Option<String>,
    pub count: Option<u32>,
    /// ISO `YYYY-MM-DD`; defaults to today.
    pub date: Option<String>,
}

/// `GET /api/unread-marks`
pub async fn get_unread_marks(
    State(state): State<AppState>,
    Session(cookie): Session,
    Query(query): Query<UnreadMarksQuery>,
) -> Result<Json<Vec<UnreadMark>>, ApiError> {
    let role = query.role_id.as_deref().unwrap_or(FAMILY_ROLE);
    let count = query.count.unwrap_or(3).to_string();
    let date = query.date.unwrap_or_else(today_iso);
    let raw = state
        .upstream
        .unread_marks(&cookie, &query.student_id, &count, role, &date)
        .await?;
    Ok(Json(normalize_unread_marks(raw)))
}

/// `GET /api/birthdays`
pub async fn get_birthdays(
    State(state): State<AppState>,
    Session(cookie): Session,
) -> Result<Json<Vec<Birthday>>, ApiError> {
    let raw = state.upstream.birthdays(&cookie).await?;
    Ok(Json(normalize_birthdays(raw)))
}

//! Handlers for session context, profile, and school-year metadata.

use axum::Json;
use axum::extract::State;

use crate::models::{ContextData, UserInfo};
use crate::parse::{context, user_info};
use crate::state::AppState;
use crate::web::auth::Session;
use crate::web::error::ApiError;

/// `GET /api/context`
///
/// Scrapes the context bootstrap script. A missing anchor maps to 401: it is
/// how an expired session manifests on this endpoint.
pub async fn get_context(
    State(state): State<AppState>,
    Session(cookie): Session,
) -> Result<Json<ContextData>, ApiError> {
    let script = state.upstream.context_script(&cookie).await?;
    Ok(Json(context::parse_context(&script)?))
}

/// `GET /api/user-info`
pub async fn get_user_info(
    State(state): State<AppState>,
    Session(cookie): Session,
) -> Result<Json<UserInfo>, ApiError> {
    let html = state.upstream.user_info_page(&cookie).await?;
    Ok(Json(user_info::parse_user_info(&html)))
}

/// `GET /api/course`
///
/// School-year metadata, passed through as-is.
pub async fn get_course(
    State(state): State<AppState>,
    Session(cookie): Session,
) -> Result<Json<serde_json::Value>, ApiError> {
    Ok(Json(state.upstream.course_info(&cookie).await?))
}

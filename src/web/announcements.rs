//! Handlers for bulletin-board announcements.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderValue, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::models::{Announcement, AnnouncementDetail};
use crate::parse::announcements;
use crate::state::AppState;
use crate::web::auth::Session;
use crate::web::error::ApiError;

#[derive(Serialize)]
pub struct AnnouncementList {
    pub announcements: Vec<Announcement>,
    pub count: usize,
}

/// `GET /api/announcements`
pub async fn list_announcements(
    State(state): State<AppState>,
    Session(cookie): Session,
) -> Result<Json<AnnouncementList>, ApiError> {
    let html = state.upstream.announcements(&cookie).await?;
    let announcements = announcements::parse_announcements(&html);
    let count = announcements.len();
    Ok(Json(AnnouncementList {
        announcements,
        count,
    }))
}

/// `POST /api/announcements/{id}`
///
/// Opening the detail marks the announcement read upstream.
pub async fn get_announcement(
    State(state): State<AppState>,
    Session(cookie): Session,
    Path(id): Path<String>,
) -> Result<Json<AnnouncementDetail>, ApiError> {
    let html = state.upstream.announcement_detail(&cookie, &id).await?;
    Ok(Json(announcements::parse_announcement_detail(&html, &id)))
}

/// `GET /api/announcements/{id}/attachment`
pub async fn download_attachment(
    State(state): State<AppState>,
    Session(cookie): Session,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let download = state.upstream.download_announcement_file(&cookie, &id).await?;

    let content_type = download
        .content_type
        .unwrap_or_else(|| "application/octet-stream".to_string());

    let mut response = download.bytes.into_response();
    if let Ok(value) = HeaderValue::from_str(&content_type) {
        response.headers_mut().insert(header::CONTENT_TYPE, value);
    }
    if let Some(disposition) = download.content_disposition
        && let Ok(value) = HeaderValue::from_str(&disposition)
    {
        response.headers_mut().insert(header::CONTENT_DISPOSITION, value);
    }
    Ok(response)
}

//! Handlers for school circulars and their attachments.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::{HeaderValue, header};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::models::Circular;
use crate::parse::circulars;
use crate::parse::dates::today_spanish;
use crate::state::AppState;
use crate::web::auth::Session;
use crate::web::error::ApiError;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircularsRequest {
    pub student_id: String,
}

/// `POST /api/circulars`
pub async fn list_circulars(
    State(state): State<AppState>,
    Session(cookie): Session,
    Json(request): Json<CircularsRequest>,
) -> Result<Json<Vec<Circular>>, ApiError> {
    let html = state
        .upstream
        .circulars(&cookie, &request.student_id, &today_spanish())
        .await?;
    Ok(Json(circulars::parse_circulars(&html)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadQuery {
    pub circular_id: String,
    /// Subject line, used for the fallback filename when the upstream sends
    /// no Content-Disposition.
    #[serde(default)]
    pub subject: String,
}

/// `GET /api/circulars/download`
///
/// Streams the attachment bundle through, preserving the upstream content
/// type.
pub async fn download_circular(
    State(state): State<AppState>,
    Session(cookie): Session,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, ApiError> {
    let download = state
        .upstream
        .download_circular(&cookie, &query.circular_id)
        .await?;

    let filename = circulars::download_filename(
        download.content_disposition.as_deref(),
        &query.subject,
    );
    let content_type = download
        .content_type
        .unwrap_or_else(|| "application/octet-stream".to_string());

    let mut response = download.bytes.into_response();
    if let Ok(value) = HeaderValue::from_str(&content_type) {
        response.headers_mut().insert(header::CONTENT_TYPE, value);
    }
    if let Ok(value) = HeaderValue::from_str(&format!("attachment; filename=\"{filename}\"")) {
        response.headers_mut().insert(header::CONTENT_DISPOSITION, value);
    }
    Ok(response)
}

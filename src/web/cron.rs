//! The cron-triggered reminder batch endpoint.

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;

use crate::notify::{self, BatchReport};
use crate::state::AppState;
use crate::web::error::ApiError;

/// `GET /api/cron/notifications`
///
/// Meant to be hit once a day by an external scheduler. Guarded by a shared
/// bearer secret when one is configured.
pub async fn run_notifications(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<BatchReport>, ApiError> {
    if let Some(secret) = &state.cron_secret {
        let presented = headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));
        if presented != Some(secret.as_str()) {
            return Err(ApiError::Unauthorized("bad cron secret".to_string()));
        }
    }

    let store = state
        .store
        .as_ref()
        .ok_or(ApiError::NotConfigured("document store"))?;
    let sender = state
        .push
        .as_ref()
        .ok_or(ApiError::NotConfigured("push sender"))?;

    let report = notify::run_batch(store, sender.as_ref()).await?;
    Ok(Json(report))
}

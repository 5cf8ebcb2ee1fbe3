//! Handler for attendance/behavior incidents.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;

use crate::models::Incident;
use crate::parse::incidents;
use crate::state::AppState;
use crate::web::auth::Session;
use crate::web::error::ApiError;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentsRequest {
    pub student_id: String,
}

/// `POST /api/incidents`
pub async fn list_incidents(
    State(state): State<AppState>,
    Session(cookie): Session,
    Json(request): Json<IncidentsRequest>,
) -> Result<Json<Vec<Incident>>, ApiError> {
    let html = state.upstream.incidents(&cookie, &request.student_id).await?;
    Ok(Json(incidents::parse_incidents(&html)))
}

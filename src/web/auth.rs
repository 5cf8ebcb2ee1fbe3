//! Session extraction and the login endpoint.

use axum::Json;
use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::educamos::login::{self, Credentials};
use crate::educamos::session::SessionCookie;
use crate::state::AppState;
use crate::web::error::ApiError;

/// Extractor for the session credential every scraping route requires.
///
/// Clients send the captured cookie string either as `Authorization: Bearer`
/// or in `X-Auth-Token`; the server itself stores nothing.
pub struct Session(pub SessionCookie);

impl<S: Send + Sync> FromRequestParts<S> for Session {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let bearer = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));

        let token = match bearer {
            Some(token) => Some(token),
            None => parts
                .headers
                .get("x-auth-token")
                .and_then(|v| v.to_str().ok()),
        };

        let cookie = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(SessionCookie::new)
            .ok_or_else(|| ApiError::Unauthorized("missing session token".to_string()))?;

        Ok(Self(cookie))
    }
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// The serialized session cookies; send back as the bearer token.
    pub token: String,
    pub user_id: String,
    pub email: String,
}

/// `POST /api/auth/login`
///
/// Drives the headless SSO flow with the supplied credentials and returns
/// the captured session. Also provisions the derived user record in the
/// document store when one is configured; that step is best-effort and never
/// fails the login.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    if request.username.trim().is_empty() || request.password.is_empty() {
        return Err(ApiError::BadRequest(
            "username and password are required".to_string(),
        ));
    }

    let credentials = Credentials {
        username: request.username.trim().to_string(),
        password: request.password.clone(),
    };
    let cookie = login::acquire_session(&state.base_url, &credentials).await?;

    let user_id = login::derive_user_id(&credentials.username);
    let email = login::derive_email(&credentials.username);

    if let Some(store) = &state.store
        && let Err(e) = store.upsert_user(&user_id, &email, &credentials.password).await
    {
        warn!(user = %user_id, error = %e, "User provisioning failed");
    }

    info!(user = %user_id, "Login succeeded");
    Ok(Json(LoginResponse {
        token: cookie.header_value().to_string(),
        user_id,
        email,
    }))
}

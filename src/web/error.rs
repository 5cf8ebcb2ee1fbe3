//! Unified API error responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::educamos::UpstreamError;
use crate::educamos::login::LoginError;
use crate::parse::context::ContextError;

/// Error surface for every handler: a status code plus a JSON body of
/// `{"error": ..., "details": ...}` the frontend can branch on.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    NotFound(String),
    /// A required integration (document store, push keys) is not configured.
    NotConfigured(&'static str),
    Upstream(UpstreamError),
    Internal(anyhow::Error),
}

impl ApiError {
    fn status_and_body(&self) -> (StatusCode, serde_json::Value) {
        match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            Self::Unauthorized(msg) => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "auth_invalid", "details": msg }),
            ),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            Self::NotConfigured(what) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": format!("{what} is not configured") }),
            ),
            Self::Upstream(err) => return upstream_status_and_body(err),
            Self::Internal(err) => {
                tracing::error!(error = ?err, "Unhandled error in request handler");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "internal error" }),
                )
            }
        }
    }
}

/// Upstream failures keep their session/transport distinction: an invalid
/// session is the client's problem (401, clear the stored credential), a
/// plain non-2xx passes through with its original status, and a payload we
/// could not make sense of is our failure (500).
fn upstream_status_and_body(err: &UpstreamError) -> (StatusCode, serde_json::Value) {
    match err {
        UpstreamError::InvalidSession(details) => (
            StatusCode::UNAUTHORIZED,
            json!({ "error": "auth_invalid", "details": details }),
        ),
        UpstreamError::Status { status, url } if *status == 401 || *status == 403 => (
            StatusCode::UNAUTHORIZED,
            json!({ "error": "auth_invalid", "details": format!("HTTP {status} from {url}") }),
        ),
        UpstreamError::Status { status, url } => (
            StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
            json!({ "error": "upstream error", "details": format!("HTTP {status} from {url}") }),
        ),
        UpstreamError::ParseFailed { url, source, .. } => {
            tracing::warn!(url = %url, error = %source, "Upstream response failed to parse");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "upstream response not understood", "details": source.to_string() }),
            )
        }
        UpstreamError::RequestFailed(source) => {
            tracing::warn!(error = %source, "Upstream request failed");
            (
                StatusCode::BAD_GATEWAY,
                json!({ "error": "upstream unreachable" }),
            )
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        Self::Upstream(err)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

impl From<LoginError> for ApiError {
    fn from(err: LoginError) -> Self {
        match err {
            LoginError::InvalidCredentials(msg) => Self::Unauthorized(msg),
            LoginError::Browser(e) => Self::Internal(e),
        }
    }
}

impl From<ContextError> for ApiError {
    fn from(err: ContextError) -> Self {
        match err {
            // No anchor means the session cookie no longer opens a page.
            ContextError::AnchorMissing => Self::Unauthorized(err.to_string()),
            ContextError::Malformed(e) => {
                Self::Upstream(UpstreamError::RequestFailed(e.context("context script")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: UpstreamError) -> StatusCode {
        ApiError::from(err).status_and_body().0
    }

    #[test]
    fn upstream_statuses_pass_through_unchanged() {
        for code in [404, 409, 500, 503] {
            let status = status_of(UpstreamError::Status {
                status: code,
                url: "https://colegio.example.com/x".to_string(),
            });
            assert_eq!(status.as_u16(), code);
        }
    }

    #[test]
    fn upstream_auth_statuses_map_to_unauthorized() {
        for code in [401, 403] {
            let status = status_of(UpstreamError::Status {
                status: code,
                url: "https://colegio.example.com/x".to_string(),
            });
            assert_eq!(status, StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn unparseable_payloads_are_our_failure() {
        let status = status_of(UpstreamError::ParseFailed {
            status: 200,
            url: "https://colegio.example.com/x".to_string(),
            source: anyhow::anyhow!("expected a string, got null"),
        });
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn invalid_session_is_the_clients_problem() {
        let status = status_of(UpstreamError::InvalidSession("login page".to_string()));
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}

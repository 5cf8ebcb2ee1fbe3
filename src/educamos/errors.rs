//! Error types for the Educamos upstream client.

/// Failures talking to, or making sense of, the Educamos platform.
///
/// `InvalidSession` is deliberately its own variant: Educamos answers an
/// expired session with an HTTP 200 login page, so the only reliable signal
/// is a missing structural anchor in an otherwise "successful" response.
/// Handlers map it to 401 so the UI can clear the stored credential.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("Educamos session is invalid or expired: {0}")]
    InvalidSession(String),
    #[error("Educamos returned HTTP {status}")]
    Status { status: u16, url: String },
    #[error("Failed to parse response")]
    ParseFailed {
        status: u16,
        url: String,
        #[source]
        source: anyhow::Error,
    },
    #[error(transparent)]
    RequestFailed(#[from] anyhow::Error),
}

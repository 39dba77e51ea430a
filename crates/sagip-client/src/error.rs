//! HTTP client error types.

use thiserror::Error;

/// Why a session was ended by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiredReason {
    /// A 401 arrived and no refresh token was stored.
    NoRefreshToken,
    /// The refresh endpoint rejected the refresh token or could not be reached.
    RefreshFailed,
}

impl std::fmt::Display for ExpiredReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExpiredReason::NoRefreshToken => f.write_str("no refresh token"),
            ExpiredReason::RefreshFailed => f.write_str("token refresh failed"),
        }
    }
}

/// Errors that can occur when making API requests.
#[derive(Error, Debug)]
pub enum RequestError {
    /// The request could not be sent or no response arrived.
    #[error("Network error: {0}")]
    Network(String),

    /// The request timed out.
    #[error("Request timed out")]
    Timeout,

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Non-2xx response.
    #[error("HTTP {status}: {message}")]
    Http {
        status: u16,
        message: String,
        payload: Option<serde_json::Value>,
    },

    /// The session could not be renewed and has been cleared.
    #[error("Session expired: {0}")]
    SessionExpired(ExpiredReason),

    /// Failed to parse the response body.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Failed to encode the request body.
    #[error("JSON error: {0}")]
    Json(String),

    /// Session store failure.
    #[error("Session error: {0}")]
    Session(#[from] sagip_session::SessionError),
}

impl RequestError {
    /// HTTP status, for HTTP errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Server error payload, for HTTP errors with a JSON body.
    pub fn payload(&self) -> Option<&serde_json::Value> {
        match self {
            RequestError::Http { payload, .. } => payload.as_ref(),
            _ => None,
        }
    }

    /// Check if the user has to sign in again.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, RequestError::SessionExpired(_))
    }
}

impl From<serde_json::Error> for RequestError {
    fn from(e: serde_json::Error) -> Self {
        RequestError::Json(e.to_string())
    }
}

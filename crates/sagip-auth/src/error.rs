//! Authentication errors.

use sagip_client::{server_message, RequestError};
use serde_json::Value;
use thiserror::Error;

/// Authentication error type.
#[derive(Error, Debug)]
pub enum AuthError {
    /// The server refused the request.
    #[error("{message}")]
    Rejected {
        /// Message suitable for display.
        message: String,
        /// Server error payload, including field errors.
        payload: Option<Value>,
    },

    /// The request never got a usable answer.
    #[error("request failed: {0}")]
    Request(#[from] RequestError),

    /// Session store failure.
    #[error("session error: {0}")]
    Session(#[from] sagip_session::SessionError),
}

impl AuthError {
    /// Turn a server rejection into [`AuthError::Rejected`].
    ///
    /// Other request failures are kept as they are.
    pub(crate) fn from_response(err: RequestError, fallback: &str) -> Self {
        match err {
            RequestError::Http { payload, .. } => AuthError::Rejected {
                message: payload
                    .as_ref()
                    .and_then(server_message)
                    .unwrap_or_else(|| fallback.to_string()),
                payload,
            },
            other => AuthError::Request(other),
        }
    }

    /// Server payload, for rejections.
    pub fn payload(&self) -> Option<&Value> {
        match self {
            AuthError::Rejected { payload, .. } => payload.as_ref(),
            _ => None,
        }
    }

    /// Check if the user has to sign in again.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, AuthError::Request(e) if e.is_session_expired())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rejection_uses_server_message() {
        let err = AuthError::from_response(
            RequestError::Http {
                status: 401,
                message: "HTTP 401".into(),
                payload: Some(json!({"detail": "No active account found with the given credentials"})),
            },
            "Login failed",
        );
        assert_eq!(
            err.to_string(),
            "No active account found with the given credentials"
        );
        assert!(err.payload().is_some());
    }

    #[test]
    fn test_rejection_without_payload_uses_fallback() {
        let err = AuthError::from_response(
            RequestError::Http {
                status: 502,
                message: "Bad Gateway".into(),
                payload: None,
            },
            "Registration failed",
        );
        assert_eq!(err.to_string(), "Registration failed");
    }

    #[test]
    fn test_transport_errors_are_not_rejections() {
        let err = AuthError::from_response(RequestError::Timeout, "Login failed");
        assert!(matches!(err, AuthError::Request(RequestError::Timeout)));
    }
}

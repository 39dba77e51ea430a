//! Error types for Sagip.

use thiserror::Error;

/// Errors that can occur anywhere in the client.
#[derive(Error, Debug)]
pub enum SagipError {
    /// Local storage failed.
    #[error("Storage error: {0}")]
    Store(#[from] sagip_store::StoreError),

    /// Session could not be read or written.
    #[error("Session error: {0}")]
    Session(#[from] sagip_session::SessionError),

    /// Navigation failed.
    #[error("Route error: {0}")]
    Route(#[from] sagip_router::RouteError),

    /// API request failed.
    #[error("Request error: {0}")]
    Request(#[from] sagip_client::RequestError),

    /// Sign-in, registration or profile lookup failed.
    #[error(transparent)]
    Auth(#[from] sagip_auth::AuthError),

    /// Evacuation data error.
    #[error(transparent)]
    Evac(#[from] sagip_evac::EvacError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SagipError {
    /// Check if the user has to sign in again.
    pub fn is_session_expired(&self) -> bool {
        match self {
            SagipError::Request(e) => e.is_session_expired(),
            SagipError::Auth(e) => e.is_session_expired(),
            SagipError::Evac(sagip_evac::EvacError::Request(e)) => e.is_session_expired(),
            _ => false,
        }
    }
}

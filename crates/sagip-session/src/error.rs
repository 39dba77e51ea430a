//! Session errors.

use thiserror::Error;

/// Session error type.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Underlying store failed.
    #[error("session store error: {0}")]
    Store(#[from] sagip_store::StoreError),

    /// Token is not a decodable JWT.
    #[error("malformed token: {0}")]
    MalformedToken(String),
}

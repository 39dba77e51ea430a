//! Evacuation domain errors.

use thiserror::Error;

/// Evacuation domain error type.
#[derive(Error, Debug)]
pub enum EvacError {
    /// A center must hold at least one person.
    #[error("invalid capacity for {name}: {capacity}")]
    InvalidCapacity { name: String, capacity: u32 },

    /// API request failed.
    #[error("request failed: {0}")]
    Request(#[from] sagip_client::RequestError),
}

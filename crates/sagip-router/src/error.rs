//! Routing errors.

use thiserror::Error;

/// Errors that can occur while resolving a navigation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// No route matches the path.
    #[error("Route not found: {0}")]
    NotFound(String),

    /// Redirects did not settle.
    #[error("Redirect loop while navigating to {path} after {hops} hops")]
    RedirectLoop { path: String, hops: usize },
}

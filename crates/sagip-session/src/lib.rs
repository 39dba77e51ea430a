//! Session management for Sagip.
//!
//! Holds the client-side view of who is signed in: the authentication
//! flag, the access/refresh token pair and the cached user profile. All
//! reads and writes go through [`SessionContext`], which is handed to the
//! route guard, the HTTP client and the auth service.

mod claims;
mod context;
mod error;
mod profile;
mod role;
mod session;

pub use claims::TokenClaims;
pub use context::SessionContext;
pub use error::SessionError;
pub use profile::UserProfile;
pub use role::Role;
pub use session::{keys, Session, TokenPair};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Role, Session, SessionContext, SessionError, TokenPair, UserProfile};
}

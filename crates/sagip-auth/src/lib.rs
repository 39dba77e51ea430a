//! Authentication for Sagip.
//!
//! Signs users in against the backend's JWT endpoints, keeps the issued
//! tokens and the user's profile in the shared session, and signs out
//! locally.
//!
//! # Example
//!
//! ```rust,ignore
//! use sagip_auth::{AuthService, Credentials};
//!
//! let auth = AuthService::new(client);
//! let session = auth.login(&Credentials::new("ana@example.com", "secret")).await?;
//! println!("signed in as {}", session.role());
//! ```

mod error;
mod service;
mod types;

pub use error::AuthError;
pub use service::{AuthService, LOGIN_PATH, PROFILE_PATH, REGISTER_PATH};
pub use types::{Credentials, ProfileRecord, Registration};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{AuthError, AuthService, Credentials, Registration};
}

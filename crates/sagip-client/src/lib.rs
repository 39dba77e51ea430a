//! HTTP client for the Sagip API.
//!
//! Every request carries the access token from the shared session. When the
//! server answers 401 the client trades the refresh token for a new access
//! token and resends the request once. If there is no refresh token, or the
//! refresh is rejected, the session is cleared and registered hooks are
//! told so the user can be sent back to the login page.
//!
//! # Example
//!
//! ```rust,ignore
//! use sagip_client::{ApiClient, ClientConfig};
//!
//! let client = ApiClient::new(ClientConfig::default(), session)?;
//! client.on_session_expired(|notice| eprintln!("signed out: {}", notice.reason));
//!
//! let profile: serde_json::Value = client.get_json("user/profile/").await?;
//! ```

mod client;
mod error;
mod request;
mod response;
mod transport;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use client::{ApiClient, ClientConfig, SessionExpired, DEFAULT_BASE_URL, DEFAULT_REFRESH_PATH};
pub use error::{ExpiredReason, RequestError};
pub use request::{join_url, ApiRequest, Method};
pub use response::{server_message, Response};
pub use transport::{ReqwestTransport, Transport};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{ApiClient, ApiRequest, ClientConfig, Method, RequestError, Response};
}

//! Sagip disaster-response client.
//!
//! Wires the session store, the authenticated API client, the auth service,
//! the route guard and the evacuation services into one [`SagipApp`].
//!
//! # Architecture
//!
//! - `sagip-store`: key-value persistence (memory or a JSON file)
//! - `sagip-session`: the signed-in user's tokens, role and profile
//! - `sagip-router`: route table and navigation guard
//! - `sagip-client`: HTTP with bearer tokens and refresh-on-401
//! - `sagip-auth`: login, registration, logout
//! - `sagip-evac`: evacuation centers, logs, hazards, analytics
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use sagip_core::prelude::*;
//!
//! let app = SagipApp::builder(AppConfig::default()).build()?;
//! app.auth().login(&Credentials::new("staff@example.com", "secret")).await?;
//!
//! let landing = app.navigate("/auth/login")?;
//! println!("home: {}", landing.path);
//! ```

pub mod prelude;
mod app;
mod error;

pub use app::*;
pub use error::*;

pub use sagip_auth as auth;
pub use sagip_client as client;
pub use sagip_evac as evac;
pub use sagip_router as router;
pub use sagip_session as session;
pub use sagip_store as store;

//! Routing and access control for Sagip.
//!
//! The route table is a static hierarchy split by role area:
//!
//! ```text
//! /                   -> /auth/login
//! /auth/login
//! /auth/register
//! /user/*             requires auth, citizen
//! /staff/*            requires auth, staff
//! /admin/*            requires auth, admin
//! ```
//!
//! Every navigation is run through [`decide`], a pure function of the
//! matched route's metadata and the cached [`Session`](sagip_session::Session).
//!
//! # Usage
//!
//! ```rust,ignore
//! use sagip_router::prelude::*;
//!
//! let navigator = Navigator::new(RouteTable::default_routes());
//! let nav = navigator.navigate("/admin/centers", &session)?;
//! println!("landed on {}", nav.path);
//! ```

mod error;
mod guard;
mod navigator;
pub mod prelude;
mod route;

pub use error::RouteError;
pub use guard::{decide, is_auth_route, GuardDecision, LOGIN_PATH};
pub use navigator::{Hop, HopReason, Navigation, Navigator, MAX_HOPS};
pub use route::{normalize_path, RouteDescriptor, RouteEntry, RouteMatch, RouteMeta, RouteTable};

//! Prelude for convenient imports.
//!
//! ```rust,ignore
//! use sagip_router::prelude::*;
//! ```

pub use crate::{
    decide, GuardDecision, Navigation, Navigator, RouteDescriptor, RouteError, RouteMeta,
    RouteTable,
};

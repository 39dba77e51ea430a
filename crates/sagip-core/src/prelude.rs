//! Prelude for convenient imports.
//!
//! ```rust,ignore
//! use sagip_core::prelude::*;
//! ```

pub use sagip_auth::prelude::*;
pub use sagip_client::prelude::*;
pub use sagip_evac::prelude::*;
pub use sagip_router::prelude::*;
pub use sagip_session::prelude::*;
pub use sagip_store::prelude::*;

pub use crate::{AppConfig, SagipApp, SagipError};

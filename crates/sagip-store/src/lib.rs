//! Local key-value persistence for Sagip.
//!
//! The session layer treats storage as an opaque string-to-string map, the
//! same shape as a browser's local storage. Two backends are provided:
//!
//! - [`MemoryStore`] keeps everything in process (tests, embedded use)
//! - [`FileStore`] keeps a single JSON object on disk (the CLI)
//!
//! # Example
//!
//! ```rust,ignore
//! use sagip_store::{MemoryStore, Store};
//!
//! let store = Store::new(MemoryStore::new());
//! store.set("isAuthenticated", "true")?;
//! store.set_json("userData", &profile)?;
//!
//! let profile: Option<UserProfile> = store.get_json("userData")?;
//! ```

mod error;
mod file;
mod kv;

pub use error::StoreError;
pub use file::FileStore;
pub use kv::{KvStore, MemoryStore, Store};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{FileStore, KvStore, MemoryStore, Store, StoreError};
}

//! Type-safe local session cache for menuflow clients.
//!
//! Wraps a pluggable key-value backend (browser storage, a file, or plain
//! memory) with automatic JSON serialization, plus a versioned
//! [`Session`] store for per-visitor data such as the cart.
//!
//! # Example
//!
//! ```rust
//! use menuflow_cache::{Cache, MemoryBackend};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Table {
//!     number: u32,
//! }
//!
//! let cache = Cache::new(MemoryBackend::new());
//! cache.set("table:pizzaria", &Table { number: 7 }).unwrap();
//!
//! let table: Option<Table> = cache.get("table:pizzaria").unwrap();
//! assert_eq!(table, Some(Table { number: 7 }));
//! ```

mod error;
mod kv;
mod session;

pub use error::CacheError;
pub use kv::{Cache, KvBackend, MemoryBackend};
pub use session::{Session, SessionData, SessionId};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Cache, CacheError, KvBackend, MemoryBackend, Session, SessionId};
}

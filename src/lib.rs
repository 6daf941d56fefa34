//! # agama
//!
//! A (very) Generic App to Manage Anything: a small shared list of text
//! items served over HTTP.
//!
//! The item store enforces the data invariants:
//!
//! - **Unique values**: no two items share the same text
//! - **Bounded size**: at most 999 characters per item, at most 100 items
//! - **Stable ids**: assigned on creation, never reused
//! - **Lazy seeding**: an empty store gets two sample items on first use
//!
//! ## Backends
//!
//! - [`SqliteStore`]: SQLite database file or private in-memory database
//! - [`MySqlStore`]: MySQL server
//! - [`MemoryStore`]: In-memory store (testing and development)
//!
//! [`connect`] picks the backend named by a [`DatabaseLocation`]; the
//! `agama` binary uses it with `AGAMA_DATABASE_URI`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use agama::{ItemStore, MemoryStore};
//!
//! #[tokio::main]
//! async fn main() -> agama::Result<()> {
//!     let store = MemoryStore::new();
//!
//!     let item = store.add("milk").await?;
//!     let item = store.swap_state(item.id).await?;
//!     println!("{} is now in state {:?}", item.value, item.state);
//!
//!     for item in store.list_all().await? {
//!         println!("{}: {}", item.id, item.value);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Serving
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use agama::{AppState, ItemStore, Renderer, SqliteStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = SqliteStore::open("agama.sqlite3").await?;
//!     store.ensure_initialized().await?;
//!
//!     let state = AppState::new(Arc::new(store), Renderer::for_local_host()?);
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:5000").await?;
//!     agama::web::serve(listener, state).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod memory;
pub mod mysql;
pub mod render;
pub mod sqlite;
pub mod store;
pub mod web;

/// Crate version, shown in the page footer.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Re-export main types
pub use config::{Config, ConfigError, DatabaseLocation};
pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use mysql::MySqlStore;
pub use render::Renderer;
pub use sqlite::SqliteStore;
pub use store::{Item, ItemId, ItemState, ItemStore, MAX_ITEMS, MAX_VALUE_LENGTH};
pub use web::{build_router, AppState};

use std::sync::Arc;

/// Open the store backend for a parsed connection string.
///
/// SQLite stores are opened eagerly. The MySQL pool connects on first use,
/// so call [`ItemStore::ensure_initialized`] to surface connection errors.
pub async fn connect(location: &DatabaseLocation) -> Result<Arc<dyn ItemStore>> {
    let store: Arc<dyn ItemStore> = match location {
        DatabaseLocation::Memory => Arc::new(SqliteStore::in_memory().await?),
        DatabaseLocation::File(path) => Arc::new(SqliteStore::open(path).await?),
        DatabaseLocation::MySql(url) => Arc::new(MySqlStore::connect(url)?),
    };
    Ok(store)
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{Result, StoreError};
    pub use crate::memory::MemoryStore;
    pub use crate::mysql::MySqlStore;
    pub use crate::sqlite::SqliteStore;
    pub use crate::store::{Item, ItemId, ItemState, ItemStore};
}

//! ItemStore trait - the core abstraction for all storage backends.
//!
//! Defines:
//! - `Item`: id + value + two-valued state
//! - Limits: value length, item count
//! - Seed items written on first initialization
//! - Core operations: ensure_initialized, list_all, get, add, delete_by_id, swap_state
//!
//! Every backend validates `add` in the same order: value size, then store
//! capacity, then uniqueness. Overlapping violations therefore always report
//! the first failing check.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

/// Maximum item value length, in characters.
pub const MAX_VALUE_LENGTH: usize = 999;

/// Maximum number of items the store holds.
pub const MAX_ITEMS: usize = 100;

/// Items written when an empty store is initialized, in insertion order.
pub const SEED_ITEMS: [(&str, ItemState); 2] = [
    (
        "A pre-created item with no particular meaning",
        ItemState::Done,
    ),
    ("Another even less meaningful item", ItemState::Open),
];

/// Store-assigned item identifier.
pub type ItemId = i64;

/// The two states an item toggles between.
///
/// Serialized as the bare integer (`0` or `1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum ItemState {
    #[default]
    Open = 0,
    Done = 1,
}

impl ItemState {
    /// The other state.
    pub fn toggled(self) -> Self {
        match self {
            ItemState::Open => ItemState::Done,
            ItemState::Done => ItemState::Open,
        }
    }

    pub fn as_i64(self) -> i64 {
        self as i64
    }

    /// Interpret a stored integer. Anything non-zero counts as `Done`.
    pub fn from_i64(raw: i64) -> Self {
        if raw == 0 {
            ItemState::Open
        } else {
            ItemState::Done
        }
    }
}

impl From<ItemState> for u8 {
    fn from(state: ItemState) -> Self {
        state as u8
    }
}

impl TryFrom<u8> for ItemState {
    type Error = String;

    fn try_from(raw: u8) -> std::result::Result<Self, Self::Error> {
        match raw {
            0 => Ok(ItemState::Open),
            1 => Ok(ItemState::Done),
            other => Err(format!("invalid item state: {}", other)),
        }
    }
}

/// A stored item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Unique id, assigned on creation and never reused.
    pub id: ItemId,
    /// The item text. Unique across the store.
    pub value: String,
    /// Current state. The only mutable field.
    pub state: ItemState,
}

/// Validate the shape of a value about to be added.
pub fn validate_value(value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(StoreError::EmptyValue);
    }
    if value.chars().count() > MAX_VALUE_LENGTH {
        return Err(StoreError::TooLarge);
    }
    Ok(())
}

/// Check that one more item fits next to `current` existing items.
pub fn check_capacity(current: usize) -> Result<()> {
    if current >= MAX_ITEMS {
        return Err(StoreError::TooMany);
    }
    Ok(())
}

/// The core item storage trait.
///
/// All storage backends (SQLite, memory) implement this trait. The web layer
/// depends on this trait, not on a specific implementation.
///
/// Every operation initializes the store on first use, so callers may skip
/// [`ItemStore::ensure_initialized`]; calling it up front just moves the cost
/// to startup.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Create the backing structure and the seed items if they are missing.
    ///
    /// Idempotent: seeds are written exactly once per store.
    async fn ensure_initialized(&self) -> Result<()>;

    /// All items in creation order.
    async fn list_all(&self) -> Result<Vec<Item>>;

    /// Get an item by id.
    ///
    /// Returns `None` if no item has that id.
    async fn get(&self, id: ItemId) -> Result<Option<Item>>;

    /// Add a new item in the `Open` state.
    ///
    /// Fails with `EmptyValue`/`TooLarge`, then `TooMany`, then `Duplicate`.
    async fn add(&self, value: &str) -> Result<Item>;

    /// Delete an item.
    ///
    /// Returns `Ok(())` if the item was deleted or didn't exist.
    async fn delete_by_id(&self, id: ItemId) -> Result<()>;

    /// Flip the state of an item and return the updated item.
    ///
    /// Returns `NotFound` if no item has that id.
    async fn swap_state(&self, id: ItemId) -> Result<Item>;

    /// Number of items currently stored.
    async fn count(&self) -> Result<usize> {
        Ok(self.list_all().await?.len())
    }

    /// Check if an item exists.
    async fn exists(&self, id: ItemId) -> Result<bool> {
        Ok(self.get(id).await?.is_some())
    }
}

//! In-memory item store implementation.
//!
//! This implementation is NOT durable - data is lost on process exit.
//! Use for testing and development only.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::store::{
    check_capacity, validate_value, Item, ItemId, ItemState, ItemStore, SEED_ITEMS,
};

#[derive(Default)]
struct Inner {
    initialized: bool,
    /// Keyed by id, so iteration order is creation order.
    items: BTreeMap<ItemId, Item>,
    /// Last id handed out. Never decremented.
    last_id: ItemId,
}

impl Inner {
    fn seed_if_needed(&mut self) {
        if self.initialized {
            return;
        }
        for (value, state) in SEED_ITEMS {
            self.insert(value.to_string(), state);
        }
        self.initialized = true;
        debug!("Memory store seeded with {} items", SEED_ITEMS.len());
    }

    fn insert(&mut self, value: String, state: ItemState) -> Item {
        self.last_id += 1;
        let item = Item {
            id: self.last_id,
            value,
            state,
        };
        self.items.insert(item.id, item.clone());
        item
    }
}

/// In-memory implementation of ItemStore.
///
/// Uses a BTreeMap for ordered iteration and RwLock for concurrency. Every
/// mutation runs its checks and its write under one write guard.
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    /// Create a new, uninitialized in-memory store.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner::default())),
        }
    }

    /// Get the number of items in the store.
    pub fn len(&self) -> usize {
        self.inner.read().items.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.read().items.is_empty()
    }

    /// Whether the seed items have been written.
    pub fn is_initialized(&self) -> bool {
        self.inner.read().initialized
    }

    /// Run `f` against initialized contents under the write guard.
    fn with_initialized<T>(&self, f: impl FnOnce(&mut Inner) -> T) -> T {
        let mut inner = self.inner.write();
        inner.seed_if_needed();
        f(&mut inner)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ItemStore for MemoryStore {
    async fn ensure_initialized(&self) -> Result<()> {
        if self.is_initialized() {
            return Ok(());
        }
        self.with_initialized(|_| ());
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Item>> {
        self.ensure_initialized().await?;
        Ok(self.inner.read().items.values().cloned().collect())
    }

    async fn get(&self, id: ItemId) -> Result<Option<Item>> {
        self.ensure_initialized().await?;
        Ok(self.inner.read().items.get(&id).cloned())
    }

    async fn count(&self) -> Result<usize> {
        self.ensure_initialized().await?;
        Ok(self.len())
    }

    async fn add(&self, value: &str) -> Result<Item> {
        self.with_initialized(|inner| {
            validate_value(value)?;
            check_capacity(inner.items.len())?;
            if inner.items.values().any(|item| item.value == value) {
                return Err(StoreError::Duplicate(value.to_string()));
            }

            let item = inner.insert(value.to_string(), ItemState::Open);
            debug!(id = item.id, "Added item");
            Ok(item)
        })
    }

    async fn delete_by_id(&self, id: ItemId) -> Result<()> {
        self.with_initialized(|inner| {
            if inner.items.remove(&id).is_some() {
                debug!(id, "Deleted item");
            }
        });
        Ok(())
    }

    async fn swap_state(&self, id: ItemId) -> Result<Item> {
        self.with_initialized(|inner| {
            let item = inner.items.get_mut(&id).ok_or(StoreError::NotFound(id))?;
            item.state = item.state.toggled();
            Ok(item.clone())
        })
    }
}

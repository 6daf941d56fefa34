//! SQLite item store implementation.
//!
//! Features:
//! - WAL mode for concurrent readers
//! - One transaction per mutation, writers serialized by an in-process lock
//! - Schema and seed rows created on first use, exactly once per database

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{Sqlite, Transaction};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, info};

use crate::error::{Result, StoreError};
use crate::store::{
    check_capacity, validate_value, Item, ItemId, ItemState, ItemStore, MAX_VALUE_LENGTH,
    SEED_ITEMS,
};

type ItemRow = (i64, String, i64);

const SELECT_ITEM: &str = "SELECT id, value, COALESCE(state, 0) FROM item";

/// SQLite implementation of ItemStore.
///
/// Uses WAL mode for performance and durability.
pub struct SqliteStore {
    pool: SqlitePool,
    write_lock: Mutex<()>,
    initialized: OnceCell<()>,
}

impl SqliteStore {
    /// Open or create a SQLite store at the given path.
    ///
    /// The schema is created lazily, see [`ItemStore::ensure_initialized`].
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening SQLite store at {:?}", path);

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(30));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::ConnectionError(e.to_string()))?;

        Ok(Self::with_pool(pool))
    }

    /// Create an in-memory SQLite store (for testing).
    ///
    /// The pool keeps its single connection alive forever; closing it would
    /// discard the database.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| StoreError::ConnectionError(e.to_string()))?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::ConnectionError(e.to_string()))?;

        Ok(Self::with_pool(pool))
    }

    fn with_pool(pool: SqlitePool) -> Self {
        Self {
            pool,
            write_lock: Mutex::new(()),
            initialized: OnceCell::new(),
        }
    }

    /// Create the `item` table and seed it, unless the table already exists.
    async fn init_schema(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut tx = self.pool.begin().await?;

        let existing: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'item'",
        )
        .fetch_one(&mut *tx)
        .await?;

        if existing > 0 {
            tx.commit().await?;
            debug!("SQLite schema already present");
            return Ok(());
        }

        info!("Initializing the database...");
        sqlx::query(&format!(
            r#"
            CREATE TABLE item (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                value VARCHAR({}) NOT NULL UNIQUE,
                state INTEGER DEFAULT 0
            )
            "#,
            MAX_VALUE_LENGTH
        ))
        .execute(&mut *tx)
        .await?;

        for (value, state) in SEED_ITEMS {
            Self::insert(&mut tx, value, state).await?;
        }

        tx.commit().await?;
        debug!("SQLite schema initialized with {} seed items", SEED_ITEMS.len());
        Ok(())
    }

    async fn insert(
        tx: &mut Transaction<'_, Sqlite>,
        value: &str,
        state: ItemState,
    ) -> Result<Item> {
        let result = sqlx::query("INSERT INTO item (value, state) VALUES (?, ?)")
            .bind(value)
            .bind(state.as_i64())
            .execute(&mut **tx)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db) = &e {
                    if db.is_unique_violation() {
                        return StoreError::Duplicate(value.to_string());
                    }
                }
                StoreError::from(e)
            })?;

        Ok(Item {
            id: result.last_insert_rowid(),
            value: value.to_string(),
            state,
        })
    }

    fn row_to_item((id, value, state): ItemRow) -> Item {
        Item {
            id,
            value,
            state: ItemState::from_i64(state),
        }
    }
}

#[async_trait]
impl ItemStore for SqliteStore {
    async fn ensure_initialized(&self) -> Result<()> {
        self.initialized
            .get_or_try_init(|| self.init_schema())
            .await?;
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Item>> {
        self.ensure_initialized().await?;

        let rows: Vec<ItemRow> = sqlx::query_as(&format!("{} ORDER BY id", SELECT_ITEM))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Self::row_to_item).collect())
    }

    async fn get(&self, id: ItemId) -> Result<Option<Item>> {
        self.ensure_initialized().await?;

        let row: Option<ItemRow> = sqlx::query_as(&format!("{} WHERE id = ?", SELECT_ITEM))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Self::row_to_item))
    }

    async fn count(&self) -> Result<usize> {
        self.ensure_initialized().await?;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM item")
            .fetch_one(&self.pool)
            .await?;

        Ok(count as usize)
    }

    async fn add(&self, value: &str) -> Result<Item> {
        self.ensure_initialized().await?;
        validate_value(value)?;

        let _guard = self.write_lock.lock().await;
        let mut tx = self.pool.begin().await?;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM item")
            .fetch_one(&mut *tx)
            .await?;
        check_capacity(count as usize)?;

        let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM item WHERE value = ?")
            .bind(value)
            .fetch_optional(&mut *tx)
            .await?;
        if existing.is_some() {
            return Err(StoreError::Duplicate(value.to_string()));
        }

        let item = Self::insert(&mut tx, value, ItemState::Open).await?;
        tx.commit().await?;

        debug!(id = item.id, "Inserted item");
        Ok(item)
    }

    async fn delete_by_id(&self, id: ItemId) -> Result<()> {
        self.ensure_initialized().await?;

        let _guard = self.write_lock.lock().await;
        let result = sqlx::query("DELETE FROM item WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        debug!(id, rows = result.rows_affected(), "Deleted item");
        Ok(())
    }

    async fn swap_state(&self, id: ItemId) -> Result<Item> {
        self.ensure_initialized().await?;

        let _guard = self.write_lock.lock().await;
        let mut tx = self.pool.begin().await?;

        let row: Option<ItemRow> = sqlx::query_as(&format!("{} WHERE id = ?", SELECT_ITEM))
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let mut item = row.map(Self::row_to_item).ok_or(StoreError::NotFound(id))?;

        item.state = item.state.toggled();
        sqlx::query("UPDATE item SET state = ? WHERE id = ?")
            .bind(item.state.as_i64())
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::suite;
    use crate::store::MAX_ITEMS;
    use std::sync::Arc;

    async fn store() -> SqliteStore {
        SqliteStore::in_memory().await.unwrap()
    }

    #[tokio::test]
    async fn test_sqlite_seeds_on_first_use() {
        suite::seeds_on_first_use(&store().await).await;
    }

    #[tokio::test]
    async fn test_sqlite_lazy_initialization() {
        suite::lazy_initialization(&store().await).await;
    }

    #[tokio::test]
    async fn test_sqlite_initialization_is_idempotent() {
        suite::initialization_is_idempotent(&store().await).await;
    }

    #[tokio::test]
    async fn test_sqlite_end_to_end() {
        suite::end_to_end(&store().await).await;
    }

    #[tokio::test]
    async fn test_sqlite_duplicate_rejected() {
        suite::duplicate_rejected(&store().await).await;
    }

    #[tokio::test]
    async fn test_sqlite_size_boundary() {
        suite::size_boundary(&store().await).await;
    }

    #[tokio::test]
    async fn test_sqlite_capacity_limit() {
        suite::capacity_limit(&store().await).await;
    }

    #[tokio::test]
    async fn test_sqlite_validation_order() {
        suite::validation_order(&store().await).await;
    }

    #[tokio::test]
    async fn test_sqlite_swap_twice_restores() {
        suite::swap_twice_restores(&store().await).await;
    }

    #[tokio::test]
    async fn test_sqlite_swap_missing_is_not_found() {
        suite::swap_missing_is_not_found(&store().await).await;
    }

    #[tokio::test]
    async fn test_sqlite_delete_is_idempotent() {
        suite::delete_is_idempotent(&store().await).await;
    }

    #[tokio::test]
    async fn test_sqlite_seeds_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agama.sqlite3");

        {
            let store = SqliteStore::open(&path).await.unwrap();
            store.ensure_initialized().await.unwrap();
            store.add("milk").await.unwrap();
            store.delete_by_id(3).await.unwrap();
            store.pool.close().await;
        }

        let store = SqliteStore::open(&path).await.unwrap();
        store.ensure_initialized().await.unwrap();
        let items = store.list_all().await.unwrap();
        assert_eq!(items.len(), 2);

        // AUTOINCREMENT keeps id 3 retired across reopen.
        let bread = store.add("bread").await.unwrap();
        assert_eq!(bread.id, 4);
    }

    #[tokio::test]
    async fn test_sqlite_unique_constraint_maps_to_duplicate() {
        let store = store().await;
        store.ensure_initialized().await.unwrap();

        // Bypass the pre-insert check to hit the table constraint directly.
        let mut tx = store.pool.begin().await.unwrap();
        let err = SqliteStore::insert(&mut tx, SEED_ITEMS[1].0, ItemState::Open)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_sqlite_concurrent_adds_respect_capacity() {
        let store = Arc::new(store().await);
        store.ensure_initialized().await.unwrap();

        let mut handles = Vec::new();
        for i in 0..(MAX_ITEMS * 2) {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.add(&format!("concurrent {}", i % (MAX_ITEMS + 20))).await
            }));
        }
        for handle in handles {
            let _ = handle.await.unwrap();
        }

        assert_eq!(store.count().await.unwrap(), MAX_ITEMS);
    }
}

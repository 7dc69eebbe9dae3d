//! Store handle over the `items` table.
//!
//! # Design
//! `Store` wraps a `sqlx` connection pool and is cloned into every request
//! handler; there is no ambient connection state. Each operation is exactly
//! one SQL statement, so a record is either fully written or absent.
//!
//! The pool uses the `Any` driver: `mysql://` DSNs in deployment,
//! `sqlite:` DSNs for tests and local runs. Both accept `?` placeholders.
//!
//! Two backend quirks surface through `Any`. SQLite never reports an insert
//! id, so the id is read back with `last_insert_rowid()` on the connection
//! that ran the insert. MySQL sends `TEXT` columns as blobs, which `Any` will
//! not decode into `String`, so `description` is cast to a character type in
//! every read.

use std::time::Duration;

use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;
use thiserror::Error;
use tracing::debug;

use crate::model::{Item, NewItem};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error("store did not report an id for the inserted row")]
    MissingId,
}

/// Pool settings applied at connect time.
#[derive(Debug, Clone)]
pub struct ConnectOpts {
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl Default for ConnectOpts {
    fn default() -> Self {
        Self {
            max_connections: 5,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

const ITEM_COLUMNS: &str = "id, name, CAST(description AS CHAR(1000)) AS description, quantity";

#[derive(Debug, Clone)]
pub struct Store {
    pool: AnyPool,
}

impl Store {
    /// Open the pool once at startup. Fails fast when the store is unreachable.
    pub async fn connect(dsn: &str, opts: &ConnectOpts) -> Result<Self, StoreError> {
        sqlx::any::install_default_drivers();
        let pool = AnyPoolOptions::new()
            .max_connections(opts.max_connections)
            .acquire_timeout(opts.acquire_timeout)
            .connect(dsn)
            .await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    pub async fn insert_item(&self, item: &NewItem) -> Result<Item, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let result = sqlx::query("INSERT INTO items (name, description, quantity) VALUES (?, ?, ?)")
            .bind(&item.name)
            .bind(&item.description)
            .bind(item.quantity)
            .execute(&mut *conn)
            .await?;
        let id = match result.last_insert_id() {
            Some(id) => id,
            // sqlite: rowid is per connection, so ask the one that inserted
            None => sqlx::query_scalar::<_, i64>("SELECT last_insert_rowid()")
                .fetch_optional(&mut *conn)
                .await?
                .ok_or(StoreError::MissingId)?,
        };
        debug!(id, "item inserted");
        Ok(Item {
            id,
            name: item.name.clone(),
            description: item.description.clone(),
            quantity: item.quantity,
        })
    }

    pub async fn find_item(&self, id: i64) -> Result<Option<Item>, StoreError> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = ?");
        let item = sqlx::query_as::<_, Item>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(item)
    }

    pub async fn list_items(&self) -> Result<Vec<Item>, StoreError> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM items ORDER BY id");
        let items = sqlx::query_as::<_, Item>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    /// Wait for in-flight statements and close every connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> Store {
        let opts = ConnectOpts {
            max_connections: 1,
            ..ConnectOpts::default()
        };
        let store = Store::connect("sqlite::memory:", &opts).await.unwrap();
        sqlx::query(
            "CREATE TABLE items (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL, description TEXT, quantity INTEGER)",
        )
        .execute(store.pool())
        .await
        .unwrap();
        store
    }

    fn new_item(name: &str) -> NewItem {
        NewItem {
            name: name.to_string(),
            description: None,
            quantity: None,
        }
    }

    #[tokio::test]
    async fn insert_assigns_increasing_ids() {
        let store = store().await;
        let first = store.insert_item(&new_item("widget")).await.unwrap();
        let second = store.insert_item(&new_item("gadget")).await.unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn find_returns_what_was_inserted() {
        let store = store().await;
        let created = store
            .insert_item(&NewItem {
                name: "widget".to_string(),
                description: Some("blue".to_string()),
                quantity: Some(7),
            })
            .await
            .unwrap();
        let found = store.find_item(created.id).await.unwrap();
        assert_eq!(found, Some(created));
    }

    #[tokio::test]
    async fn returned_id_matches_stored_row() {
        let store = store().await;
        let created = store.insert_item(&new_item("widget")).await.unwrap();
        let stored: i64 = sqlx::query_scalar("SELECT id FROM items WHERE name = ?")
            .bind("widget")
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(created.id, stored);
    }

    #[tokio::test]
    async fn description_reads_back_as_text() {
        let store = store().await;
        let long = "x".repeat(1000);
        let created = store
            .insert_item(&NewItem {
                name: "widget".to_string(),
                description: Some(long.clone()),
                quantity: None,
            })
            .await
            .unwrap();
        let listed = store.list_items().await.unwrap();
        assert_eq!(listed, vec![created]);
        assert_eq!(listed[0].description.as_deref(), Some(long.as_str()));
    }

    #[tokio::test]
    async fn find_missing_is_none() {
        let store = store().await;
        assert_eq!(store.find_item(999).await.unwrap(), None);
    }

    #[tokio::test]
    async fn list_is_ordered_by_id() {
        let store = store().await;
        for name in ["c", "a", "b"] {
            store.insert_item(&new_item(name)).await.unwrap();
        }
        let names: Vec<_> = store
            .list_items()
            .await
            .unwrap()
            .into_iter()
            .map(|item| (item.id, item.name))
            .collect();
        assert_eq!(
            names,
            vec![(1, "c".to_string()), (2, "a".to_string()), (3, "b".to_string())]
        );
    }

    #[tokio::test]
    async fn closed_pool_reports_error() {
        let store = store().await;
        store.close().await;
        assert!(store.list_items().await.is_err());
    }

    #[tokio::test]
    async fn missing_table_reports_error() {
        let opts = ConnectOpts {
            max_connections: 1,
            ..ConnectOpts::default()
        };
        let store = Store::connect("sqlite::memory:", &opts).await.unwrap();
        let err = store.insert_item(&new_item("widget")).await.unwrap_err();
        assert!(matches!(err, StoreError::Sqlx(_)));
    }
}

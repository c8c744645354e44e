//! SQLite-backed settings store.
//!
//! Desktop stand-in for the mobile client's async key-value store: a single
//! table of string keys to string values. Callers serialize structured state
//! (contact card, cached user, check-in records) to JSON before storing it,
//! so the store itself stays schema-free.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::SettingsStore,
};
use sqlx::{sqlite::SqlitePool, Row};
use std::path::PathBuf;
use tracing::debug;

/// [`SettingsStore`] over a SQLite database file.
pub struct SqliteSettingsStore {
    pool: SqlitePool,
}

impl SqliteSettingsStore {
    /// Open (or create) the store at `db_path`, creating parent directories
    /// as needed.
    pub async fn new(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(BridgeError::Io)?;
        }

        // SQLite URLs want forward slashes, including on Windows.
        let url = format!(
            "sqlite://{}?mode=rwc",
            db_path.to_string_lossy().replace('\\', "/")
        );
        let pool = Self::connect(&url).await?;

        debug!(path = ?db_path, "Settings store opened");
        Ok(Self { pool })
    }

    /// An in-memory store for tests.
    pub async fn in_memory() -> Result<Self> {
        let pool = Self::connect("sqlite::memory:").await?;
        Ok(Self { pool })
    }

    async fn connect(url: &str) -> Result<SqlitePool> {
        let pool = SqlitePool::connect(url)
            .await
            .map_err(|e| BridgeError::OperationFailed(format!("settings db open: {}", e)))?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS settings ( \
                 key TEXT PRIMARY KEY, \
                 value TEXT NOT NULL, \
                 updated_at INTEGER NOT NULL \
             )",
        )
        .execute(&pool)
        .await
        .map_err(|e| BridgeError::OperationFailed(format!("settings schema init: {}", e)))?;

        Ok(pool)
    }

    fn unix_now() -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0)
    }

    fn db_err(context: &str) -> impl FnOnce(sqlx::Error) -> BridgeError + '_ {
        move |e| BridgeError::OperationFailed(format!("{}: {}", context, e))
    }
}

#[async_trait]
impl SettingsStore for SqliteSettingsStore {
    async fn set_string(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO settings (key, value, updated_at) VALUES (?, ?, ?) \
             ON CONFLICT(key) DO UPDATE SET \
                 value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(value)
        .bind(Self::unix_now())
        .execute(&self.pool)
        .await
        .map_err(Self::db_err("settings write"))?;

        debug!(key, "Setting stored");
        Ok(())
    }

    async fn get_string(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(Self::db_err("settings read"))?;

        Ok(row.map(|r| r.get(0)))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM settings WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(Self::db_err("settings delete"))?;

        debug!(key, "Setting deleted");
        Ok(())
    }

    async fn has_key(&self, key: &str) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(Self::db_err("settings probe"))?;

        Ok(row.is_some())
    }

    async fn list_keys(&self) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT key FROM settings ORDER BY key")
            .fetch_all(&self.pool)
            .await
            .map_err(Self::db_err("settings key listing"))?;

        Ok(rows.into_iter().map(|r| r.get(0)).collect())
    }

    async fn clear_all(&self) -> Result<()> {
        sqlx::query("DELETE FROM settings")
            .execute(&self.pool)
            .await
            .map_err(Self::db_err("settings clear"))?;

        debug!("Settings cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn round_trip_and_delete() {
        let store = SqliteSettingsStore::in_memory().await.unwrap();

        store
            .set_string("dpop_contact_card", r#"{"name":"Rita"}"#)
            .await
            .unwrap();
        assert_eq!(
            store.get_string("dpop_contact_card").await.unwrap(),
            Some(r#"{"name":"Rita"}"#.to_string())
        );
        assert!(store.has_key("dpop_contact_card").await.unwrap());

        store.delete("dpop_contact_card").await.unwrap();
        assert_eq!(store.get_string("dpop_contact_card").await.unwrap(), None);
        assert!(!store.has_key("dpop_contact_card").await.unwrap());
    }

    #[tokio::test]
    async fn overwrite_replaces_value() {
        let store = SqliteSettingsStore::in_memory().await.unwrap();

        store.set_string("event_checkin:88", "first").await.unwrap();
        store.set_string("event_checkin:88", "second").await.unwrap();

        assert_eq!(
            store.get_string("event_checkin:88").await.unwrap(),
            Some("second".to_string())
        );
        assert_eq!(store.list_keys().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn list_keys_is_sorted() {
        let store = SqliteSettingsStore::in_memory().await.unwrap();

        store.set_string("b", "2").await.unwrap();
        store.set_string("a", "1").await.unwrap();
        store.set_string("c", "3").await.unwrap();

        assert_eq!(store.list_keys().await.unwrap(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn clear_all_empties_store() {
        let store = SqliteSettingsStore::in_memory().await.unwrap();

        store.set_string("a", "1").await.unwrap();
        store.set_string("b", "2").await.unwrap();
        store.clear_all().await.unwrap();

        assert!(store.list_keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_key_reads_none() {
        let store = SqliteSettingsStore::in_memory().await.unwrap();
        assert_eq!(store.get_string("absent").await.unwrap(), None);
        store.delete("absent").await.unwrap();
    }
}

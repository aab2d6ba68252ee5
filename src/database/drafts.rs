//! Draft database operations
//!
//! Key-value storage of serialized wizard drafts, exposed to the wizard as a
//! [`KeyValueStore`].

use async_trait::async_trait;
use sqlx::Row;

use super::Database;
use crate::core::recipe::wizard::{KeyValueStore, StorageError};

/// Extension trait for draft database operations
pub trait DraftOps {
    fn get_draft(&self, key: &str) -> impl std::future::Future<Output = Result<Option<String>, sqlx::Error>> + Send;
    fn set_draft(&self, key: &str, payload: &str) -> impl std::future::Future<Output = Result<(), sqlx::Error>> + Send;
    fn delete_draft(&self, key: &str) -> impl std::future::Future<Output = Result<(), sqlx::Error>> + Send;
    fn draft_keys(&self, prefix: &str) -> impl std::future::Future<Output = Result<Vec<String>, sqlx::Error>> + Send;
}

impl DraftOps for Database {
    async fn get_draft(&self, key: &str) -> Result<Option<String>, sqlx::Error> {
        let row = sqlx::query("SELECT payload FROM wizard_drafts WHERE key = ?")
            .bind(key)
            .fetch_optional(self.pool())
            .await?;

        Ok(row.map(|r| r.get("payload")))
    }

    async fn set_draft(&self, key: &str, payload: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT OR REPLACE INTO wizard_drafts (key, payload, updated_at) VALUES (?, ?, datetime('now'))"
        )
        .bind(key)
        .bind(payload)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    async fn delete_draft(&self, key: &str) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM wizard_drafts WHERE key = ?")
            .bind(key)
            .execute(self.pool())
            .await?;
        Ok(())
    }

    async fn draft_keys(&self, prefix: &str) -> Result<Vec<String>, sqlx::Error> {
        // substr instead of LIKE: draft keys contain '_'
        let rows = sqlx::query(
            "SELECT key FROM wizard_drafts WHERE substr(key, 1, length(?)) = ? ORDER BY key"
        )
        .bind(prefix)
        .bind(prefix)
        .fetch_all(self.pool())
        .await?;

        Ok(rows.iter().map(|r| r.get("key")).collect())
    }
}

fn backend(e: sqlx::Error) -> StorageError {
    StorageError::Backend(e.to_string())
}

#[async_trait]
impl KeyValueStore for Database {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.get_draft(key).await.map_err(backend)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.set_draft(key, value).await.map_err(backend)
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.delete_draft(key).await.map_err(backend)
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        self.draft_keys(prefix).await.map_err(backend)
    }
}

//! Draft Persistence
//!
//! Recoverable local snapshots of an in-progress edit.
//!
//! # Overview
//!
//! A [`DraftRecord`] holds the current step, the form data and the time it
//! was written. One record exists per [`DraftKey`] (create mode, or edit mode
//! scoped by recipe id) and every autosave overwrites it.
//!
//! # Failure policy
//!
//! Persistence is best-effort. [`DraftStore`] never returns storage errors to
//! its caller: failures are logged and reads degrade to "no draft", writes to
//! "save skipped". Drafts older than the configured TTL, or that no longer
//! parse, are deleted when encountered.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::core::recipe::types::RecipeId;

use super::types::{FormData, WizardMode, WizardStep};

/// Prefix shared by every draft key.
pub const DRAFT_KEY_PREFIX: &str = "recipe_draft_";

/// Default age after which a draft is discarded.
pub const DEFAULT_DRAFT_TTL_HOURS: i64 = 24;

// ============================================================================
// Storage Port
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Local persistent key-value store holding serialized drafts.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Deleting an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError>;
}

/// Process-local store, used by tests and ephemeral sessions.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StorageError> {
        self.entries
            .lock()
            .map_err(|e| StorageError::Backend(format!("memory store poisoned: {e}")))
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.lock()?.remove(key);
        Ok(())
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let mut keys: Vec<String> = self
            .lock()?
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }
}

// ============================================================================
// Keys and Records
// ============================================================================

/// Storage key of the draft for one (mode, recipe) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DraftKey(String);

impl DraftKey {
    pub fn for_mode(mode: &WizardMode) -> Self {
        match mode {
            WizardMode::Create => Self(format!("{DRAFT_KEY_PREFIX}create")),
            WizardMode::Edit(id) => Self::for_recipe(id),
        }
    }

    pub fn for_recipe(id: &RecipeId) -> Self {
        Self(format!("{DRAFT_KEY_PREFIX}edit_{id}"))
    }

    /// Wrap a raw storage key (e.g. one returned by a listing).
    pub fn from_raw(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DraftKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Persisted snapshot of a wizard session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftRecord {
    pub timestamp: DateTime<Utc>,
    pub step: WizardStep,
    pub data: FormData,
}

impl DraftRecord {
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now.signed_duration_since(self.timestamp)
    }
}

/// Listing entry for a stored draft
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraftSummary {
    pub key: String,
    pub step: WizardStep,
    pub title: String,
    pub saved_at: DateTime<Utc>,
}

// ============================================================================
// DraftStore
// ============================================================================

/// Best-effort draft persistence over a [`KeyValueStore`].
#[derive(Clone)]
pub struct DraftStore {
    store: Arc<dyn KeyValueStore>,
    ttl: chrono::Duration,
}

impl DraftStore {
    pub fn new(store: Arc<dyn KeyValueStore>, ttl: chrono::Duration) -> Self {
        Self { store, ttl }
    }

    pub fn with_default_ttl(store: Arc<dyn KeyValueStore>) -> Self {
        Self::new(store, chrono::Duration::hours(DEFAULT_DRAFT_TTL_HOURS))
    }

    pub fn ttl(&self) -> chrono::Duration {
        self.ttl
    }

    /// Read the live draft for `key`.
    ///
    /// Expired or unreadable drafts are deleted and reported as absent.
    pub async fn detect(&self, key: &DraftKey) -> Option<DraftRecord> {
        self.detect_at(key, Utc::now()).await
    }

    pub async fn detect_at(&self, key: &DraftKey, now: DateTime<Utc>) -> Option<DraftRecord> {
        let raw = match self.store.get(key.as_str()).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(draft_key = %key, error = %e, "Failed to read draft");
                return None;
            }
        };

        let record: DraftRecord = match serde_json::from_str(&raw) {
            Ok(record) => record,
            Err(e) => {
                warn!(draft_key = %key, error = %e, "Discarding unreadable draft");
                self.clear(key).await;
                return None;
            }
        };

        if record.age(now) > self.ttl {
            info!(
                draft_key = %key,
                saved_at = %record.timestamp,
                "Discarding expired draft"
            );
            self.clear(key).await;
            return None;
        }

        Some(record)
    }

    /// Overwrite the draft for `key`. Returns whether the write happened.
    pub async fn save(&self, key: &DraftKey, step: WizardStep, data: &FormData) -> bool {
        let record = DraftRecord {
            timestamp: Utc::now(),
            step,
            data: data.clone(),
        };

        let payload = match serde_json::to_string(&record) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(draft_key = %key, error = %e, "Failed to serialize draft");
                return false;
            }
        };

        match self.store.set(key.as_str(), &payload).await {
            Ok(()) => {
                debug!(draft_key = %key, step = %step, "Draft saved");
                true
            }
            Err(e) => {
                warn!(draft_key = %key, error = %e, "Failed to save draft, skipping");
                false
            }
        }
    }

    /// Delete the draft for `key`. Idempotent.
    pub async fn clear(&self, key: &DraftKey) {
        if let Err(e) = self.store.remove(key.as_str()).await {
            warn!(draft_key = %key, error = %e, "Failed to clear draft");
        }
    }

    /// Summaries of every live draft, most recent first.
    pub async fn list(&self) -> Vec<DraftSummary> {
        let now = Utc::now();
        let mut summaries = Vec::new();

        for key in self.keys().await {
            if let Some(record) = self.detect_at(&key, now).await {
                summaries.push(DraftSummary {
                    key: key.as_str().to_string(),
                    step: record.step,
                    title: record.data.title,
                    saved_at: record.timestamp,
                });
            }
        }

        summaries.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
        summaries
    }

    /// Delete every expired or unreadable draft; returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut purged = 0;
        for key in self.keys().await {
            if self.detect_at(&key, now).await.is_none() {
                purged += 1;
            }
        }
        if purged > 0 {
            info!(purged, "Purged stale drafts");
        }
        purged
    }

    async fn keys(&self) -> Vec<DraftKey> {
        match self.store.keys_with_prefix(DRAFT_KEY_PREFIX).await {
            Ok(keys) => keys.into_iter().map(DraftKey::from_raw).collect(),
            Err(e) => {
                warn!(error = %e, "Failed to list drafts");
                Vec::new()
            }
        }
    }
}

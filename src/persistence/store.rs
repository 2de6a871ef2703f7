//! Status-partitioned JSON record store
//!
//! Records live at `<base>/<status>/<id>.json`. A record's directory is the
//! source of truth for its status: a document whose `status` field disagrees
//! with its directory is read back with the directory's status.

use crate::core::{RecipeRecord, RecipeStatus};
use crate::persistence::atomic::write_atomic;
use chrono::Utc;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info, warn};

/// Error types for record store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Recipe not found: {0}")]
    NotFound(String),

    #[error("Recipe {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: String,
        from: RecipeStatus,
        to: RecipeStatus,
    },

    #[error("Invalid recipe id: {0:?}")]
    InvalidId(String),

    #[error("Recipe {id} already stored as {existing}")]
    Conflict { id: String, existing: RecipeStatus },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Ids become file names, so path separators, parent references and NUL
/// bytes are refused.
pub fn validate_id(id: &str) -> Result<(), StoreError> {
    let invalid = id.is_empty()
        || id.contains(['/', '\\', '\0'])
        || id.contains("..");
    if invalid {
        return Err(StoreError::InvalidId(id.to_string()));
    }
    Ok(())
}

/// File-backed store for recipe records
#[derive(Debug, Clone)]
pub struct RecordStore {
    base: PathBuf,
}

impl RecordStore {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Create the four status directories
    pub async fn init(&self) -> Result<(), StoreError> {
        for status in RecipeStatus::ALL {
            fs::create_dir_all(self.status_dir(status)).await?;
        }
        Ok(())
    }

    pub fn status_dir(&self, status: RecipeStatus) -> PathBuf {
        self.base.join(status.as_str())
    }

    pub fn record_path(&self, id: &str, status: RecipeStatus) -> PathBuf {
        self.status_dir(status).join(format!("{}.json", id))
    }

    /// Status directories currently holding a document for `id`
    async fn locate(&self, id: &str) -> Result<Vec<RecipeStatus>, StoreError> {
        let mut found = Vec::new();
        for status in RecipeStatus::ALL {
            if fs::try_exists(self.record_path(id, status)).await? {
                found.push(status);
            }
        }
        Ok(found)
    }

    async fn read_record(&self, path: &Path, status: RecipeStatus) -> Result<RecipeRecord, StoreError> {
        let content = fs::read_to_string(path).await?;
        let mut record: RecipeRecord = serde_json::from_str(&content).map_err(|source| {
            StoreError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })?;

        if record.status != status {
            warn!(
                "Recipe {} is stored under {} but claims {}; trusting the directory",
                record.id, status, record.status
            );
            record.status = status;
        }
        Ok(record)
    }

    /// Persist a record under its status directory.
    ///
    /// Refreshes `updated_at`. Fails with `Conflict` if the id is already
    /// stored under a different status; use `transition` to move records.
    pub async fn save(&self, record: &mut RecipeRecord) -> Result<PathBuf, StoreError> {
        validate_id(&record.id)?;
        if let Some(existing) = self
            .locate(&record.id)
            .await?
            .into_iter()
            .find(|s| *s != record.status)
        {
            return Err(StoreError::Conflict {
                id: record.id.clone(),
                existing,
            });
        }

        record.updated_at = Utc::now();
        let path = self.record_path(&record.id, record.status);
        write_atomic(&path, serde_json::to_string_pretty(record)?).await?;

        debug!("Saved recipe {} to {}", record.id, path.display());
        Ok(path)
    }

    /// Move a record to a new status.
    ///
    /// The existing document is renamed into the new status directory and
    /// then rewritten in place, so exactly one document exists for the id at
    /// every point. `record` is only updated once both steps succeed.
    pub async fn transition(
        &self,
        record: &mut RecipeRecord,
        new_status: RecipeStatus,
        notes: Option<&str>,
    ) -> Result<(), StoreError> {
        validate_id(&record.id)?;
        let from = record.status;
        if !from.can_transition_to(new_status) {
            return Err(StoreError::InvalidTransition {
                id: record.id.clone(),
                from,
                to: new_status,
            });
        }

        let now = Utc::now();
        let mut updated = record.clone();
        updated.status = new_status;
        updated.updated_at = now;
        if let Some(notes) = notes {
            updated.review_notes = Some(notes.to_string());
        }
        if new_status == RecipeStatus::Published {
            updated.published_at = Some(now);
        }

        let target = self.record_path(&record.id, new_status);
        let current = self.record_path(&record.id, from);
        if current != target && fs::try_exists(&current).await? {
            fs::create_dir_all(self.status_dir(new_status)).await?;
            fs::rename(&current, &target).await?;
        }
        write_atomic(&target, serde_json::to_string_pretty(&updated)?).await?;

        info!("Recipe {} moved {} -> {}", record.id, from, new_status);
        *record = updated;
        Ok(())
    }

    /// Every parseable record under one status, oldest first
    pub async fn list_by_status(&self, status: RecipeStatus) -> Result<Vec<RecipeRecord>, StoreError> {
        let dir = self.status_dir(status);
        if !fs::try_exists(&dir).await? {
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        let mut entries = fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match self.read_record(&path, status).await {
                Ok(record) => records.push(record),
                Err(e) => warn!("Skipping unreadable record {}: {}", path.display(), e),
            }
        }

        records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(records)
    }

    /// Records across every status, one per id (latest `updated_at` wins)
    pub async fn list_all(&self) -> Result<Vec<RecipeRecord>, StoreError> {
        let mut by_id: HashMap<String, RecipeRecord> = HashMap::new();
        for status in RecipeStatus::ALL {
            for record in self.list_by_status(status).await? {
                match by_id.get(&record.id) {
                    Some(existing) if existing.updated_at >= record.updated_at => {}
                    _ => {
                        by_id.insert(record.id.clone(), record);
                    }
                }
            }
        }

        let mut records: Vec<RecipeRecord> = by_id.into_values().collect();
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(records)
    }

    /// Find a record by id, scanning pending, approved, published, rejected
    pub async fn load(&self, id: &str) -> Result<RecipeRecord, StoreError> {
        validate_id(id)?;
        for status in RecipeStatus::ALL {
            let path = self.record_path(id, status);
            if fs::try_exists(&path).await? {
                return self.read_record(&path, status).await;
            }
        }
        Err(StoreError::NotFound(id.to_string()))
    }

    /// Accept a pending record
    pub async fn approve(&self, id: &str, notes: Option<&str>) -> Result<RecipeRecord, StoreError> {
        let mut record = self.load(id).await?;
        self.transition(&mut record, RecipeStatus::Approved, notes).await?;
        Ok(record)
    }

    /// Turn down a pending or approved record
    pub async fn reject(&self, id: &str, notes: Option<&str>) -> Result<RecipeRecord, StoreError> {
        let mut record = self.load(id).await?;
        self.transition(&mut record, RecipeStatus::Rejected, notes).await?;
        Ok(record)
    }
}

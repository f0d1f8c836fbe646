//! Document registry.
//!
//! An ordered list of [`DocumentRecord`]s in upload order. Records are only
//! ever appended; afterwards only their status changes. After every mutation
//! the whole list is serialized and written back under
//! [`KEY_DOCUMENTS`](crate::storage::KEY_DOCUMENTS), so a fresh start sees
//! exactly what the last session left behind.

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::models::{DocStatus, DocumentRecord};
use crate::storage::{KeyValueStore, KEY_DOCUMENTS};

pub struct DocumentRegistry {
    docs: Vec<DocumentRecord>,
    store: Arc<dyn KeyValueStore>,
}

/// Snapshot of the registry as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentListView {
    /// Most recent upload first.
    pub items: Vec<DocumentRecord>,
    pub indexed_count: usize,
}

impl DocumentRegistry {
    /// Load the persisted list.
    ///
    /// Unreadable JSON yields an empty registry. Individual entries that do
    /// not decode (unknown status, missing field) are dropped with a warning
    /// so every record in memory has a valid status.
    pub async fn load(store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let raw = store.get(KEY_DOCUMENTS).await?;
        let docs = match raw {
            Some(json) => decode_documents(&json),
            None => Vec::new(),
        };
        tracing::debug!(count = docs.len(), "loaded document registry");
        Ok(Self { docs, store })
    }

    pub fn documents(&self) -> &[DocumentRecord] {
        &self.docs
    }

    pub fn get(&self, id: &str) -> Option<&DocumentRecord> {
        self.docs.iter().find(|d| d.id == id)
    }

    /// Append a new record in `uploading` state and persist.
    ///
    /// If the write fails the record is removed again, so the in-memory list
    /// never holds a record that storage has not seen.
    pub async fn add(&mut self, name: &str) -> Result<DocumentRecord> {
        let record = DocumentRecord {
            id: self.next_id(),
            name: name.to_string(),
            status: DocStatus::Uploading,
        };
        self.docs.push(record.clone());
        if let Err(e) = self.persist().await {
            self.docs.pop();
            return Err(e);
        }
        Ok(record)
    }

    /// Move a record to `status` and persist.
    ///
    /// Returns `false` without touching storage if the record does not exist
    /// or the transition would move it backwards or out of a terminal state.
    pub async fn set_status(&mut self, id: &str, status: DocStatus) -> Result<bool> {
        let Some(doc) = self.docs.iter_mut().find(|d| d.id == id) else {
            tracing::warn!(id, "status update for unknown document");
            return Ok(false);
        };

        if !doc.status.can_transition_to(status) {
            tracing::warn!(
                id,
                from = %doc.status,
                to = %status,
                "refusing backwards document status transition"
            );
            return Ok(false);
        }

        doc.status = status;
        self.persist().await?;
        Ok(true)
    }

    pub fn indexed_count(&self) -> usize {
        self.docs
            .iter()
            .filter(|d| d.status == DocStatus::Indexed)
            .count()
    }

    pub fn view(&self) -> DocumentListView {
        DocumentListView {
            items: self.docs.iter().rev().cloned().collect(),
            indexed_count: self.indexed_count(),
        }
    }

    async fn persist(&self) -> Result<()> {
        let json =
            serde_json::to_string(&self.docs).context("Failed to serialize document registry")?;
        self.store.set(KEY_DOCUMENTS, &json).await
    }

    /// Creation time in Unix milliseconds, bumped until unused.
    fn next_id(&self) -> String {
        let mut candidate = chrono::Utc::now().timestamp_millis();
        while self.docs.iter().any(|d| d.id == candidate.to_string()) {
            candidate += 1;
        }
        candidate.to_string()
    }
}

fn decode_documents(json: &str) -> Vec<DocumentRecord> {
    let values: Vec<serde_json::Value> = match serde_json::from_str(json) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, "stored document list is not a JSON array, starting empty");
            return Vec::new();
        }
    };

    values
        .into_iter()
        .filter_map(|v| match serde_json::from_value::<DocumentRecord>(v) {
            Ok(doc) => Some(doc),
            Err(e) => {
                tracing::warn!(error = %e, "dropping unreadable stored document");
                None
            }
        })
        .collect()
}

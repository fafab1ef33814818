//! JSON snapshot gateway.
//!
//! Serves documents from a file written by `docsweep export`. Deletes are applied
//! to the file itself, via temp file + rename so a crash never leaves it half written.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use super::DocumentGateway;
use crate::dedup::types::DocumentRecord;
use crate::error::GatewayError;

/// On-disk snapshot format.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub documents: Vec<DocumentRecord>,
}

impl Snapshot {
    pub fn read(path: &Path) -> Result<Self, GatewayError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Write atomically: serialize to `<path>.tmp`, then rename over `path`.
    pub fn write(&self, path: &Path) -> Result<(), GatewayError> {
        let json = serde_json::to_string_pretty(self)?;
        let tmp_path = path.with_extension("tmp");
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, path)?;
        Ok(())
    }
}

/// File-backed [`DocumentGateway`].
pub struct SnapshotGateway {
    path: PathBuf,
    documents: Mutex<Vec<DocumentRecord>>,
}

impl SnapshotGateway {
    /// Load the snapshot at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, GatewayError> {
        let path = path.into();
        let snapshot = Snapshot::read(&path)?;
        tracing::info!(
            path = %path.display(),
            documents = snapshot.documents.len(),
            "snapshot loaded"
        );
        Ok(Self {
            path,
            documents: Mutex::new(snapshot.documents),
        })
    }
}

#[async_trait]
impl DocumentGateway for SnapshotGateway {
    async fn fetch_candidates(
        &self,
        name_filter: Option<&str>,
    ) -> Result<Vec<DocumentRecord>, GatewayError> {
        let documents = self.documents.lock().await;
        Ok(documents
            .iter()
            .filter(|d| name_filter.map_or(true, |name| d.name == name))
            .cloned()
            .collect())
    }

    async fn delete_by_id(&self, id: &str) -> Result<(), GatewayError> {
        let mut documents = self.documents.lock().await;
        let position = documents
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| GatewayError::NotFound(id.to_string()))?;
        let removed = documents.remove(position);

        let snapshot = Snapshot {
            documents: documents.clone(),
        };
        let path = self.path.clone();
        // Lock stays held until the write finishes; writes land in lock order.
        let written = match tokio::task::spawn_blocking(move || snapshot.write(&path)).await {
            Ok(result) => result,
            Err(e) => Err(GatewayError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                e,
            ))),
        };
        if let Err(e) = written {
            // Keep memory consistent with what is on disk.
            documents.insert(position, removed);
            return Err(e);
        }
        Ok(())
    }

    fn describe(&self) -> String {
        format!("snapshot {}", self.path.display())
    }
}

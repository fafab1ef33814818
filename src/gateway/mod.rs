//! Document store access.
//!
//! Provides the [`DocumentGateway`] trait the engine depends on, a Weaviate
//! implementation, and a JSON snapshot implementation for offline runs. The
//! gateway is created via [`create_gateway`] from configuration.

pub mod pacing;
pub mod snapshot;
pub mod weaviate;

use anyhow::Result;
use async_trait::async_trait;

use crate::config::DocsweepConfig;
use crate::dedup::types::DocumentRecord;
use crate::error::GatewayError;

/// Read and delete access to a document store.
///
/// Implementations own pagination, pacing, and network timeouts. They must
/// return an empty vector rather than an error when nothing matches.
#[async_trait]
pub trait DocumentGateway: Send + Sync {
    /// Fetch every document, optionally restricted to one exact name.
    async fn fetch_candidates(
        &self,
        name_filter: Option<&str>,
    ) -> Result<Vec<DocumentRecord>, GatewayError>;

    /// Delete one document. A missing id is [`GatewayError::NotFound`].
    async fn delete_by_id(&self, id: &str) -> Result<(), GatewayError>;

    /// Short description for log lines, e.g. the endpoint or file path.
    fn describe(&self) -> String;
}

/// Create a gateway from config.
///
/// Supported backends: `"weaviate"` and `"snapshot"`.
pub fn create_gateway(config: &DocsweepConfig) -> Result<Box<dyn DocumentGateway>> {
    match config.store.backend.as_str() {
        "weaviate" => {
            let gateway = weaviate::WeaviateGateway::new(&config.weaviate)?;
            Ok(Box::new(gateway))
        }
        "snapshot" => {
            let gateway = snapshot::SnapshotGateway::open(config.resolved_snapshot_path())?;
            Ok(Box::new(gateway))
        }
        other => anyhow::bail!("unknown store backend: {other}. Supported: weaviate, snapshot"),
    }
}

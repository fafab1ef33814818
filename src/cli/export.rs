use anyhow::Result;

use super::load_candidates;
use docsweep::config::DocsweepConfig;
use docsweep::gateway::snapshot::Snapshot;

/// Write the candidate set as snapshot JSON to stdout.
pub async fn export(config: &DocsweepConfig, name: Option<&str>) -> Result<()> {
    let (_gateway, documents) = load_candidates(config, name).await?;
    let snapshot = Snapshot { documents };

    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    eprintln!("Exported {} documents.", snapshot.documents.len());
    Ok(())
}

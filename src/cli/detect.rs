//! `docsweep detect`: read-only duplicate report.

use anyhow::Result;

use super::{load_candidates, preview};
use docsweep::config::DocsweepConfig;
use docsweep::dedup;

pub async fn detect(config: &DocsweepConfig, name: Option<&str>, json: bool) -> Result<()> {
    let (_gateway, records) = load_candidates(config, name).await?;
    let groups = dedup::detect(&records, &config.similarity);

    if json {
        println!("{}", serde_json::to_string_pretty(&groups)?);
        return Ok(());
    }

    if groups.is_empty() {
        println!("No duplicate groups among {} documents.", records.len());
        return Ok(());
    }

    println!(
        "{:<40} {:>6} {:<10} {:>8} {:>10}",
        "Name", "Copies", "Kind", "Prints", "Max sim"
    );
    println!("{}", "-".repeat(78));
    for g in &groups {
        let kind = if g.exact { "exact" } else { "heuristic" };
        let max_sim = g
            .max_similarity
            .map(|s| format!("{s:.2}"))
            .unwrap_or_else(|| "-".into());
        println!(
            "{:<40} {:>6} {:<10} {:>8} {:>10}",
            preview(&g.name, 37),
            g.count,
            kind,
            g.distinct_fingerprints,
            max_sim
        );
        for pair in &g.review_pairs {
            println!(
                "    review: {} ~ {} ({:.2})",
                pair.first, pair.second, pair.similarity
            );
        }
    }

    let redundant: usize = groups.iter().map(|g| g.count - 1).sum();
    println!();
    println!(
        "{} duplicate groups, {} redundant documents out of {}.",
        groups.len(),
        redundant,
        records.len()
    );
    Ok(())
}

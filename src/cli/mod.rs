pub mod detect;
pub mod export;
pub mod resolve;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use docsweep::config::DocsweepConfig;
use docsweep::dedup::types::DocumentRecord;
use docsweep::gateway::{create_gateway, DocumentGateway};

/// Open the configured gateway and fetch candidates behind a spinner.
pub async fn load_candidates(
    config: &DocsweepConfig,
    name: Option<&str>,
) -> Result<(Box<dyn DocumentGateway>, Vec<DocumentRecord>)> {
    let gateway = create_gateway(config).context("failed to open document store")?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("  {spinner} {msg}")
            .context("invalid spinner template")?,
    );
    spinner.set_message(format!("Fetching documents from {}...", gateway.describe()));
    spinner.enable_steady_tick(Duration::from_millis(120));

    let records = docsweep::dedup::fetch(gateway.as_ref(), name).await;
    spinner.finish_and_clear();

    Ok((gateway, records?))
}

/// Shorten content for table output.
pub(crate) fn preview(content: &str, max_chars: usize) -> String {
    let flat: String = content.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        flat
    } else {
        let cut: String = flat.chars().take(max_chars).collect();
        format!("{cut}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_flattens_and_truncates() {
        assert_eq!(preview("a\n b", 10), "a b");
        assert_eq!(preview("abcdefghij", 4), "abcd...");
        assert_eq!(preview("ééééé", 3), "ééé...");
    }
}

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct DocsweepConfig {
    pub log: LogConfig,
    pub store: StoreConfig,
    pub weaviate: WeaviateConfig,
    pub scoring: ScoringConfig,
    pub similarity: SimilarityConfig,
    pub execution: ExecutionConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StoreConfig {
    /// `"weaviate"` or `"snapshot"`.
    pub backend: String,
    pub snapshot_path: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct WeaviateConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub class: String,
    pub name_property: String,
    pub content_property: String,
    pub uploaded_at_property: String,
    pub source_property: String,
    pub path_property: String,
    pub type_property: String,
    pub page_size: usize,
    pub timeout_secs: u64,
    pub min_request_interval_ms: u64,
}

/// Per-term caps and divisors for version ranking.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ScoringConfig {
    pub content_cap: f64,
    pub content_divisor: f64,
    pub recency_cap: f64,
    pub recency_divisor_days: f64,
    pub metadata_points: f64,
    pub path_bonus: f64,
    /// Paths containing this substring (case-sensitive) get no path bonus.
    pub temp_marker: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SimilarityConfig {
    pub review_threshold: f64,
    pub min_token_len: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ExecutionConfig {
    pub concurrency: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        let snapshot_path = default_docsweep_dir()
            .join("snapshot.json")
            .to_string_lossy()
            .into_owned();
        Self {
            backend: "weaviate".into(),
            snapshot_path,
        }
    }
}

impl Default for WeaviateConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8080".into(),
            api_key: None,
            class: "Documents".into(),
            name_property: "file_name".into(),
            content_property: "content".into(),
            uploaded_at_property: "upload_date".into(),
            source_property: "zip_file_name".into(),
            path_property: "file_path".into(),
            type_property: "file_type".into(),
            page_size: 100,
            timeout_secs: 30,
            min_request_interval_ms: 100,
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            content_cap: 40.0,
            content_divisor: 100.0,
            recency_cap: 30.0,
            recency_divisor_days: 10.0,
            metadata_points: 5.0,
            path_bonus: 10.0,
            temp_marker: "temp".into(),
        }
    }
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            review_threshold: 0.8,
            min_token_len: 3,
        }
    }
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self { concurrency: 4 }
    }
}

/// Returns `~/.docsweep/`
pub fn default_docsweep_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".docsweep")
}

/// Returns the default config file path: `~/.docsweep/config.toml`
pub fn default_config_path() -> PathBuf {
    default_docsweep_dir().join("config.toml")
}

impl DocsweepConfig {
    /// Load config from the default TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            DocsweepConfig::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides
    /// (DOCSWEEP_URL, DOCSWEEP_API_KEY, DOCSWEEP_CLASS, DOCSWEEP_SNAPSHOT, DOCSWEEP_LOG_LEVEL).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("DOCSWEEP_URL") {
            self.weaviate.url = val;
        }
        if let Ok(val) = std::env::var("DOCSWEEP_API_KEY") {
            self.weaviate.api_key = Some(val);
        }
        if let Ok(val) = std::env::var("DOCSWEEP_CLASS") {
            self.weaviate.class = val;
        }
        if let Ok(val) = std::env::var("DOCSWEEP_SNAPSHOT") {
            self.store.snapshot_path = val;
        }
        if let Ok(val) = std::env::var("DOCSWEEP_LOG_LEVEL") {
            self.log.level = val;
        }
    }

    /// Reject settings that would make scoring or execution meaningless.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.scoring.content_divisor > 0.0,
            "scoring.content_divisor must be positive"
        );
        anyhow::ensure!(
            self.scoring.content_cap >= 0.0,
            "scoring.content_cap must not be negative"
        );
        anyhow::ensure!(
            self.scoring.recency_cap >= 0.0,
            "scoring.recency_cap must not be negative"
        );
        anyhow::ensure!(
            self.scoring.recency_divisor_days > 0.0,
            "scoring.recency_divisor_days must be positive"
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.similarity.review_threshold),
            "similarity.review_threshold must be between 0.0 and 1.0"
        );
        anyhow::ensure!(
            self.execution.concurrency > 0,
            "execution.concurrency must be at least 1"
        );
        anyhow::ensure!(self.weaviate.page_size > 0, "weaviate.page_size must be at least 1");
        Ok(())
    }

    /// Resolve the snapshot path, expanding `~` if needed.
    pub fn resolved_snapshot_path(&self) -> PathBuf {
        expand_tilde(&self.store.snapshot_path)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

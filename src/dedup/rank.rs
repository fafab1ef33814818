//! Version ranking within a duplicate group.
//!
//! Each document gets an additive score from independently capped terms:
//!
//! | Term | Default | Rule |
//! |------|---------|------|
//! | Content length | 0–40 | `chars / 100`, saturating at 4000 chars |
//! | Recency | 0–30 | `30 - days_since_upload / 10`; unknown upload date scores 0 |
//! | Metadata | 0–15 | 5 points each for path, type, source |
//! | Path bonus | 0 or 10 | path present and free of the temp marker |
//!
//! Only the terms are capped, never the sum. Ties are broken by ascending id so
//! the same group always produces the same winner.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::types::DocumentRecord;
use crate::config::ScoringConfig;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Per-term contribution to a candidate's score.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ScoreBreakdown {
    pub content: f64,
    pub recency: f64,
    pub metadata: f64,
    pub path: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.content + self.recency + self.metadata + self.path
    }
}

/// A group member with its computed score.
#[derive(Debug, Clone, Serialize)]
pub struct RankedCandidate<'a> {
    pub record: &'a DocumentRecord,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
}

/// Score a single record against `now`.
pub fn score(record: &DocumentRecord, config: &ScoringConfig, now: DateTime<Utc>) -> ScoreBreakdown {
    let length = record
        .content
        .as_deref()
        .map(|c| c.chars().count())
        .unwrap_or(0);
    let content = (length as f64 / config.content_divisor).min(config.content_cap);

    let recency = match record.uploaded_at {
        Some(uploaded) => {
            let days = (now - uploaded).num_milliseconds() as f64 / MILLIS_PER_DAY;
            // `clamp` panics on a NaN or negative upper bound.
            let cap = config.recency_cap.max(0.0);
            (cap - days / config.recency_divisor_days).clamp(0.0, cap)
        }
        // Unknown upload time is ranked as worst case.
        None => 0.0,
    };

    let metadata = config.metadata_points * record.metadata_flags().count() as f64;

    let path = match record.path.as_deref() {
        Some(p) if !p.is_empty() && !contains_marker(p, &config.temp_marker) => config.path_bonus,
        _ => 0.0,
    };

    ScoreBreakdown {
        content,
        recency,
        metadata,
        path,
    }
}

fn contains_marker(path: &str, marker: &str) -> bool {
    !marker.is_empty() && path.contains(marker)
}

/// Rank a group best-first: score descending, then id ascending.
pub fn rank<'a>(
    members: &[&'a DocumentRecord],
    config: &ScoringConfig,
    now: DateTime<Utc>,
) -> Vec<RankedCandidate<'a>> {
    let mut ranked: Vec<RankedCandidate<'a>> = members
        .iter()
        .map(|&record| {
            let breakdown = score(record, config, now);
            RankedCandidate {
                record,
                score: breakdown.total(),
                breakdown,
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.record.id.cmp(&b.record.id))
    });
    ranked
}

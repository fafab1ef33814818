//! Read-only duplicate report.

use super::fingerprint::{duplicate_groups, fingerprint, DuplicateGroup};
use super::similarity::similarity_with;
use super::types::{DocumentRecord, GroupSummary, SimilarPair};
use crate::config::SimilarityConfig;

/// Summarize every duplicate group in `records`, ordered by name.
pub fn detect(records: &[DocumentRecord], config: &SimilarityConfig) -> Vec<GroupSummary> {
    duplicate_groups(records)
        .iter()
        .map(|group| summarize(group, config))
        .collect()
}

fn summarize(group: &DuplicateGroup<'_>, config: &SimilarityConfig) -> GroupSummary {
    let exact = group.shared_fingerprint().is_some();
    let prints: Vec<Option<String>> = group
        .members
        .iter()
        .map(|m| fingerprint(m.content.as_deref()))
        .collect();

    let mut max_similarity: Option<f64> = None;
    let mut review_pairs = Vec::new();

    if !exact {
        for i in 0..group.members.len() {
            for j in (i + 1)..group.members.len() {
                // Hash-identical pairs are not near-duplicates, they are copies.
                if prints[i].is_some() && prints[i] == prints[j] {
                    continue;
                }
                let (a, b) = (group.members[i], group.members[j]);
                let score = similarity_with(
                    a.content.as_deref(),
                    b.content.as_deref(),
                    config.min_token_len,
                );
                max_similarity = Some(max_similarity.map_or(score, |m: f64| m.max(score)));
                if score >= config.review_threshold {
                    review_pairs.push(SimilarPair {
                        first: a.id.clone(),
                        second: b.id.clone(),
                        similarity: score,
                    });
                }
            }
        }
    }

    GroupSummary {
        name: group.name.to_string(),
        count: group.members.len(),
        exact,
        distinct_fingerprints: group.distinct_fingerprints(),
        max_similarity,
        review_pairs,
        document_ids: group.members.iter().map(|m| m.id.clone()).collect(),
    }
}

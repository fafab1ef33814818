//! Core record and plan type definitions.
//!
//! Defines [`DocumentRecord`] (a read snapshot from the store), [`MetadataFlags`]
//! (the completeness signals used in ranking), [`ResolutionAction`] (one line of a
//! plan), [`ExecutionResult`] (one delete outcome), and [`GroupSummary`] (the
//! read-only detect report).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A document as read from the store. Never mutated by the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Store-assigned identifier, unique within one run.
    pub id: String,
    /// Declared file or title name. Empty names are never grouped.
    #[serde(default)]
    pub name: String,
    /// Full text body. `None` means the store had no (decodable) content field.
    #[serde(default)]
    pub content: Option<String>,
    /// Upload timestamp. `None` is ranked as the oldest possible version.
    #[serde(default)]
    pub uploaded_at: Option<DateTime<Utc>>,
    /// Provenance string (origin archive or import source).
    #[serde(default)]
    pub source: Option<String>,
    /// Original file path, if the importer recorded one.
    #[serde(default)]
    pub path: Option<String>,
    /// File type (e.g. `"md"`, `"pdf"`).
    #[serde(default)]
    pub doc_type: Option<String>,
}

impl DocumentRecord {
    /// A record with only an id and name; the rest is filled in with the `with_*` helpers.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            content: None,
            uploaded_at: None,
            source: None,
            path: None,
            doc_type: None,
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_uploaded_at(mut self, uploaded_at: DateTime<Utc>) -> Self {
        self.uploaded_at = Some(uploaded_at);
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_doc_type(mut self, doc_type: impl Into<String>) -> Self {
        self.doc_type = Some(doc_type.into());
        self
    }

    /// Which optional metadata fields carry a non-empty value.
    pub fn metadata_flags(&self) -> MetadataFlags {
        fn present(field: &Option<String>) -> bool {
            field.as_deref().is_some_and(|v| !v.is_empty())
        }
        MetadataFlags {
            has_path: present(&self.path),
            has_type: present(&self.doc_type),
            has_source: present(&self.source),
        }
    }
}

/// Metadata completeness signals derived from a [`DocumentRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MetadataFlags {
    pub has_path: bool,
    pub has_type: bool,
    pub has_source: bool,
}

impl MetadataFlags {
    pub fn count(&self) -> usize {
        [self.has_path, self.has_type, self.has_source]
            .iter()
            .filter(|present| **present)
            .count()
    }
}

/// Whether a document survives resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Keep,
    Delete,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Keep => "keep",
            Self::Delete => "delete",
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// How a group was matched, so callers can decide between auto-execute and review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Hash-identical to the kept version. On a keep: every member of the group is.
    Exact,
    /// Same name, different content; the best-ranked version wins.
    Heuristic,
}

impl MatchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Heuristic => "heuristic",
        }
    }
}

impl std::fmt::Display for MatchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// One line of a resolution plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionAction {
    pub document_id: String,
    pub decision: Decision,
    /// Name of the duplicate group that produced this action.
    pub group_key: String,
    pub match_kind: MatchKind,
    /// Human-readable reason, e.g. `"Identical content (hash match)"`.
    pub reason: String,
    /// Advisory similarity note for heuristic groups. Never changes the decision.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity_note: Option<String>,
}

/// Result of a single delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Deleted,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub document_id: String,
    pub outcome: Outcome,
    /// Error message for failures, group key for successes.
    pub detail: String,
}

/// Read-only description of one duplicate group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub name: String,
    pub count: usize,
    /// All members share one non-null fingerprint.
    pub exact: bool,
    /// Number of distinct fingerprints, counting absent content once.
    pub distinct_fingerprints: usize,
    /// Highest pairwise similarity among members without a shared fingerprint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_similarity: Option<f64>,
    /// Pairs at or above the review threshold.
    pub review_pairs: Vec<SimilarPair>,
    /// Member ids in input order.
    pub document_ids: Vec<String>,
}

/// Two near-duplicate documents flagged for manual review.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarPair {
    pub first: String,
    pub second: String,
    pub similarity: f64,
}

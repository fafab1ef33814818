//! Content fingerprints and name grouping.

use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashSet};

use super::types::DocumentRecord;

/// SHA-256 of the trimmed content, hex encoded.
///
/// Returns `None` when there is no content at all, so an absent body never
/// matches anything. An empty string still hashes, and two empty strings match.
pub fn fingerprint(content: Option<&str>) -> Option<String> {
    let content = content?;
    let mut hasher = Sha256::new();
    hasher.update(content.trim().as_bytes());
    Some(hex::encode(hasher.finalize()))
}

/// Records sharing one non-empty name, in input order.
#[derive(Debug, Clone)]
pub struct DuplicateGroup<'a> {
    pub name: &'a str,
    pub members: Vec<&'a DocumentRecord>,
}

impl<'a> DuplicateGroup<'a> {
    /// The fingerprint every member shares, if there is exactly one and it is non-null.
    pub fn shared_fingerprint(&self) -> Option<String> {
        let mut prints = self
            .members
            .iter()
            .map(|m| fingerprint(m.content.as_deref()));
        let first = prints.next()??;
        prints
            .all(|p| p.as_deref() == Some(first.as_str()))
            .then_some(first)
    }

    /// Number of distinct fingerprints, with absent content counted as one bucket.
    pub fn distinct_fingerprints(&self) -> usize {
        self.members
            .iter()
            .map(|m| fingerprint(m.content.as_deref()))
            .collect::<HashSet<_>>()
            .len()
    }
}

/// Bucket records by name. Unnamed records are dropped; within a bucket input
/// order is preserved. A repeated id is indexed only once.
pub fn index(records: &[DocumentRecord]) -> BTreeMap<&str, Vec<&DocumentRecord>> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut buckets: BTreeMap<&str, Vec<&DocumentRecord>> = BTreeMap::new();

    for record in records {
        if record.name.is_empty() {
            continue;
        }
        if !seen.insert(record.id.as_str()) {
            tracing::warn!(id = %record.id, "duplicate document id in candidate set, ignoring repeat");
            continue;
        }
        buckets.entry(record.name.as_str()).or_default().push(record);
    }

    buckets
}

/// Only buckets with two or more members, ordered by name.
pub fn duplicate_groups(records: &[DocumentRecord]) -> Vec<DuplicateGroup<'_>> {
    index(records)
        .into_iter()
        .filter(|(_, members)| members.len() >= 2)
        .map(|(name, members)| DuplicateGroup { name, members })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str, name: &str, content: Option<&str>) -> DocumentRecord {
        let record = DocumentRecord::new(id, name);
        match content {
            Some(c) => record.with_content(c),
            None => record,
        }
    }

    #[test]
    fn fingerprint_ignores_surrounding_whitespace() {
        assert_eq!(
            fingerprint(Some("  Q3 results\n")),
            fingerprint(Some("Q3 results"))
        );
        assert_ne!(fingerprint(Some("Q3 results")), fingerprint(Some("Q4 results")));
    }

    #[test]
    fn fingerprint_distinguishes_absent_from_empty() {
        assert_eq!(fingerprint(None), None);
        assert!(fingerprint(Some("")).is_some());
        assert_ne!(fingerprint(None), fingerprint(Some("")));
    }

    #[test]
    fn fingerprint_is_256_bit_hex() {
        let print = fingerprint(Some("hello")).unwrap();
        assert_eq!(print.len(), 64);
        assert!(print.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn index_skips_unnamed_records_and_keeps_order() {
        let records = vec![
            doc("3", "a.md", None),
            doc("1", "", Some("x")),
            doc("2", "a.md", None),
        ];
        let buckets = index(&records);
        assert_eq!(buckets.len(), 1);
        let ids: Vec<&str> = buckets["a.md"].iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "2"]);
    }

    #[test]
    fn index_ignores_repeated_ids() {
        let records = vec![doc("1", "a.md", None), doc("1", "a.md", None)];
        assert_eq!(index(&records)["a.md"].len(), 1);
        assert!(duplicate_groups(&records).is_empty());
    }

    #[test]
    fn singletons_are_not_groups() {
        let records = vec![doc("1", "a.md", None), doc("2", "b.md", None)];
        assert!(duplicate_groups(&records).is_empty());
    }

    #[test]
    fn shared_fingerprint_requires_content() {
        let records = vec![doc("1", "a.md", None), doc("2", "a.md", None)];
        let groups = duplicate_groups(&records);
        assert_eq!(groups[0].shared_fingerprint(), None);
        assert_eq!(groups[0].distinct_fingerprints(), 1);

        let records = vec![doc("1", "a.md", Some("")), doc("2", "a.md", Some(""))];
        let groups = duplicate_groups(&records);
        assert!(groups[0].shared_fingerprint().is_some());
    }

    #[test]
    fn shared_fingerprint_none_when_any_member_differs() {
        let records = vec![
            doc("1", "a.md", Some("same")),
            doc("2", "a.md", Some("same")),
            doc("3", "a.md", Some("different")),
        ];
        let groups = duplicate_groups(&records);
        assert_eq!(groups[0].shared_fingerprint(), None);
        assert_eq!(groups[0].distinct_fingerprints(), 2);
    }
}

mod helpers;

use chrono::Duration;
use docsweep::config::SimilarityConfig;
use docsweep::dedup::fingerprint::fingerprint;
use docsweep::dedup::similarity::similarity;
use docsweep::dedup::types::{Decision, DocumentRecord, MatchKind};
use docsweep::dedup::{detect, plan, Mode};
use helpers::{doc, fixed_now, test_settings};
use std::collections::{HashMap, HashSet};

#[test]
fn identical_copies_resolve_with_hash_match_reason() {
    let records = vec![doc("a", "report.md", "Q3 results"), doc("b", "report.md", "Q3 results")];

    let plan = plan(&records, Mode::DryRun, &test_settings());
    let actions = plan.actions();

    assert_eq!(actions.len(), 2);
    assert_eq!(actions[0].decision, Decision::Keep);
    assert_eq!(actions[0].document_id, "a", "tie breaks to lower id");
    assert_eq!(actions[1].decision, Decision::Delete);
    assert!(actions[1].reason.contains("Identical content"));
    assert_eq!(actions[1].match_kind, MatchKind::Exact);
}

#[test]
fn near_duplicates_resolve_heuristically() {
    let records = vec![
        doc("a", "report.md", "Q3 results strong"),
        doc("b", "report.md", "Q3 results strong growth"),
    ];

    let plan = plan(&records, Mode::DryRun, &test_settings());
    let actions = plan.actions();

    // The longer version wins on content length.
    assert_eq!(actions[0].document_id, "b");
    assert_eq!(actions[1].decision, Decision::Delete);
    assert_eq!(actions[1].reason, "Duplicate (kept better version b)");
    assert_eq!(actions[1].match_kind, MatchKind::Heuristic);
    assert!(!actions[1].reason.contains("Identical content"));
    assert!(actions[1].similarity_note.is_some());
}

#[test]
fn high_overlap_is_flagged_for_review_but_still_resolved() {
    let records = vec![
        doc("a", "report.md", "quarterly results were strong this year"),
        doc("b", "report.md", "quarterly results were strong this year overall"),
    ];
    assert!(similarity(records[0].content.as_deref(), records[1].content.as_deref()) >= 0.8);

    let plan = plan(&records, Mode::DryRun, &test_settings());
    let note = plan.actions()[1].similarity_note.as_deref().unwrap();
    assert!(note.contains("review recommended"), "note was: {note}");
    assert_eq!(plan.tally().delete, 1);
}

#[test]
fn dissimilar_same_name_documents_are_still_resolved() {
    let records = vec![doc("a", "report.md", "apples"), doc("b", "report.md", "oranges")];
    assert_eq!(
        similarity(records[0].content.as_deref(), records[1].content.as_deref()),
        0.0
    );

    let plan = plan(&records, Mode::DryRun, &test_settings());
    let tally = plan.tally();
    assert_eq!(tally.keep, 1);
    assert_eq!(tally.delete, 1);
    let note = plan.actions()[1].similarity_note.as_deref().unwrap();
    assert!(!note.contains("review recommended"));
}

#[test]
fn no_shared_names_means_empty_plan() {
    let records = vec![
        doc("a", "one.md", "same"),
        doc("b", "two.md", "same"),
        doc("c", "", "same"),
        doc("d", "", "same"),
    ];
    assert!(detect(&records, &SimilarityConfig::default()).is_empty());
    assert!(plan(&records, Mode::DryRun, &test_settings()).actions().is_empty());
}

#[test]
fn tied_top_scores_keep_lower_id() {
    let records = vec![
        doc("id-9", "notes.md", &"x".repeat(1000)),
        doc("id-2", "notes.md", &"y".repeat(500)),
        doc("id-5", "notes.md", &"z".repeat(1000)),
    ];

    let plan = plan(&records, Mode::DryRun, &test_settings());
    let actions = plan.actions();

    assert_eq!(actions[0].decision, Decision::Keep);
    assert_eq!(actions[0].document_id, "id-5");
    let deleted: HashSet<&str> = actions[1..].iter().map(|a| a.document_id.as_str()).collect();
    assert_eq!(deleted, HashSet::from(["id-9", "id-2"]));
}

#[test]
fn recent_upload_with_metadata_beats_longer_stale_copy() {
    let records = vec![
        DocumentRecord::new("old", "design.md")
            .with_content("x".repeat(2000))
            .with_uploaded_at(fixed_now() - Duration::days(400)),
        DocumentRecord::new("new", "design.md")
            .with_content("x".repeat(1500))
            .with_uploaded_at(fixed_now() - Duration::days(2))
            .with_path("vault/docs/design.md")
            .with_doc_type("md")
            .with_source("obsidian"),
    ];
    let plan = plan(&records, Mode::DryRun, &test_settings());
    assert_eq!(plan.actions()[0].document_id, "new");
}

#[test]
fn planning_is_deterministic() {
    let records = sample_corpus();
    let first = plan(&records, Mode::DryRun, &test_settings());
    let second = plan(&records, Mode::DryRun, &test_settings());
    assert_eq!(first, second);

    let mut reversed = records.clone();
    reversed.reverse();
    let keeps = |records: &[DocumentRecord]| -> HashMap<String, String> {
        plan(records, Mode::DryRun, &test_settings())
            .actions()
            .iter()
            .filter(|a| a.decision == Decision::Keep)
            .map(|a| (a.group_key.clone(), a.document_id.clone()))
            .collect()
    };
    assert_eq!(keeps(&records), keeps(&reversed));
}

#[test]
fn replanning_after_deletes_is_a_no_op() {
    let records = sample_corpus();
    let plan_one = plan(&records, Mode::DryRun, &test_settings());
    let deleted: HashSet<&str> = plan_one
        .actions()
        .iter()
        .filter(|a| a.decision == Decision::Delete)
        .map(|a| a.document_id.as_str())
        .collect();
    assert!(!deleted.is_empty());

    let remaining: Vec<DocumentRecord> = records
        .iter()
        .filter(|r| !deleted.contains(r.id.as_str()))
        .cloned()
        .collect();
    let plan_two = plan(&remaining, Mode::DryRun, &test_settings());
    assert_eq!(plan_two.tally().delete, 0);
}

#[test]
fn one_keep_per_group_and_no_cross_group_actions() {
    let records = sample_corpus();
    let by_id: HashMap<&str, &DocumentRecord> = records.iter().map(|r| (r.id.as_str(), r)).collect();
    let plan = plan(&records, Mode::DryRun, &test_settings());

    let mut keeps_per_group: HashMap<&str, usize> = HashMap::new();
    for action in plan.actions() {
        let record = by_id[action.document_id.as_str()];
        assert_eq!(record.name, action.group_key);
        if action.decision == Decision::Keep {
            *keeps_per_group.entry(action.group_key.as_str()).or_default() += 1;
        }
    }
    assert!(keeps_per_group.values().all(|&n| n == 1));
    assert_eq!(keeps_per_group.len(), detect(&records, &SimilarityConfig::default()).len());
}

#[test]
fn hash_identical_pairs_never_both_kept() {
    let records = sample_corpus();
    let plan = plan(&records, Mode::DryRun, &test_settings());
    let kept: HashSet<&str> = plan
        .actions()
        .iter()
        .filter(|a| a.decision == Decision::Keep)
        .map(|a| a.document_id.as_str())
        .collect();

    for a in &records {
        for b in &records {
            if a.id >= b.id || a.name != b.name || a.name.is_empty() {
                continue;
            }
            let (fa, fb) = (fingerprint(a.content.as_deref()), fingerprint(b.content.as_deref()));
            if fa.is_some() && fa == fb {
                assert!(!(kept.contains(a.id.as_str()) && kept.contains(b.id.as_str())));
            }
        }
    }
}

#[test]
fn absent_content_never_counts_as_exact() {
    let records = vec![DocumentRecord::new("a", "blank.md"), DocumentRecord::new("b", "blank.md")];
    let absent = plan(&records, Mode::DryRun, &test_settings());
    assert_eq!(absent.actions()[1].match_kind, MatchKind::Heuristic);
    assert_eq!(absent.tally().exact_deletes, 0);

    let records = vec![doc("a", "blank.md", ""), doc("b", "blank.md", "  ")];
    let empty = plan(&records, Mode::DryRun, &test_settings());
    assert_eq!(empty.actions()[1].match_kind, MatchKind::Exact);
}

fn sample_corpus() -> Vec<DocumentRecord> {
    vec![
        doc("01", "report.md", "Q3 results"),
        doc("02", "report.md", "Q3 results"),
        doc("03", "report.md", "Q3 results with an appendix of regional numbers"),
        DocumentRecord::new("04", "ideas.md")
            .with_content("ship the importer")
            .with_uploaded_at(fixed_now() - Duration::days(3)),
        DocumentRecord::new("05", "ideas.md")
            .with_content("ship the importer")
            .with_path("/tmp/temp/ideas.md"),
        doc("06", "ideas.md", "unrelated scratch"),
        doc("07", "solo.md", "only one"),
        DocumentRecord::new("08", "empty.md"),
        DocumentRecord::new("09", "empty.md").with_content(""),
        doc("10", "", "unnamed"),
    ]
}

//! Resolution planning: one keep per duplicate group, everything else deleted.
//!
//! Plans come in two shapes. A [`DryRunPlan`] is a report and nothing more; a
//! [`LivePlan`] is the only thing [`super::execute::execute`] accepts, and it can
//! only be produced by calling [`plan`] with [`Mode::Execute`]. There is no
//! conversion from one to the other.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::fingerprint::{duplicate_groups, fingerprint, DuplicateGroup};
use super::rank::rank;
use super::similarity::similarity_with;
use super::types::{Decision, DocumentRecord, MatchKind, ResolutionAction};
use crate::config::{DocsweepConfig, ScoringConfig, SimilarityConfig};

/// Whether a plan may be applied to the store. Defaults to a dry run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    DryRun,
    Execute,
}

/// Everything planning depends on besides the records themselves.
#[derive(Debug, Clone)]
pub struct PlanSettings {
    pub scoring: ScoringConfig,
    pub similarity: SimilarityConfig,
    /// Reference time for recency scoring, fixed once per run.
    pub now: DateTime<Utc>,
}

impl PlanSettings {
    pub fn from_config(config: &DocsweepConfig) -> Self {
        Self {
            scoring: config.scoring.clone(),
            similarity: config.similarity.clone(),
            now: Utc::now(),
        }
    }

    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }
}

impl Default for PlanSettings {
    fn default() -> Self {
        Self {
            scoring: ScoringConfig::default(),
            similarity: SimilarityConfig::default(),
            now: Utc::now(),
        }
    }
}

/// A plan computed for review only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DryRunPlan {
    actions: Vec<ResolutionAction>,
}

/// A plan the caller explicitly asked to apply.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LivePlan {
    actions: Vec<ResolutionAction>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Plan {
    DryRun(DryRunPlan),
    Live(LivePlan),
}

/// Counts over a list of actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PlanTally {
    pub groups: usize,
    pub keep: usize,
    pub delete: usize,
    pub exact_deletes: usize,
}

impl PlanTally {
    pub fn of(actions: &[ResolutionAction]) -> Self {
        let mut tally = Self::default();
        for action in actions {
            match action.decision {
                Decision::Keep => {
                    tally.groups += 1;
                    tally.keep += 1;
                }
                Decision::Delete => {
                    tally.delete += 1;
                    if action.match_kind == MatchKind::Exact {
                        tally.exact_deletes += 1;
                    }
                }
            }
        }
        tally
    }
}

impl DryRunPlan {
    pub fn actions(&self) -> &[ResolutionAction] {
        &self.actions
    }

    pub fn tally(&self) -> PlanTally {
        PlanTally::of(&self.actions)
    }
}

impl LivePlan {
    pub fn actions(&self) -> &[ResolutionAction] {
        &self.actions
    }

    pub fn tally(&self) -> PlanTally {
        PlanTally::of(&self.actions)
    }

    /// Drop heuristic deletions, keeping only hash-matched copies and every keep.
    pub fn exact_only(self) -> LivePlan {
        let actions = self
            .actions
            .into_iter()
            .filter(|a| a.decision == Decision::Keep || a.match_kind == MatchKind::Exact)
            .collect();
        LivePlan { actions }
    }

    pub fn deletions(&self) -> impl Iterator<Item = &ResolutionAction> {
        self.actions.iter().filter(|a| a.decision == Decision::Delete)
    }
}

impl Plan {
    pub fn actions(&self) -> &[ResolutionAction] {
        match self {
            Plan::DryRun(plan) => plan.actions(),
            Plan::Live(plan) => plan.actions(),
        }
    }

    pub fn is_dry_run(&self) -> bool {
        matches!(self, Plan::DryRun(_))
    }

    pub fn tally(&self) -> PlanTally {
        PlanTally::of(self.actions())
    }

    /// The executable plan, or `None` for a dry run.
    pub fn into_live(self) -> Option<LivePlan> {
        match self {
            Plan::Live(plan) => Some(plan),
            Plan::DryRun(_) => None,
        }
    }
}

/// Group, rank, and resolve `records`.
///
/// Pure: the same records and settings always yield the same plan.
pub fn plan(records: &[DocumentRecord], mode: Mode, settings: &PlanSettings) -> Plan {
    let groups = duplicate_groups(records);
    let actions = resolve_groups(&groups, settings);

    tracing::debug!(
        groups = groups.len(),
        actions = actions.len(),
        dry_run = mode == Mode::DryRun,
        "resolution plan computed"
    );

    match mode {
        Mode::DryRun => Plan::DryRun(DryRunPlan { actions }),
        Mode::Execute => Plan::Live(LivePlan { actions }),
    }
}

/// Resolve each group in order; groups with fewer than two members yield nothing.
pub fn resolve_groups(groups: &[DuplicateGroup<'_>], settings: &PlanSettings) -> Vec<ResolutionAction> {
    groups
        .iter()
        .filter(|g| g.members.len() >= 2)
        .flat_map(|g| resolve_group(g, settings))
        .collect()
}

fn resolve_group(group: &DuplicateGroup<'_>, settings: &PlanSettings) -> Vec<ResolutionAction> {
    let ranked = rank(&group.members, &settings.scoring, settings.now);
    let Some((keeper, losers)) = ranked.split_first() else {
        return Vec::new();
    };

    let exact_group = group.shared_fingerprint().is_some();
    let keeper_print = fingerprint(keeper.record.content.as_deref());
    let keep_id = keeper.record.id.as_str();

    let mut actions = Vec::with_capacity(ranked.len());
    actions.push(ResolutionAction {
        document_id: keep_id.to_string(),
        decision: Decision::Keep,
        group_key: group.name.to_string(),
        match_kind: if exact_group {
            MatchKind::Exact
        } else {
            MatchKind::Heuristic
        },
        reason: format!("Best version (score {:.2})", keeper.score),
        similarity_note: None,
    });

    for loser in losers {
        let loser_print = fingerprint(loser.record.content.as_deref());
        let identical = loser_print.is_some() && loser_print == keeper_print;

        let action = if identical {
            ResolutionAction {
                document_id: loser.record.id.clone(),
                decision: Decision::Delete,
                group_key: group.name.to_string(),
                match_kind: MatchKind::Exact,
                reason: format!("Identical content (hash match, kept {keep_id})"),
                similarity_note: None,
            }
        } else {
            let score = similarity_with(
                keeper.record.content.as_deref(),
                loser.record.content.as_deref(),
                settings.similarity.min_token_len,
            );
            ResolutionAction {
                document_id: loser.record.id.clone(),
                decision: Decision::Delete,
                group_key: group.name.to_string(),
                match_kind: MatchKind::Heuristic,
                reason: format!("Duplicate (kept better version {keep_id})"),
                similarity_note: Some(similarity_note(score, settings.similarity.review_threshold)),
            }
        };
        actions.push(action);
    }

    actions
}

fn similarity_note(score: f64, threshold: f64) -> String {
    if score >= threshold {
        format!("similar ({score:.2}), review recommended")
    } else {
        format!("content differs from kept version (similarity {score:.2})")
    }
}

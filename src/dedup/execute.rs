//! Plan execution against a document store.
//!
//! At-most-once: every delete action gets exactly one `delete_by_id` call, no
//! retries. Failures are recorded and the run moves on; callers confirm the final
//! state by running detection again.

use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::plan::LivePlan;
use super::types::{Decision, ExecutionResult, Outcome};
use crate::gateway::DocumentGateway;

/// Outcome of applying a [`LivePlan`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExecutionReport {
    /// One entry per delete that was actually issued, in plan order.
    pub results: Vec<ExecutionResult>,
    pub kept: usize,
    pub deleted: usize,
    pub failed: usize,
    /// Deletes never issued because the run was aborted.
    pub skipped: usize,
}

/// Applies plans with a bounded number of in-flight deletes.
#[derive(Debug, Clone)]
pub struct Executor {
    concurrency: usize,
    abort: Arc<AtomicBool>,
}

impl Executor {
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
            abort: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Setting this flag stops further deletes from being issued. In-flight ones finish.
    pub fn abort_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.abort)
    }

    pub async fn execute(&self, gateway: &dyn DocumentGateway, plan: &LivePlan) -> ExecutionReport {
        let kept = plan
            .actions()
            .iter()
            .filter(|a| a.decision == Decision::Keep)
            .count();

        let issued: Vec<Option<ExecutionResult>> = stream::iter(plan.deletions())
            .map(|action| {
                let abort = Arc::clone(&self.abort);
                async move {
                    if abort.load(Ordering::SeqCst) {
                        return None;
                    }
                    let id = action.document_id.as_str();
                    let result = match gateway.delete_by_id(id).await {
                        Ok(()) => {
                            tracing::info!(id, group = %action.group_key, "deleted duplicate");
                            ExecutionResult {
                                document_id: id.to_string(),
                                outcome: Outcome::Deleted,
                                detail: action.group_key.clone(),
                            }
                        }
                        Err(e) => {
                            tracing::warn!(id, group = %action.group_key, error = %e, "delete failed");
                            ExecutionResult {
                                document_id: id.to_string(),
                                outcome: Outcome::Failed,
                                detail: e.to_string(),
                            }
                        }
                    };
                    Some(result)
                }
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut report = ExecutionReport {
            kept,
            ..ExecutionReport::default()
        };
        for entry in issued {
            match entry {
                Some(result) => {
                    match result.outcome {
                        Outcome::Deleted => report.deleted += 1,
                        Outcome::Failed => report.failed += 1,
                    }
                    report.results.push(result);
                }
                None => report.skipped += 1,
            }
        }

        tracing::info!(
            kept = report.kept,
            deleted = report.deleted,
            failed = report.failed,
            skipped = report.skipped,
            "plan executed"
        );
        report
    }
}

/// Apply `plan` with the given concurrency and no abort handle.
pub async fn execute(
    gateway: &dyn DocumentGateway,
    plan: &LivePlan,
    concurrency: usize,
) -> ExecutionReport {
    Executor::new(concurrency).execute(gateway, plan).await
}

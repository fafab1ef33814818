//! Duplicate resolution engine.
//!
//! Pipeline: fetch → [`fingerprint::index`] → [`rank::rank`] per group →
//! [`plan::plan`] → [`execute::Executor`]. Everything except the fetch and the
//! final deletes is a pure function of the fetched records.

pub mod detect;
pub mod execute;
pub mod fingerprint;
pub mod plan;
pub mod rank;
pub mod similarity;
pub mod types;

pub use detect::detect;
pub use execute::{execute, ExecutionReport, Executor};
pub use plan::{plan, DryRunPlan, LivePlan, Mode, Plan, PlanSettings, PlanTally};

use crate::error::{DocsweepError, DocsweepResult};
use crate::gateway::DocumentGateway;
use types::DocumentRecord;

/// Fetch the candidate set. Failure here is fatal to the run.
pub async fn fetch(
    gateway: &dyn DocumentGateway,
    name_filter: Option<&str>,
) -> DocsweepResult<Vec<DocumentRecord>> {
    let records = gateway
        .fetch_candidates(name_filter)
        .await
        .map_err(DocsweepError::Fetch)?;
    tracing::info!(
        gateway = %gateway.describe(),
        count = records.len(),
        "fetched candidate documents"
    );
    Ok(records)
}

/// Fetch and plan in one step.
pub async fn fetch_and_plan(
    gateway: &dyn DocumentGateway,
    name_filter: Option<&str>,
    mode: Mode,
    settings: &PlanSettings,
) -> DocsweepResult<Plan> {
    let records = fetch(gateway, name_filter).await?;
    Ok(plan(&records, mode, settings))
}

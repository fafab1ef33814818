//! `docsweep resolve`: plan (dry run by default) and optionally apply.

use anyhow::Result;
use std::sync::atomic::Ordering;

use super::{load_candidates, preview};
use docsweep::config::DocsweepConfig;
use docsweep::dedup::types::{Outcome, ResolutionAction};
use docsweep::dedup::{plan, Executor, Mode, Plan, PlanSettings, PlanTally};

pub struct ResolveOptions<'a> {
    pub name: Option<&'a str>,
    pub execute: bool,
    pub exact_only: bool,
    pub json: bool,
    pub concurrency: Option<usize>,
}

pub async fn resolve(config: &DocsweepConfig, opts: ResolveOptions<'_>) -> Result<()> {
    let (gateway, records) = load_candidates(config, opts.name).await?;

    let mode = if opts.execute {
        Mode::Execute
    } else {
        Mode::DryRun
    };
    let settings = PlanSettings::from_config(config);

    match plan(&records, mode, &settings) {
        Plan::DryRun(dry) => {
            if opts.json {
                println!("{}", serde_json::to_string_pretty(&Plan::DryRun(dry))?);
                return Ok(());
            }
            print_actions(dry.actions());
            print_tally(&dry.tally());
            println!();
            println!("Dry run, nothing deleted. Re-run with --execute to apply.");
        }
        Plan::Live(live) => {
            let live = if opts.exact_only { live.exact_only() } else { live };
            if !opts.json {
                print_actions(live.actions());
                print_tally(&live.tally());
                println!();
            }

            let executor = Executor::new(opts.concurrency.unwrap_or(config.execution.concurrency));
            let abort = executor.abort_handle();
            let watcher = tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::warn!("interrupt received, no further deletes will be issued");
                    abort.store(true, Ordering::SeqCst);
                }
            });

            let report = executor.execute(gateway.as_ref(), &live).await;
            watcher.abort();

            if opts.json {
                let out = serde_json::json!({ "plan": Plan::Live(live), "execution": report });
                println!("{}", serde_json::to_string_pretty(&out)?);
                return Ok(());
            }

            for failure in report
                .results
                .iter()
                .filter(|r| r.outcome == Outcome::Failed)
            {
                println!("  failed {}: {}", failure.document_id, failure.detail);
            }
            println!(
                "Kept {}, deleted {}, failed {}{}.",
                report.kept,
                report.deleted,
                report.failed,
                if report.skipped > 0 {
                    format!(", skipped {} (aborted)", report.skipped)
                } else {
                    String::new()
                }
            );
            if report.failed > 0 || report.skipped > 0 {
                println!("Run `docsweep detect` again to confirm the final state.");
            }
        }
    }

    Ok(())
}

fn print_actions(actions: &[ResolutionAction]) {
    if actions.is_empty() {
        println!("No duplicates to resolve.");
        return;
    }

    let mut current_group: Option<&str> = None;
    for action in actions {
        if current_group != Some(action.group_key.as_str()) {
            println!("{} [{}]", action.group_key, action.match_kind);
            current_group = Some(action.group_key.as_str());
        }
        println!(
            "  {:<6} {:<38} {}",
            action.decision,
            action.document_id,
            preview(&action.reason, 80)
        );
        if let Some(note) = &action.similarity_note {
            println!("  {:<6} {:<38} {}", "", "", note);
        }
    }
}

fn print_tally(tally: &PlanTally) {
    println!();
    println!(
        "{} groups: keep {}, delete {} ({} exact, {} heuristic).",
        tally.groups,
        tally.keep,
        tally.delete,
        tally.exact_deletes,
        tally.delete - tally.exact_deletes
    );
}

//! Drives a full run: one cluster at a time, pod sections per scan target,
//! then the cluster's node section.

use std::path::Path;

use tracing::{error, info};

use crate::config::{RunPlan, Settings};
use crate::core::client::usage::{MetricsApi, TopTable, UsageSource};
use crate::core::session::{Credentials, SessionManager};
use crate::domain::model::Report;
use crate::domain::report::{emitter, node_collector, pod_collector};
use crate::errors::AppError;

/// Execute the plan and return the assembled report.
///
/// Failures are isolated per unit of work: an unreachable cluster or a
/// failed namespace section is logged and skipped, and the run moves on.
/// Strict mode turns any such failure into a hard error instead.
pub async fn run(
    sessions: &SessionManager,
    credentials: &Credentials,
    settings: &Settings,
    plan: &RunPlan,
    top_dir: Option<&Path>,
) -> Result<Report, AppError> {
    let mut report = Report::default();

    for cluster_plan in &plan.clusters {
        let cluster = cluster_plan.cluster.as_str();

        let client = match sessions.ensure_active(cluster, credentials).await {
            Ok(client) => client,
            Err(e) => {
                if settings.strict {
                    return Err(e);
                }
                error!("Skipping cluster '{}': {}", cluster, e);
                continue;
            }
        };

        let usage = usage_source(cluster, top_dir)?;

        for target in &cluster_plan.targets {
            let section = pod_collector::collect(
                &client,
                usage.as_ref(),
                settings,
                cluster,
                &target.namespace,
                &target.pattern,
                &mut report,
            )
            .await;
            if let Err(e) = section {
                if settings.strict {
                    return Err(AppError::ExternalCall(format!("{e:#}")));
                }
                error!(
                    "Skipping namespace '{}' on cluster '{}': {:#}",
                    target.namespace, cluster, e
                );
            }
        }

        if let Err(e) = node_collector::collect(
            &client,
            usage.as_ref(),
            settings,
            cluster,
            &mut report,
        )
        .await
        {
            if settings.strict {
                return Err(AppError::ExternalCall(format!("{e:#}")));
            }
            error!("Skipping node section for cluster '{}': {:#}", cluster, e);
        }
    }

    info!(
        "Run complete: {} pod rows, {} node rows, {} exceptions",
        report.pods.len(),
        report.nodes.len(),
        report.exceptions.len()
    );
    Ok(report)
}

/// Execute the plan and write the rendered artifact to `output`.
pub async fn run_to_file(
    sessions: &SessionManager,
    credentials: &Credentials,
    settings: &Settings,
    plan: &RunPlan,
    top_dir: Option<&Path>,
    output: &Path,
) -> Result<Report, AppError> {
    let report = run(sessions, credentials, settings, plan, top_dir).await?;
    emitter::write_to_file(&report, output)
        .map_err(|e| AppError::InternalServerError(format!("{e:#}")))?;
    Ok(report)
}

fn usage_source(cluster: &str, top_dir: Option<&Path>) -> Result<Box<dyn UsageSource>, AppError> {
    match top_dir {
        Some(dir) => {
            let table = TopTable::from_dir(cluster, dir)
                .map_err(|e| AppError::Config(format!("{e:#}")))?;
            Ok(Box::new(table))
        }
        None => Ok(Box::new(MetricsApi)),
    }
}

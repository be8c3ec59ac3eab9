//! Per-cluster node scan: usage quantity and percent-of-allocatable for CPU
//! and memory, with threshold exceptions.

use anyhow::{Context, Result};
use kube::Client;
use tracing::info;

use crate::config::Settings;
use crate::core::client::usage::{NodeUsage, UsageSource};
use crate::domain::model::{ExceptionEntry, NodeRecord, Report};

/// Collect node rows for one cluster. The node listing is authoritative:
/// failure aborts this cluster's node section only.
pub async fn collect(
    client: &Client,
    usage: &dyn UsageSource,
    settings: &Settings,
    cluster: &str,
    report: &mut Report,
) -> Result<()> {
    info!("Collecting node status for cluster '{}'", cluster);

    let nodes = usage
        .node_usage(client)
        .await
        .with_context(|| format!("listing node usage for cluster '{cluster}'"))?;

    for node in nodes {
        let record = to_record(cluster, node);
        if let Some(line) = threshold_exception(&record, settings.usage_threshold_percent) {
            report.exceptions.push(line);
        }
        // The row is written whether or not a threshold tripped.
        report.nodes.push(record);
    }
    Ok(())
}

fn to_record(cluster: &str, node: NodeUsage) -> NodeRecord {
    NodeRecord {
        cluster: cluster.to_string(),
        name: node.name,
        cpu_usage: node.cpu,
        cpu_percent: node.cpu_percent,
        memory_usage: node.memory,
        memory_percent: node.memory_percent,
    }
}

/// One exception line when either percent is at or above the threshold.
fn threshold_exception(record: &NodeRecord, threshold: u32) -> Option<ExceptionEntry> {
    let cpu_hot = record.cpu_percent.is_some_and(|p| p >= threshold);
    let memory_hot = record.memory_percent.is_some_and(|p| p >= threshold);
    if !cpu_hot && !memory_hot {
        return None;
    }
    Some(ExceptionEntry::node(
        &record.cluster,
        &record.name,
        format!(
            "CPU: {}, Memory: {}",
            record.cpu_percent_display(),
            record.memory_percent_display()
        ),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(cpu: Option<u32>, memory: Option<u32>) -> NodeRecord {
        NodeRecord {
            cluster: "c1".into(),
            name: "node-1".into(),
            cpu_usage: "1500m".into(),
            cpu_percent: cpu,
            memory_usage: "2000Mi".into(),
            memory_percent: memory,
        }
    }

    #[test]
    fn hot_cpu_emits_line_with_both_percents() {
        let line = threshold_exception(&node(Some(85), Some(40)), 80).unwrap();
        assert_eq!(line.line, "c1|node-1 -> CPU: 85%, Memory: 40%");
    }

    #[test]
    fn boundary_is_inclusive_at_threshold() {
        assert!(threshold_exception(&node(Some(80), Some(10)), 80).is_some());
        assert!(threshold_exception(&node(Some(10), Some(80)), 80).is_some());
        assert!(threshold_exception(&node(Some(79), Some(79)), 80).is_none());
    }

    #[test]
    fn unknown_percents_never_trip() {
        assert!(threshold_exception(&node(None, None), 80).is_none());
    }
}

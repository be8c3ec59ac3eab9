//! Renders the final tabular artifact.
//!
//! Column order and header text are an external contract: downstream
//! spreadsheets parse this file positionally. Do not reorder or rename.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::domain::model::{NodeRecord, PodRecord, Report};

pub const DELIMITER: char = ';';
pub const FINAL_SECTION_HEADER: &str = "Relatorio Final:";

pub const POD_HEADER: [&str; 22] = [
    "Cluster",
    "Namespace",
    "Pod Name",
    "Status",
    "Creation Time",
    "Recent Change",
    "Error Count",
    "CPU Usage",
    "Memory Usage",
    "CPU Request",
    "Memory Request",
    "CPU Limit",
    "Memory Limit",
    "CPU Usage vs Limit",
    "Memory Usage vs Limit",
    "HPA Enabled",
    "HPA Min Replicas",
    "HPA Max Replicas",
    "HPA Current Replicas",
    "HPA CPU Target",
    "HPA CPU Current",
    "Restart Count",
];

pub const NODE_HEADER: [&str; 6] = [
    "Cluster",
    "Node Name",
    "CPU Usage",
    "CPU Usage %",
    "Memory Usage",
    "Memory Usage %",
];

/// Render the whole artifact: pod section, blank separator row, node
/// section, then the free-text exception block in collection order.
pub fn render(report: &Report) -> String {
    let mut out = String::new();

    out.push_str(&POD_HEADER.join(&DELIMITER.to_string()));
    out.push('\n');
    for pod in &report.pods {
        out.push_str(&pod_row(pod).join(&DELIMITER.to_string()));
        out.push('\n');
    }

    out.push('\n');
    out.push_str(&NODE_HEADER.join(&DELIMITER.to_string()));
    out.push('\n');
    for node in &report.nodes {
        out.push_str(&node_row(node).join(&DELIMITER.to_string()));
        out.push('\n');
    }

    out.push('\n');
    out.push_str(FINAL_SECTION_HEADER);
    out.push('\n');
    for exception in &report.exceptions {
        out.push_str(&exception.line);
        out.push('\n');
    }

    out
}

pub fn write_to_file(report: &Report, path: &Path) -> Result<()> {
    std::fs::write(path, render(report))
        .with_context(|| format!("writing report to {}", path.display()))?;
    info!("Report written to {}", path.display());
    Ok(())
}

fn pod_row(pod: &PodRecord) -> Vec<String> {
    let hpa = pod.hpa.as_ref();
    vec![
        pod.cluster.clone(),
        pod.namespace.clone(),
        pod.name.clone(),
        pod.phase.to_string(),
        pod.creation_time.clone(),
        yes_no(pod.recent_change),
        pod.error_count.to_string(),
        pod.cpu_usage.clone(),
        pod.memory_usage.clone(),
        pod.cpu_request.clone(),
        pod.memory_request.clone(),
        pod.cpu_limit.clone(),
        pod.memory_limit.clone(),
        pod.cpu_usage_vs_limit.clone(),
        pod.memory_usage_vs_limit.clone(),
        yes_no(hpa.is_some()),
        opt_i32(hpa.and_then(|h| h.min_replicas)),
        opt_i32(hpa.and_then(|h| h.max_replicas)),
        opt_i32(hpa.and_then(|h| h.current_replicas)),
        opt_i32(hpa.and_then(|h| h.cpu_target_percent)),
        opt_i32(hpa.and_then(|h| h.cpu_current_percent)),
        pod.restart_count.to_string(),
    ]
}

fn node_row(node: &NodeRecord) -> Vec<String> {
    vec![
        node.cluster.clone(),
        node.name.clone(),
        node.cpu_usage.clone(),
        node.cpu_percent_display(),
        node.memory_usage.clone(),
        node.memory_percent_display(),
    ]
}

fn yes_no(v: bool) -> String {
    if v { "Yes" } else { "No" }.to_string()
}

fn opt_i32(v: Option<i32>) -> String {
    match v {
        Some(v) => v.to_string(),
        None => "N/A".to_string(),
    }
}

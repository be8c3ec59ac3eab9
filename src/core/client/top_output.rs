//! Fallback parser for `top`-style whitespace-tabular output.
//!
//! Operators without metrics-server access can capture `oc adm top pod` /
//! `oc adm top nodes --no-headers` output and feed it to the report run.
//! Column layout is fixed and positional; a malformed line is skipped and
//! reported, never silently ignored.

use anyhow::{anyhow, Result};
use tracing::warn;

use crate::core::client::usage::{NodeUsage, PodUsage};

/// Parse one pod line: `NAME CPU(cores) MEMORY(bytes)`.
pub fn parse_pod_line(line: &str) -> Result<(String, PodUsage)> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 3 {
        return Err(anyhow!("expected 3 columns, got {}: '{}'", fields.len(), line));
    }
    Ok((
        fields[0].to_string(),
        PodUsage {
            cpu: fields[1].to_string(),
            memory: fields[2].to_string(),
        },
    ))
}

/// Parse one node line: `NAME CPU(cores) CPU% MEMORY(bytes) MEMORY%`.
pub fn parse_node_line(line: &str) -> Result<NodeUsage> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 5 {
        return Err(anyhow!("expected 5 columns, got {}: '{}'", fields.len(), line));
    }
    Ok(NodeUsage {
        name: fields[0].to_string(),
        cpu: fields[1].to_string(),
        cpu_percent: Some(parse_percent(fields[2])?),
        memory: fields[3].to_string(),
        memory_percent: Some(parse_percent(fields[4])?),
    })
}

fn parse_percent(field: &str) -> Result<u32> {
    field
        .trim_end_matches('%')
        .parse()
        .map_err(|_| anyhow!("invalid percent field '{}'", field))
}

/// Parse a whole pod table. Malformed lines are skipped with a warning that
/// names the cluster and the offending line; the skip count is reported.
pub fn parse_pod_table(cluster: &str, text: &str) -> Vec<(String, PodUsage)> {
    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        match parse_pod_line(line) {
            Ok(row) => rows.push(row),
            Err(e) => {
                skipped += 1;
                warn!("Cluster '{}': skipping malformed pod line: {}", cluster, e);
            }
        }
    }
    if skipped > 0 {
        warn!("Cluster '{}': skipped {} malformed pod line(s)", cluster, skipped);
    }
    rows
}

/// Parse a whole node table with the same skip-and-report policy.
pub fn parse_node_table(cluster: &str, text: &str) -> Vec<NodeUsage> {
    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        match parse_node_line(line) {
            Ok(row) => rows.push(row),
            Err(e) => {
                skipped += 1;
                warn!("Cluster '{}': skipping malformed node line: {}", cluster, e);
            }
        }
    }
    if skipped > 0 {
        warn!("Cluster '{}': skipped {} malformed node line(s)", cluster, skipped);
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pod_line_is_positional() {
        let (name, usage) = parse_pod_line("web-app-1   200m   500Mi").unwrap();
        assert_eq!(name, "web-app-1");
        assert_eq!(usage.cpu, "200m");
        assert_eq!(usage.memory, "500Mi");
    }

    #[test]
    fn node_line_has_five_fixed_columns() {
        let usage = parse_node_line("node-1  1500m  75%  2000Mi  80%").unwrap();
        assert_eq!(usage.name, "node-1");
        assert_eq!(usage.cpu, "1500m");
        assert_eq!(usage.cpu_percent, Some(75));
        assert_eq!(usage.memory, "2000Mi");
        assert_eq!(usage.memory_percent, Some(80));
    }

    #[test]
    fn malformed_lines_are_skipped_not_fatal() {
        let text = "node-1 1500m 75% 2000Mi 80%\nbroken line\nnode-2 100m 10% 300Mi 12%\n";
        let rows = parse_node_table("c1", text);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "node-1");
        assert_eq!(rows[1].name, "node-2");
    }

    #[test]
    fn bad_percent_is_an_error() {
        assert!(parse_node_line("node-1 1500m wat 2000Mi 80%").is_err());
    }
}

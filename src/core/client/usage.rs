//! Usage-source seam: where live CPU/memory numbers come from.
//!
//! The structured path queries `metrics.k8s.io`; the fallback path replays
//! captured `top` tables. Collectors only see the trait.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use kube::Client;
use tracing::debug;

use crate::core::client::metrics::{fetch_node_metrics, fetch_pod_metrics};
use crate::core::client::nodes::{fetch_nodes, node_allocatable};
use crate::core::client::quantity::{
    format_mebibytes, format_millicores, parse_cpu_millicores, parse_memory_bytes, percent_of,
};
use crate::core::client::top_output::{parse_node_table, parse_pod_table};

/// Live usage of one pod, as unit-suffixed quantity strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodUsage {
    pub cpu: String,
    pub memory: String,
}

/// Live usage of one node, with percent of allocatable when known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeUsage {
    pub name: String,
    pub cpu: String,
    pub cpu_percent: Option<u32>,
    pub memory: String,
    pub memory_percent: Option<u32>,
}

#[async_trait]
pub trait UsageSource: Send + Sync {
    /// Usage snapshot for one pod; Ok(None) when no sample exists.
    async fn pod_usage(
        &self,
        client: &Client,
        namespace: &str,
        pod_name: &str,
    ) -> Result<Option<PodUsage>>;

    /// Usage snapshot for every node in the cluster.
    async fn node_usage(&self, client: &Client) -> Result<Vec<NodeUsage>>;
}

/// Structured source backed by the `metrics.k8s.io` aggregated API.
pub struct MetricsApi;

#[async_trait]
impl UsageSource for MetricsApi {
    async fn pod_usage(
        &self,
        client: &Client,
        namespace: &str,
        pod_name: &str,
    ) -> Result<Option<PodUsage>> {
        let Some(metrics) = fetch_pod_metrics(client, namespace, pod_name).await? else {
            return Ok(None);
        };

        // Pod usage is the sum over containers, like the `top pod` total.
        let mut cpu_millis = 0u64;
        let mut memory_bytes = 0u64;
        for container in &metrics.containers {
            cpu_millis += parse_cpu_millicores(&container.usage.cpu).unwrap_or(0);
            memory_bytes += parse_memory_bytes(&container.usage.memory).unwrap_or(0);
        }

        Ok(Some(PodUsage {
            cpu: format_millicores(cpu_millis),
            memory: format_mebibytes(memory_bytes),
        }))
    }

    async fn node_usage(&self, client: &Client) -> Result<Vec<NodeUsage>> {
        let nodes = fetch_nodes(client).await?;
        let samples: HashMap<String, _> = fetch_node_metrics(client)
            .await?
            .into_iter()
            .map(|m| (m.metadata.name.clone(), m.usage))
            .collect();

        let mut rows = Vec::with_capacity(nodes.len());
        for node in &nodes {
            let Some(name) = node.metadata.name.clone() else { continue };
            let (alloc_cpu, alloc_memory) = node_allocatable(node);

            let row = match samples.get(&name) {
                Some(usage) => {
                    let cpu_millis = parse_cpu_millicores(&usage.cpu);
                    let memory_bytes = parse_memory_bytes(&usage.memory);
                    NodeUsage {
                        name,
                        cpu: cpu_millis.map(format_millicores).unwrap_or_else(na),
                        cpu_percent: join_percent(
                            cpu_millis,
                            alloc_cpu.as_deref().and_then(parse_cpu_millicores),
                        ),
                        memory: memory_bytes.map(format_mebibytes).unwrap_or_else(na),
                        memory_percent: join_percent(
                            memory_bytes,
                            alloc_memory.as_deref().and_then(parse_memory_bytes),
                        ),
                    }
                }
                // Node row is still written when the sample is missing.
                None => NodeUsage {
                    name,
                    cpu: na(),
                    cpu_percent: None,
                    memory: na(),
                    memory_percent: None,
                },
            };
            rows.push(row);
        }
        Ok(rows)
    }
}

fn na() -> String {
    "N/A".to_string()
}

fn join_percent(used: Option<u64>, total: Option<u64>) -> Option<u32> {
    match (used, total) {
        (Some(u), Some(t)) => percent_of(u, t),
        _ => None,
    }
}

/// Fallback source replaying captured `top` tables for one cluster.
///
/// The capture format has no namespace column, so pod samples are keyed by
/// pod name alone: one table covers the pods of a single namespace, or pod
/// names must be unique across the namespaces scanned with it. Capture
/// per-namespace tables when that does not hold.
pub struct TopTable {
    pods: HashMap<String, PodUsage>,
    nodes: Vec<NodeUsage>,
}

impl TopTable {
    pub fn from_text(cluster: &str, pods_text: &str, nodes_text: &str) -> Self {
        let pods = parse_pod_table(cluster, pods_text).into_iter().collect();
        let nodes = parse_node_table(cluster, nodes_text);
        Self { pods, nodes }
    }

    /// Loads `<dir>/<cluster>-pods.txt` and `<dir>/<cluster>-nodes.txt`.
    /// Missing files degrade to empty tables.
    pub fn from_dir(cluster: &str, dir: &Path) -> Result<Self> {
        let pods_path = dir.join(format!("{cluster}-pods.txt"));
        let nodes_path = dir.join(format!("{cluster}-nodes.txt"));
        let pods_text = read_or_empty(&pods_path)
            .with_context(|| format!("reading {}", pods_path.display()))?;
        let nodes_text = read_or_empty(&nodes_path)
            .with_context(|| format!("reading {}", nodes_path.display()))?;
        debug!(
            "Loaded top tables for cluster '{}' from {}",
            cluster,
            dir.display()
        );
        Ok(Self::from_text(cluster, &pods_text, &nodes_text))
    }
}

fn read_or_empty(path: &Path) -> Result<String> {
    if path.exists() {
        Ok(std::fs::read_to_string(path)?)
    } else {
        Ok(String::new())
    }
}

#[async_trait]
impl UsageSource for TopTable {
    async fn pod_usage(
        &self,
        _client: &Client,
        _namespace: &str,
        pod_name: &str,
    ) -> Result<Option<PodUsage>> {
        Ok(self.pods.get(pod_name).cloned())
    }

    async fn node_usage(&self, _client: &Client) -> Result<Vec<NodeUsage>> {
        Ok(self.nodes.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_table_indexes_pods_by_name() {
        let table = TopTable::from_text(
            "c1",
            "web-app-1 200m 500Mi\napi-1 10m 64Mi\n",
            "node-1 1500m 75% 2000Mi 80%\n",
        );
        assert_eq!(
            table.pods.get("web-app-1"),
            Some(&PodUsage {
                cpu: "200m".into(),
                memory: "500Mi".into()
            })
        );
        assert_eq!(table.nodes.len(), 1);
    }

    #[test]
    fn join_percent_needs_both_sides() {
        assert_eq!(join_percent(Some(850), Some(1000)), Some(85));
        assert_eq!(join_percent(Some(850), None), None);
        assert_eq!(join_percent(None, Some(1000)), None);
    }
}

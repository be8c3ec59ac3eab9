use anyhow::Result;
use kube::api::ListParams;
use kube::{Api, Client};
use tracing::debug;

use crate::core::client::kube_resources::Node;

/// Fetch all nodes in the cluster
pub async fn fetch_nodes(client: &Client) -> Result<Vec<Node>> {
    let nodes: Api<Node> = Api::all(client.clone());
    let node_list = nodes.list(&ListParams::default()).await?;

    debug!("Discovered {} node(s)", node_list.items.len());
    Ok(node_list.items)
}

/// Allocatable CPU/memory quantity strings for a node, if present
pub fn node_allocatable(node: &Node) -> (Option<String>, Option<String>) {
    let allocatable = node.status.as_ref().and_then(|s| s.allocatable.as_ref());
    let cpu = allocatable.and_then(|m| m.get("cpu")).map(|q| q.0.clone());
    let memory = allocatable.and_then(|m| m.get("memory")).map(|q| q.0.clone());
    (cpu, memory)
}

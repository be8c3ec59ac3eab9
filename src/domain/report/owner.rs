//! Resolves the deployment-like workload that owns a pod.
//!
//! The ownership chain is walked at most two levels: the pod's controller
//! owner directly, or one replica-set hop up to its own controller owner.
//! This bounds cost to at most one extra API call per pod.

use anyhow::Result;
use kube::Client;
use tracing::debug;

use crate::core::client::kube_resources::{OwnerReference, Pod};
use crate::core::client::workloads::fetch_replica_set_by_name_and_namespace;
use crate::domain::model::WorkloadRef;

const DIRECT_KINDS: [&str; 3] = ["Deployment", "StatefulSet", "DaemonSet"];
const INTERMEDIATE_KIND: &str = "ReplicaSet";

/// What one level of owner-reference inspection tells us.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnerStep {
    Direct(WorkloadRef),
    ViaReplicaSet(String),
    None,
}

/// Single-level inspection of an owner-reference list: only the entry
/// flagged `controller: true` counts.
pub fn classify_owner(refs: Option<&Vec<OwnerReference>>) -> OwnerStep {
    let Some(owner) = refs
        .into_iter()
        .flatten()
        .find(|r| r.controller.unwrap_or(false))
    else {
        return OwnerStep::None;
    };

    if DIRECT_KINDS.contains(&owner.kind.as_str()) {
        return OwnerStep::Direct(WorkloadRef {
            kind: owner.kind.clone(),
            name: owner.name.clone(),
        });
    }
    if owner.kind == INTERMEDIATE_KIND {
        return OwnerStep::ViaReplicaSet(owner.name.clone());
    }
    OwnerStep::None
}

/// Resolve a pod's owning workload: direct controller owner, or exactly one
/// replica-set hop. Deeper chains are not followed.
pub async fn resolve_owner(
    client: &Client,
    namespace: &str,
    pod: &Pod,
) -> Result<Option<WorkloadRef>> {
    match classify_owner(pod.metadata.owner_references.as_ref()) {
        OwnerStep::Direct(workload) => Ok(Some(workload)),
        OwnerStep::ViaReplicaSet(rs_name) => {
            let rs = fetch_replica_set_by_name_and_namespace(client, namespace, &rs_name).await?;
            match classify_owner(rs.metadata.owner_references.as_ref()) {
                OwnerStep::Direct(workload) => Ok(Some(workload)),
                other => {
                    debug!(
                        "Replica set {}/{} has no workload owner ({:?})",
                        namespace, rs_name, other
                    );
                    Ok(None)
                }
            }
        }
        OwnerStep::None => Ok(None),
    }
}

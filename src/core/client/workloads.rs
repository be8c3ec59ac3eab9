use anyhow::Result;
use kube::{Api, Client};
use tracing::debug;

use crate::core::client::kube_resources::ReplicaSet;

/// Fetch a single replica set by name and namespace. Used by the owner
/// resolver for the one intermediate hop from pod to deployment.
pub async fn fetch_replica_set_by_name_and_namespace(
    client: &Client,
    namespace: &str,
    name: &str,
) -> Result<ReplicaSet> {
    let replica_sets: Api<ReplicaSet> = Api::namespaced(client.clone(), namespace);
    let rs = replica_sets.get(name).await?;

    debug!("Fetched replica set: {}/{}", namespace, name);
    Ok(rs)
}

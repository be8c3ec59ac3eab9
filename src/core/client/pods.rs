use anyhow::Result;
use kube::api::{AttachParams, DeleteParams, ListParams, LogParams};
use kube::{Api, Client};
use tokio::io::AsyncReadExt;
use tracing::debug;

use crate::core::client::kube_resources::Pod;

/// Fetch pods in a specific namespace
pub async fn fetch_pods_by_namespace(client: &Client, namespace: &str) -> Result<Vec<Pod>> {
    let pods: Api<Pod> = Api::namespaced(client.clone(), namespace);
    let pod_list = pods.list(&ListParams::default()).await?;

    debug!("Discovered {} pod(s) in namespace '{}'", pod_list.items.len(), namespace);
    Ok(pod_list.items)
}

/// Fetch the full log dump of a pod (first container, no tailing)
pub async fn fetch_pod_logs(client: &Client, namespace: &str, pod_name: &str) -> Result<String> {
    let pods: Api<Pod> = Api::namespaced(client.clone(), namespace);
    let logs = pods.logs(pod_name, &LogParams::default()).await?;

    debug!("Fetched {} log byte(s) for {}/{}", logs.len(), namespace, pod_name);
    Ok(logs)
}

/// Delete a pod by name and namespace
pub async fn delete_pod(client: &Client, namespace: &str, pod_name: &str) -> Result<()> {
    let pods: Api<Pod> = Api::namespaced(client.clone(), namespace);
    pods.delete(pod_name, &DeleteParams::default()).await?;

    debug!("Deleted pod: {}/{}", namespace, pod_name);
    Ok(())
}

/// Run a command inside a pod and capture its stdout. Used for connectivity
/// probes from the web surface.
pub async fn exec_in_pod(
    client: &Client,
    namespace: &str,
    pod_name: &str,
    command: Vec<String>,
) -> Result<String> {
    let pods: Api<Pod> = Api::namespaced(client.clone(), namespace);
    let mut attached = pods
        .exec(pod_name, command, &AttachParams::default().stderr(false))
        .await?;

    let mut stdout = attached
        .stdout()
        .ok_or_else(|| anyhow::anyhow!("exec on {}/{} produced no stdout stream", namespace, pod_name))?;
    let mut buf = Vec::new();
    stdout.read_to_end(&mut buf).await?;
    attached.join().await?;

    debug!("Exec in {}/{} returned {} byte(s)", namespace, pod_name, buf.len());
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

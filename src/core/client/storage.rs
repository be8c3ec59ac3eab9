use anyhow::Result;
use kube::api::ListParams;
use kube::{Api, Client};
use tracing::debug;

use crate::core::client::kube_resources::PersistentVolumeClaim;

/// Fetch persistent volume claims in a specific namespace
pub async fn fetch_persistent_volume_claims_by_namespace(
    client: &Client,
    namespace: &str,
) -> Result<Vec<PersistentVolumeClaim>> {
    let pvcs: Api<PersistentVolumeClaim> = Api::namespaced(client.clone(), namespace);
    let pvc_list = pvcs.list(&ListParams::default()).await?;

    debug!(
        "Discovered {} persistent volume claim(s) in namespace '{}'",
        pvc_list.items.len(),
        namespace
    );
    Ok(pvc_list.items)
}

use anyhow::Result;
use kube::api::ListParams;
use kube::{Api, Client};
use tracing::debug;

use crate::core::client::kube_resources::HorizontalPodAutoscaler;

/// Fetch horizontal pod autoscalers in a specific namespace
pub async fn fetch_autoscalers_by_namespace(
    client: &Client,
    namespace: &str,
) -> Result<Vec<HorizontalPodAutoscaler>> {
    let hpas: Api<HorizontalPodAutoscaler> = Api::namespaced(client.clone(), namespace);
    let hpa_list = hpas.list(&ListParams::default()).await?;

    debug!(
        "Discovered {} autoscaler(s) in namespace '{}'",
        hpa_list.items.len(),
        namespace
    );
    Ok(hpa_list.items)
}

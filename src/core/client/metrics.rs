//! Raw access to the `metrics.k8s.io` aggregated API.
//!
//! The metrics API is not part of k8s-openapi, so responses are fetched
//! through the client's raw request path and deserialized into the small
//! DTOs below.

use anyhow::Result;
use http::{Method, Request as HttpRequest};
use kube::Client;
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsObjectMeta {
    pub name: String,
    #[serde(default)]
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResourceUsage {
    pub cpu: String,
    pub memory: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContainerMetrics {
    pub name: String,
    pub usage: ResourceUsage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PodMetrics {
    pub metadata: MetricsObjectMeta,
    pub containers: Vec<ContainerMetrics>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeMetrics {
    pub metadata: MetricsObjectMeta,
    pub usage: ResourceUsage,
}

#[derive(Debug, Deserialize)]
struct MetricsList<T> {
    items: Vec<T>,
}

/// Fetch the live metrics snapshot for one pod. Ok(None) when the metrics
/// API has no sample for it (or metrics-server is absent).
pub async fn fetch_pod_metrics(
    client: &Client,
    namespace: &str,
    pod_name: &str,
) -> Result<Option<PodMetrics>> {
    let url = format!(
        "/apis/metrics.k8s.io/v1beta1/namespaces/{}/pods/{}",
        namespace, pod_name
    );
    match request_json::<PodMetrics>(client, &url).await {
        Ok(metrics) => {
            debug!("Fetched metrics for pod {}/{}", namespace, pod_name);
            Ok(Some(metrics))
        }
        Err(kube::Error::Api(ae)) if ae.code == 404 => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Fetch the metrics snapshot for all nodes. Ok(empty) when metrics-server
/// is absent.
pub async fn fetch_node_metrics(client: &Client) -> Result<Vec<NodeMetrics>> {
    let url = "/apis/metrics.k8s.io/v1beta1/nodes";
    match request_json::<MetricsList<NodeMetrics>>(client, url).await {
        Ok(list) => {
            debug!("Fetched metrics for {} node(s)", list.items.len());
            Ok(list.items)
        }
        Err(kube::Error::Api(ae)) if ae.code == 404 => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}

async fn request_json<T>(client: &Client, url: &str) -> Result<T, kube::Error>
where
    T: serde::de::DeserializeOwned,
{
    let req = HttpRequest::builder()
        .method(Method::GET)
        .uri(url)
        .body(Vec::new())
        .map_err(kube::Error::HttpError)?;

    let body = client.request_text(req).await?;
    serde_json::from_str(&body).map_err(kube::Error::SerdeError)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pod_metrics_deserializes() {
        let body = r#"{
            "metadata": {"name": "web-app-1", "namespace": "ns1"},
            "containers": [
                {"name": "web", "usage": {"cpu": "156325041n", "memory": "131072Ki"}}
            ]
        }"#;
        let metrics: PodMetrics = serde_json::from_str(body).unwrap();
        assert_eq!(metrics.metadata.name, "web-app-1");
        assert_eq!(metrics.containers[0].usage.cpu, "156325041n");
    }

    #[test]
    fn node_metrics_list_deserializes() {
        let body = r#"{
            "items": [
                {"metadata": {"name": "node-1"}, "usage": {"cpu": "1500m", "memory": "2000Mi"}}
            ]
        }"#;
        let list: MetricsList<NodeMetrics> = serde_json::from_str(body).unwrap();
        assert_eq!(list.items.len(), 1);
        assert_eq!(list.items[0].metadata.name, "node-1");
    }
}

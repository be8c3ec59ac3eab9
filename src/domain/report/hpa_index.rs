//! Lookup from scale target to autoscaler, built once per namespace scan.

use std::collections::HashMap;

use crate::core::client::kube_resources::HorizontalPodAutoscaler;
use crate::domain::model::AutoscalerSummary;

pub struct HpaIndex {
    by_target: HashMap<(String, String), AutoscalerSummary>,
    all: Vec<AutoscalerSummary>,
}

impl HpaIndex {
    pub fn build(autoscalers: Vec<HorizontalPodAutoscaler>) -> Self {
        let all: Vec<AutoscalerSummary> = autoscalers.iter().map(summarize).collect();
        let by_target = all
            .iter()
            .map(|s| ((s.target_kind.clone(), s.target_name.clone()), s.clone()))
            .collect();
        Self { by_target, all }
    }

    /// O(1) lookup by the scale target's kind and name.
    pub fn lookup(&self, kind: &str, name: &str) -> Option<&AutoscalerSummary> {
        self.by_target.get(&(kind.to_string(), name.to_string()))
    }

    /// Legacy matching policy: the autoscaler's own name contains the pod
    /// name. Kept behind the `pod-name` strategy setting.
    pub fn lookup_by_pod_name(&self, pod_name: &str) -> Option<&AutoscalerSummary> {
        self.all.iter().find(|s| s.name.contains(pod_name))
    }
}

fn summarize(hpa: &HorizontalPodAutoscaler) -> AutoscalerSummary {
    let spec = hpa.spec.as_ref();
    let status = hpa.status.as_ref();
    let target = spec.map(|s| &s.scale_target_ref);

    // Missing optional fields become "N/A" downstream, never an error.
    AutoscalerSummary {
        name: hpa.metadata.name.clone().unwrap_or_default(),
        target_kind: target.map(|t| t.kind.clone()).unwrap_or_default(),
        target_name: target.map(|t| t.name.clone()).unwrap_or_default(),
        min_replicas: spec.and_then(|s| s.min_replicas),
        max_replicas: spec.map(|s| s.max_replicas),
        current_replicas: status.map(|s| s.current_replicas),
        cpu_target_percent: spec.and_then(|s| s.target_cpu_utilization_percentage),
        cpu_current_percent: status.and_then(|s| s.current_cpu_utilization_percentage),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::autoscaling::v1::{
        CrossVersionObjectReference, HorizontalPodAutoscalerSpec, HorizontalPodAutoscalerStatus,
    };
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    fn hpa(name: &str, target_kind: &str, target_name: &str) -> HorizontalPodAutoscaler {
        HorizontalPodAutoscaler {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                ..Default::default()
            },
            spec: Some(HorizontalPodAutoscalerSpec {
                min_replicas: Some(1),
                max_replicas: 5,
                scale_target_ref: CrossVersionObjectReference {
                    kind: target_kind.to_string(),
                    name: target_name.to_string(),
                    api_version: None,
                },
                target_cpu_utilization_percentage: Some(70),
            }),
            status: Some(HorizontalPodAutoscalerStatus {
                current_replicas: 3,
                desired_replicas: 3,
                current_cpu_utilization_percentage: Some(55),
                last_scale_time: None,
                observed_generation: None,
            }),
        }
    }

    #[test]
    fn lookup_by_scale_target_identity() {
        let index = HpaIndex::build(vec![hpa("web-hpa", "Deployment", "web")]);
        let found = index.lookup("Deployment", "web").unwrap();
        assert_eq!(found.min_replicas, Some(1));
        assert_eq!(found.max_replicas, Some(5));
        assert_eq!(found.current_replicas, Some(3));
        assert_eq!(found.cpu_target_percent, Some(70));
        assert_eq!(found.cpu_current_percent, Some(55));
        assert!(index.lookup("Deployment", "api").is_none());
        assert!(index.lookup("StatefulSet", "web").is_none());
    }

    #[test]
    fn legacy_lookup_matches_substring_of_hpa_name() {
        let index = HpaIndex::build(vec![hpa("web-hpa", "Deployment", "web")]);
        assert!(index.lookup_by_pod_name("web").is_some());
        assert!(index.lookup_by_pod_name("web-app-1").is_none());
    }

    #[test]
    fn missing_optional_fields_stay_none() {
        let mut h = hpa("web-hpa", "Deployment", "web");
        h.spec.as_mut().unwrap().target_cpu_utilization_percentage = None;
        h.status = None;
        let index = HpaIndex::build(vec![h]);
        let found = index.lookup("Deployment", "web").unwrap();
        assert_eq!(found.cpu_target_percent, None);
        assert_eq!(found.current_replicas, None);
        assert_eq!(found.cpu_current_percent, None);
    }
}

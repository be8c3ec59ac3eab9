/// Re-export commonly used Kubernetes resource types from k8s-openapi
/// This module provides a centralized place for all K8s resource types

pub use k8s_openapi::api::core::v1::{Node, PersistentVolumeClaim, Pod};

pub use k8s_openapi::api::apps::v1::ReplicaSet;

pub use k8s_openapi::api::autoscaling::v1::HorizontalPodAutoscaler;

pub use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;

// Kube-rs based Kubernetes client
pub mod autoscalers;
pub mod kube_resources;
pub mod metrics;
pub mod nodes;
pub mod pods;
pub mod quantity;
pub mod storage;
pub mod top_output;
pub mod usage;
pub mod workloads;

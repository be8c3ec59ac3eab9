use std::env;
use std::str::FromStr;

use tracing::warn;

use crate::errors::AppError;

/// How a pod gets linked to an autoscaler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HpaMatchStrategy {
    /// Match the autoscaler whose scale target is the pod's resolved owning
    /// workload. Default, and a behavior change from the legacy variant.
    #[default]
    OwnerIdentity,
    /// Legacy variant: the autoscaler's own name contains the pod name.
    PodNameSubstring,
}

impl FromStr for HpaMatchStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "owner" | "owner-identity" => Ok(Self::OwnerIdentity),
            "pod-name" | "pod-name-substring" => Ok(Self::PodNameSubstring),
            other => Err(format!("unknown HPA match strategy '{other}'")),
        }
    }
}

/// Runtime settings, read once from the environment (`FLEETSTATUS_*`).
#[derive(Debug, Clone)]
pub struct Settings {
    /// Fixed domain used to derive API endpoints: `https://api.<cluster>.<domain>:6443`
    pub api_domain: String,
    /// TLS verification is disabled against the cluster endpoints unless this
    /// is set to false. Mirrors the historical login flags.
    pub insecure_tls: bool,
    /// Threshold (percent) above which CPU/memory records produce exception lines.
    pub usage_threshold_percent: u32,
    /// Literal marker counted in pod logs as an error occurrence.
    pub log_error_marker: String,
    /// When set, an exception line is emitted for pods whose log error count
    /// exceeds this value.
    pub log_error_threshold: Option<u64>,
    pub hpa_match: HpaMatchStrategy,
    /// Fail-fast mode: per-pod fetch failures abort the run instead of
    /// degrading to "N/A".
    pub strict: bool,
    /// Sum requests/limits across all containers instead of reading only the
    /// first one.
    pub aggregate_containers: bool,
    pub port: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_domain: "producao.ibm.cloud".to_string(),
            insecure_tls: true,
            usage_threshold_percent: 80,
            log_error_marker: "ERRO".to_string(),
            log_error_threshold: Some(2000),
            hpa_match: HpaMatchStrategy::default(),
            strict: false,
            aggregate_containers: false,
            port: 8080,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_domain: env_or("FLEETSTATUS_API_DOMAIN", defaults.api_domain),
            insecure_tls: env_parsed("FLEETSTATUS_INSECURE_TLS", defaults.insecure_tls),
            usage_threshold_percent: env_parsed(
                "FLEETSTATUS_USAGE_THRESHOLD",
                defaults.usage_threshold_percent,
            ),
            log_error_marker: env_or("FLEETSTATUS_LOG_ERROR_MARKER", defaults.log_error_marker),
            log_error_threshold: match env::var("FLEETSTATUS_LOG_ERROR_THRESHOLD") {
                Ok(v) if v.eq_ignore_ascii_case("off") => None,
                Ok(v) => match v.parse() {
                    Ok(n) => Some(n),
                    Err(_) => {
                        warn!("Invalid FLEETSTATUS_LOG_ERROR_THRESHOLD '{}', using default", v);
                        defaults.log_error_threshold
                    }
                },
                Err(_) => defaults.log_error_threshold,
            },
            hpa_match: env_parsed("FLEETSTATUS_HPA_MATCH", defaults.hpa_match),
            strict: env_parsed("FLEETSTATUS_STRICT", defaults.strict),
            aggregate_containers: env_parsed(
                "FLEETSTATUS_AGGREGATE_CONTAINERS",
                defaults.aggregate_containers,
            ),
            port: env_parsed("FLEETSTATUS_PORT", defaults.port),
        }
    }

    /// API endpoint derived from the cluster name.
    pub fn api_url(&self, cluster: &str) -> String {
        format!("https://api.{}.{}:6443", cluster, self.api_domain)
    }
}

fn env_or(key: &str, default: String) -> String {
    env::var(key).unwrap_or(default)
}

fn env_parsed<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    match env::var(key) {
        Ok(v) => match v.parse() {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!("Invalid value '{}' for {}, using default", v, key);
                default
            }
        },
        Err(_) => default,
    }
}

/// One namespace scan: which namespace to list and which pod-name substring
/// to keep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanTarget {
    pub namespace: String,
    pub pattern: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterPlan {
    pub cluster: String,
    pub targets: Vec<ScanTarget>,
}

/// The full run: one entry per cluster, positionally aligned namespace and
/// pattern groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    pub clusters: Vec<ClusterPlan>,
}

impl RunPlan {
    /// Parses the three list arguments: clusters comma-separated, namespace
    /// and pattern groups semicolon-separated (one group per cluster, commas
    /// within a group). Mismatched cardinalities are a fatal ConfigError;
    /// nothing external is contacted afterwards.
    pub fn parse(clusters: &str, namespaces: &str, patterns: &str) -> Result<Self, AppError> {
        let cluster_names: Vec<&str> = clusters.split(',').map(str::trim).collect();
        let ns_groups: Vec<&str> = namespaces.split(';').collect();
        let pattern_groups: Vec<&str> = patterns.split(';').collect();

        if cluster_names.len() != ns_groups.len() || ns_groups.len() != pattern_groups.len() {
            return Err(AppError::Config(
                "the number of clusters, namespace groups and pattern groups must be equal"
                    .to_string(),
            ));
        }

        let mut plans = Vec::with_capacity(cluster_names.len());
        for ((cluster, ns_group), pattern_group) in cluster_names
            .iter()
            .zip(ns_groups.iter())
            .zip(pattern_groups.iter())
        {
            let ns_list: Vec<&str> = ns_group.split(',').map(str::trim).collect();
            let pattern_list: Vec<&str> = pattern_group.split(',').map(str::trim).collect();
            if ns_list.len() != pattern_list.len() {
                return Err(AppError::Config(format!(
                    "cluster '{}': {} namespaces but {} patterns",
                    cluster,
                    ns_list.len(),
                    pattern_list.len()
                )));
            }
            let targets = ns_list
                .iter()
                .zip(pattern_list.iter())
                .map(|(ns, pattern)| ScanTarget {
                    namespace: ns.to_string(),
                    pattern: pattern.to_string(),
                })
                .collect();
            plans.push(ClusterPlan {
                cluster: cluster.to_string(),
                targets,
            });
        }

        Ok(Self { clusters: plans })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_aligned_lists() {
        let plan = RunPlan::parse("c1,c2", "ns1,ns2;ns3", "web,api;worker").unwrap();
        assert_eq!(plan.clusters.len(), 2);
        assert_eq!(plan.clusters[0].cluster, "c1");
        assert_eq!(
            plan.clusters[0].targets,
            vec![
                ScanTarget {
                    namespace: "ns1".into(),
                    pattern: "web".into()
                },
                ScanTarget {
                    namespace: "ns2".into(),
                    pattern: "api".into()
                },
            ]
        );
        assert_eq!(plan.clusters[1].targets.len(), 1);
    }

    #[test]
    fn rejects_mismatched_group_counts() {
        // 2 clusters, 1 namespace group
        let err = RunPlan::parse("c1,c2", "ns1", "web;api").unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn rejects_mismatch_within_group() {
        let err = RunPlan::parse("c1", "ns1,ns2", "web").unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn hpa_strategy_from_str() {
        assert_eq!(
            "owner".parse::<HpaMatchStrategy>().unwrap(),
            HpaMatchStrategy::OwnerIdentity
        );
        assert_eq!(
            "pod-name".parse::<HpaMatchStrategy>().unwrap(),
            HpaMatchStrategy::PodNameSubstring
        );
        assert!("glob".parse::<HpaMatchStrategy>().is_err());
    }

    #[test]
    fn api_url_follows_cluster_template() {
        let settings = Settings::default();
        assert_eq!(
            settings.api_url("c1"),
            "https://api.c1.producao.ibm.cloud:6443"
        );
    }
}

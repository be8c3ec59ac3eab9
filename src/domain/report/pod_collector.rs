//! Per-namespace pod scan: list, filter by name substring, enrich each pod
//! with status, age, log error count, live usage, requests/limits, owning
//! workload and autoscaler linkage.

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use kube::Client;
use tracing::{info, warn};

use crate::config::{HpaMatchStrategy, Settings};
use crate::core::client::autoscalers::fetch_autoscalers_by_namespace;
use crate::core::client::kube_resources::Pod;
use crate::core::client::pods::{fetch_pod_logs, fetch_pods_by_namespace};
use crate::core::client::quantity::{
    format_mebibytes, format_millicores, parse_cpu_millicores, parse_memory_bytes, usage_vs_limit,
};
use crate::core::client::usage::UsageSource;
use crate::domain::model::{ExceptionEntry, PodPhase, PodRecord, Report};
use crate::domain::report::hpa_index::HpaIndex;
use crate::domain::report::owner::resolve_owner;

const RECENT_CHANGE_WINDOW_SECS: i64 = 86_400;

/// Scan one (cluster, namespace, pattern) triple and append the resulting
/// rows and exception lines to the report. An error here aborts only this
/// section; the runner isolates it from other clusters.
pub async fn collect(
    client: &Client,
    usage: &dyn UsageSource,
    settings: &Settings,
    cluster: &str,
    namespace: &str,
    pattern: &str,
    report: &mut Report,
) -> Result<()> {
    info!(
        "Collecting pods: cluster '{}', namespace '{}', pattern '{}'",
        cluster, namespace, pattern
    );

    // Authoritative listings: failure aborts this cluster+namespace section.
    let autoscalers = fetch_autoscalers_by_namespace(client, namespace)
        .await
        .with_context(|| format!("listing autoscalers in '{namespace}'"))?;
    let index = HpaIndex::build(autoscalers);
    let pods = fetch_pods_by_namespace(client, namespace)
        .await
        .with_context(|| format!("listing pods in '{namespace}'"))?;

    let now = Utc::now();
    for pod in pods {
        let Some(name) = pod.metadata.name.clone() else { continue };
        if !matches_pattern(&name, pattern) {
            continue;
        }
        let record =
            assemble_record(client, usage, settings, &index, cluster, namespace, &name, &pod, now)
                .await?;
        push_exceptions(&record, settings, &mut report.exceptions);
        report.pods.push(record);
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn assemble_record(
    client: &Client,
    usage: &dyn UsageSource,
    settings: &Settings,
    index: &HpaIndex,
    cluster: &str,
    namespace: &str,
    name: &str,
    pod: &Pod,
    now: DateTime<Utc>,
) -> Result<PodRecord> {
    let phase = pod
        .status
        .as_ref()
        .and_then(|s| s.phase.as_deref())
        .map(PodPhase::parse)
        .unwrap_or(PodPhase::Unknown);

    let created = pod.metadata.creation_timestamp.as_ref().map(|t| t.0);
    let creation_time = created
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|| "N/A".to_string());
    let recent_change = created.map(|t| is_recent(t, now)).unwrap_or(false);

    // Cosmetic fetches degrade to 0/"N/A" unless strict mode is on.
    let error_count = match fetch_pod_logs(client, namespace, name).await {
        Ok(logs) => count_marker(&logs, &settings.log_error_marker),
        Err(e) if settings.strict => {
            return Err(e).with_context(|| format!("fetching logs of {namespace}/{name}"))
        }
        Err(e) => {
            warn!("Logs unavailable for {}/{}: {:#}", namespace, name, e);
            0
        }
    };

    let (cpu_usage, memory_usage) = match usage.pod_usage(client, namespace, name).await {
        Ok(Some(u)) => (u.cpu, u.memory),
        Ok(None) => ("N/A".to_string(), "N/A".to_string()),
        Err(e) if settings.strict => {
            return Err(e).with_context(|| format!("fetching usage of {namespace}/{name}"))
        }
        Err(e) => {
            warn!("Usage unavailable for {}/{}: {:#}", namespace, name, e);
            ("N/A".to_string(), "N/A".to_string())
        }
    };

    let resources = container_resources(pod, settings.aggregate_containers);

    let owner = match resolve_owner(client, namespace, pod).await {
        Ok(owner) => owner,
        Err(e) if settings.strict => {
            return Err(e).with_context(|| format!("resolving owner of {namespace}/{name}"))
        }
        Err(e) => {
            warn!("Owner unresolved for {}/{}: {:#}", namespace, name, e);
            None
        }
    };

    let hpa = match settings.hpa_match {
        HpaMatchStrategy::OwnerIdentity => owner
            .as_ref()
            .and_then(|w| index.lookup(&w.kind, &w.name))
            .cloned(),
        HpaMatchStrategy::PodNameSubstring => index.lookup_by_pod_name(name).cloned(),
    };

    let cpu_usage_vs_limit = usage_vs_limit(&cpu_usage, &resources.cpu_limit, parse_cpu_millicores);
    let memory_usage_vs_limit =
        usage_vs_limit(&memory_usage, &resources.memory_limit, parse_memory_bytes);

    Ok(PodRecord {
        cluster: cluster.to_string(),
        namespace: namespace.to_string(),
        name: name.to_string(),
        phase,
        creation_time,
        recent_change,
        error_count,
        cpu_usage,
        memory_usage,
        cpu_request: resources.cpu_request,
        memory_request: resources.memory_request,
        cpu_limit: resources.cpu_limit,
        memory_limit: resources.memory_limit,
        cpu_usage_vs_limit,
        memory_usage_vs_limit,
        owner,
        hpa,
        restart_count: first_container_restarts(pod),
    })
}

/// Keep/skip decision for the namespace scan: plain substring containment,
/// not a glob or regex. The empty pattern keeps every pod.
pub fn matches_pattern(name: &str, pattern: &str) -> bool {
    name.contains(pattern)
}

/// Age under 24h, boundary exclusive: exactly 86400s old is not recent.
pub fn is_recent(created: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    (now - created).num_seconds() < RECENT_CHANGE_WINDOW_SECS
}

/// Occurrences of the error marker in a full log dump.
pub fn count_marker(logs: &str, marker: &str) -> u64 {
    if marker.is_empty() {
        return 0;
    }
    logs.matches(marker).count() as u64
}

/// Restart count of container index 0; pods without container statuses
/// (e.g. still Pending) count as zero.
pub fn first_container_restarts(pod: &Pod) -> i32 {
    pod.status
        .as_ref()
        .and_then(|s| s.container_statuses.as_ref())
        .and_then(|cs| cs.first())
        .map(|c| c.restart_count)
        .unwrap_or(0)
}

pub struct ContainerResources {
    pub cpu_request: String,
    pub memory_request: String,
    pub cpu_limit: String,
    pub memory_limit: String,
}

/// Requests/limits from the first container only (documented limitation), or
/// summed across containers when aggregation is enabled.
pub fn container_resources(pod: &Pod, aggregate: bool) -> ContainerResources {
    let containers = pod.spec.as_ref().map(|s| s.containers.as_slice()).unwrap_or(&[]);

    if !aggregate {
        let resources = containers.first().and_then(|c| c.resources.as_ref());
        let field = |map: Option<&std::collections::BTreeMap<String, k8s_openapi::apimachinery::pkg::api::resource::Quantity>>,
                     key: &str| {
            map.and_then(|m| m.get(key))
                .map(|q| q.0.clone())
                .unwrap_or_else(|| "N/A".to_string())
        };
        let requests = resources.and_then(|r| r.requests.as_ref());
        let limits = resources.and_then(|r| r.limits.as_ref());
        return ContainerResources {
            cpu_request: field(requests, "cpu"),
            memory_request: field(requests, "memory"),
            cpu_limit: field(limits, "cpu"),
            memory_limit: field(limits, "memory"),
        };
    }

    let mut sums = [None::<u64>; 4]; // cpu_req, mem_req, cpu_lim, mem_lim
    for container in containers {
        let Some(resources) = container.resources.as_ref() else { continue };
        let pick = |map: Option<&std::collections::BTreeMap<String, k8s_openapi::apimachinery::pkg::api::resource::Quantity>>,
                    key: &str,
                    parse: fn(&str) -> Option<u64>| {
            map.and_then(|m| m.get(key)).and_then(|q| parse(&q.0))
        };
        let values = [
            pick(resources.requests.as_ref(), "cpu", parse_cpu_millicores),
            pick(resources.requests.as_ref(), "memory", parse_memory_bytes),
            pick(resources.limits.as_ref(), "cpu", parse_cpu_millicores),
            pick(resources.limits.as_ref(), "memory", parse_memory_bytes),
        ];
        for (sum, value) in sums.iter_mut().zip(values) {
            if let Some(v) = value {
                *sum = Some(sum.unwrap_or(0) + v);
            }
        }
    }
    let render_cpu = |v: Option<u64>| v.map(format_millicores).unwrap_or_else(|| "N/A".to_string());
    let render_mem = |v: Option<u64>| v.map(format_mebibytes).unwrap_or_else(|| "N/A".to_string());
    ContainerResources {
        cpu_request: render_cpu(sums[0]),
        memory_request: render_mem(sums[1]),
        cpu_limit: render_cpu(sums[2]),
        memory_limit: render_mem(sums[3]),
    }
}

/// Threshold checks are independent: one pod can contribute several lines.
pub fn push_exceptions(record: &PodRecord, settings: &Settings, sink: &mut Vec<ExceptionEntry>) {
    if let Some(hpa) = &record.hpa {
        if let Some(current) = hpa.cpu_current_percent {
            if current >= settings.usage_threshold_percent as i32 {
                sink.push(ExceptionEntry::pod(
                    &record.cluster,
                    &record.namespace,
                    &record.name,
                    format!("{current}%"),
                ));
            }
        }
    }
    if !record.phase.is_running() {
        sink.push(ExceptionEntry::pod(
            &record.cluster,
            &record.namespace,
            &record.name,
            &record.phase,
        ));
    }
    if record.restart_count > 0 {
        sink.push(ExceptionEntry::pod(
            &record.cluster,
            &record.namespace,
            &record.name,
            format!("{} reinicializacoes", record.restart_count),
        ));
    }
    if let Some(threshold) = settings.log_error_threshold {
        if record.error_count > threshold {
            sink.push(ExceptionEntry::pod(
                &record.cluster,
                &record.namespace,
                &record.name,
                format!("{} erros no log", record.error_count),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::AutoscalerSummary;
    use chrono::Duration;
    use k8s_openapi::api::core::v1::{ContainerStatus, PodSpec, PodStatus};
    use k8s_openapi::apimachinery::pkg::api::resource::Quantity;

    fn record(phase: PodPhase, restarts: i32) -> PodRecord {
        PodRecord {
            cluster: "c1".into(),
            namespace: "ns1".into(),
            name: "web-app-1".into(),
            phase,
            creation_time: "2024-01-01T00:00:00Z".into(),
            recent_change: true,
            error_count: 0,
            cpu_usage: "N/A".into(),
            memory_usage: "N/A".into(),
            cpu_request: "N/A".into(),
            memory_request: "N/A".into(),
            cpu_limit: "N/A".into(),
            memory_limit: "N/A".into(),
            cpu_usage_vs_limit: "N/A".into(),
            memory_usage_vs_limit: "N/A".into(),
            owner: None,
            hpa: None,
            restart_count: restarts,
        }
    }

    #[test]
    fn pattern_filter_is_substring_containment() {
        assert!(matches_pattern("web-app-1", "web"));
        assert!(matches_pattern("my-web-app", "web"));
        assert!(!matches_pattern("api-1", "web"));
        // Not a glob: wildcard characters are literal.
        assert!(!matches_pattern("web-app-1", "web*"));
        // Empty pattern keeps everything.
        assert!(matches_pattern("anything", ""));
    }

    #[test]
    fn recent_change_boundary_is_exclusive() {
        let now = Utc::now();
        assert!(is_recent(now - Duration::seconds(86_399), now));
        assert!(!is_recent(now - Duration::seconds(86_400), now));
        assert!(!is_recent(now - Duration::seconds(86_401), now));
    }

    #[test]
    fn marker_counting_is_literal() {
        assert_eq!(count_marker("ERRO x\nok\nERRO y ERRO", "ERRO"), 3);
        assert_eq!(count_marker("error Error ERR", "ERRO"), 0);
        assert_eq!(count_marker("whatever", ""), 0);
    }

    #[test]
    fn healthy_running_pod_produces_no_exceptions() {
        let mut sink = Vec::new();
        push_exceptions(&record(PodPhase::Running, 0), &Settings::default(), &mut sink);
        assert!(sink.is_empty());
    }

    #[test]
    fn crashing_pod_produces_phase_and_restart_lines() {
        let mut sink = Vec::new();
        push_exceptions(
            &record(PodPhase::parse("CrashLoopBackOff"), 3),
            &Settings::default(),
            &mut sink,
        );
        assert_eq!(sink.len(), 2);
        assert_eq!(sink[0].line, "c1|ns1|web-app-1 -> CrashLoopBackOff");
        assert_eq!(sink[1].line, "c1|ns1|web-app-1 -> 3 reinicializacoes");
    }

    #[test]
    fn hot_autoscaler_emits_percent_line_at_boundary() {
        let mut rec = record(PodPhase::Running, 0);
        rec.hpa = Some(AutoscalerSummary {
            name: "web-hpa".into(),
            target_kind: "Deployment".into(),
            target_name: "web".into(),
            min_replicas: Some(1),
            max_replicas: Some(5),
            current_replicas: Some(5),
            cpu_target_percent: Some(70),
            cpu_current_percent: Some(80),
        });
        let mut sink = Vec::new();
        push_exceptions(&rec, &Settings::default(), &mut sink);
        assert_eq!(sink.len(), 1);
        assert_eq!(sink[0].line, "c1|ns1|web-app-1 -> 80%");

        rec.hpa.as_mut().unwrap().cpu_current_percent = Some(79);
        sink.clear();
        push_exceptions(&rec, &Settings::default(), &mut sink);
        assert!(sink.is_empty());
    }

    #[test]
    fn excessive_log_errors_are_flagged_only_past_threshold() {
        let mut rec = record(PodPhase::Running, 0);
        rec.error_count = 2000;
        let mut sink = Vec::new();
        push_exceptions(&rec, &Settings::default(), &mut sink);
        assert!(sink.is_empty());

        rec.error_count = 2001;
        push_exceptions(&rec, &Settings::default(), &mut sink);
        assert_eq!(sink.len(), 1);
        assert_eq!(sink[0].line, "c1|ns1|web-app-1 -> 2001 erros no log");
    }

    #[test]
    fn restarts_read_from_first_container_only() {
        let mut pod = Pod::default();
        pod.status = Some(PodStatus {
            container_statuses: Some(vec![
                ContainerStatus {
                    restart_count: 2,
                    ..Default::default()
                },
                ContainerStatus {
                    restart_count: 9,
                    ..Default::default()
                },
            ]),
            ..Default::default()
        });
        assert_eq!(first_container_restarts(&pod), 2);
        assert_eq!(first_container_restarts(&Pod::default()), 0);
    }

    #[test]
    fn first_container_resources_with_missing_keys() {
        let mut pod = Pod::default();
        let mut requests = std::collections::BTreeMap::new();
        requests.insert("cpu".to_string(), Quantity("100m".to_string()));
        pod.spec = Some(PodSpec {
            containers: vec![k8s_openapi::api::core::v1::Container {
                name: "web".into(),
                resources: Some(k8s_openapi::api::core::v1::ResourceRequirements {
                    requests: Some(requests),
                    ..Default::default()
                }),
                ..Default::default()
            }],
            ..Default::default()
        });
        let res = container_resources(&pod, false);
        assert_eq!(res.cpu_request, "100m");
        assert_eq!(res.memory_request, "N/A");
        assert_eq!(res.cpu_limit, "N/A");
    }

    #[test]
    fn aggregated_resources_sum_across_containers() {
        let container = |cpu: &str, mem: &str| {
            let mut requests = std::collections::BTreeMap::new();
            requests.insert("cpu".to_string(), Quantity(cpu.to_string()));
            requests.insert("memory".to_string(), Quantity(mem.to_string()));
            k8s_openapi::api::core::v1::Container {
                name: "c".into(),
                resources: Some(k8s_openapi::api::core::v1::ResourceRequirements {
                    requests: Some(requests),
                    ..Default::default()
                }),
                ..Default::default()
            }
        };
        let mut pod = Pod::default();
        pod.spec = Some(PodSpec {
            containers: vec![container("100m", "128Mi"), container("200m", "256Mi")],
            ..Default::default()
        });
        let res = container_resources(&pod, true);
        assert_eq!(res.cpu_request, "300m");
        assert_eq!(res.memory_request, "384Mi");
        assert_eq!(res.cpu_limit, "N/A");
    }
}

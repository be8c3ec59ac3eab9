use std::fmt;

/// Pod lifecycle phase as reported by the API server. Unrecognized values are
/// preserved verbatim so the report shows exactly what the cluster said.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PodPhase {
    Pending,
    Running,
    Succeeded,
    Failed,
    Unknown,
    Other(String),
}

impl PodPhase {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "Pending" => Self::Pending,
            "Running" => Self::Running,
            "Succeeded" => Self::Succeeded,
            "Failed" => Self::Failed,
            "Unknown" => Self::Unknown,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}

impl fmt::Display for PodPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Running => write!(f, "Running"),
            Self::Succeeded => write!(f, "Succeeded"),
            Self::Failed => write!(f, "Failed"),
            Self::Unknown => write!(f, "Unknown"),
            Self::Other(s) => write!(f, "{s}"),
        }
    }
}

/// The deployment-like workload that ultimately owns a pod.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadRef {
    pub kind: String,
    pub name: String,
}

/// Flattened view of one horizontal autoscaler, with its scale target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoscalerSummary {
    /// The autoscaler's own name (needed by the legacy pod-name matching).
    pub name: String,
    pub target_kind: String,
    pub target_name: String,
    pub min_replicas: Option<i32>,
    pub max_replicas: Option<i32>,
    pub current_replicas: Option<i32>,
    pub cpu_target_percent: Option<i32>,
    pub cpu_current_percent: Option<i32>,
}

/// One pod row of the report. Resource quantities stay as unit-suffixed
/// strings ("250m", "512Mi") or "N/A".
#[derive(Debug, Clone)]
pub struct PodRecord {
    pub cluster: String,
    pub namespace: String,
    pub name: String,
    pub phase: PodPhase,
    pub creation_time: String,
    /// Created less than 24h ago (boundary exclusive).
    pub recent_change: bool,
    pub error_count: u64,
    pub cpu_usage: String,
    pub memory_usage: String,
    pub cpu_request: String,
    pub memory_request: String,
    pub cpu_limit: String,
    pub memory_limit: String,
    pub cpu_usage_vs_limit: String,
    pub memory_usage_vs_limit: String,
    pub owner: Option<WorkloadRef>,
    pub hpa: Option<AutoscalerSummary>,
    /// Restart count of the first container.
    pub restart_count: i32,
}

/// One node row of the report.
#[derive(Debug, Clone)]
pub struct NodeRecord {
    pub cluster: String,
    pub name: String,
    pub cpu_usage: String,
    pub cpu_percent: Option<u32>,
    pub memory_usage: String,
    pub memory_percent: Option<u32>,
}

impl NodeRecord {
    pub fn cpu_percent_display(&self) -> String {
        display_percent(self.cpu_percent)
    }

    pub fn memory_percent_display(&self) -> String {
        display_percent(self.memory_percent)
    }
}

fn display_percent(p: Option<u32>) -> String {
    match p {
        Some(p) => format!("{p}%"),
        None => "N/A".to_string(),
    }
}

/// Free-text threshold-violation line for the trailing report section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionEntry {
    pub line: String,
}

impl ExceptionEntry {
    pub fn pod(cluster: &str, namespace: &str, pod: &str, message: impl fmt::Display) -> Self {
        Self {
            line: format!("{cluster}|{namespace}|{pod} -> {message}"),
        }
    }

    pub fn node(cluster: &str, node: &str, message: impl fmt::Display) -> Self {
        Self {
            line: format!("{cluster}|{node} -> {message}"),
        }
    }
}

/// The in-progress report. Append-only during a run, emitted once at the end.
#[derive(Debug, Default)]
pub struct Report {
    pub pods: Vec<PodRecord>,
    pub nodes: Vec<NodeRecord>,
    pub exceptions: Vec<ExceptionEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_roundtrips_unknown_values() {
        let phase = PodPhase::parse("CrashLoopBackOff");
        assert_eq!(phase.to_string(), "CrashLoopBackOff");
        assert!(!phase.is_running());
        assert!(PodPhase::parse("Running").is_running());
    }

    #[test]
    fn exception_line_formats() {
        let e = ExceptionEntry::pod("c1", "ns1", "web-1", "3 reinicializacoes");
        assert_eq!(e.line, "c1|ns1|web-1 -> 3 reinicializacoes");
        let e = ExceptionEntry::node("c1", "node-1", "CPU: 85%, Memory: 40%");
        assert_eq!(e.line, "c1|node-1 -> CPU: 85%, Memory: 40%");
    }
}

//! Parsing and formatting of Kubernetes resource quantity strings.
//!
//! CPU comes in cores ("2", "0.5"), millicores ("250m") or the metrics API's
//! micro/nanocores ("12345u", "156325041n"). Memory comes with binary or
//! decimal suffixes. Report columns keep the unit-suffixed convention of
//! `top` output: millicores and mebibytes.

/// Parse a CPU quantity into millicores.
pub fn parse_cpu_millicores(raw: &str) -> Option<u64> {
    let s = raw.trim();
    if s.is_empty() || s == "N/A" {
        return None;
    }
    if let Some(v) = s.strip_suffix('n') {
        return v.parse::<u64>().ok().map(|n| n / 1_000_000);
    }
    if let Some(v) = s.strip_suffix('u') {
        return v.parse::<u64>().ok().map(|u| u / 1_000);
    }
    if let Some(v) = s.strip_suffix('m') {
        return v.parse::<u64>().ok();
    }
    // Plain cores, possibly fractional
    s.parse::<f64>().ok().map(|cores| (cores * 1000.0).round() as u64)
}

/// Parse a memory quantity into bytes.
pub fn parse_memory_bytes(raw: &str) -> Option<u64> {
    let s = raw.trim();
    if s.is_empty() || s == "N/A" {
        return None;
    }
    let lower = s.to_lowercase();
    let binary = [
        ("ki", 1024u64),
        ("mi", 1024 * 1024),
        ("gi", 1024 * 1024 * 1024),
        ("ti", 1024 * 1024 * 1024 * 1024),
    ];
    for (suffix, mult) in binary {
        if let Some(v) = lower.strip_suffix(suffix) {
            return v.parse::<u64>().ok().map(|n| n * mult);
        }
    }
    let decimal = [
        ("k", 1000u64),
        ("m", 1000 * 1000),
        ("g", 1000 * 1000 * 1000),
        ("t", 1000 * 1000 * 1000 * 1000),
    ];
    for (suffix, mult) in decimal {
        if let Some(v) = lower.strip_suffix(suffix) {
            return v.parse::<u64>().ok().map(|n| n * mult);
        }
    }
    lower.parse::<u64>().ok()
}

pub fn format_millicores(millicores: u64) -> String {
    format!("{millicores}m")
}

pub fn format_mebibytes(bytes: u64) -> String {
    format!("{}Mi", bytes / (1024 * 1024))
}

/// Rounded percentage of `used` over `total`. None when total is zero.
pub fn percent_of(used: u64, total: u64) -> Option<u32> {
    if total == 0 {
        return None;
    }
    Some(((used * 100 + total / 2) / total) as u32)
}

/// Percent display of one quantity string over another of the same resource
/// kind, e.g. CPU usage over CPU limit. "N/A" when either side is absent.
pub fn usage_vs_limit(usage: &str, limit: &str, parse: fn(&str) -> Option<u64>) -> String {
    match (parse(usage), parse(limit)) {
        (Some(u), Some(l)) => match percent_of(u, l) {
            Some(p) => format!("{p}%"),
            None => "N/A".to_string(),
        },
        _ => "N/A".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpu_parsing_covers_all_suffixes() {
        assert_eq!(parse_cpu_millicores("250m"), Some(250));
        assert_eq!(parse_cpu_millicores("2"), Some(2000));
        assert_eq!(parse_cpu_millicores("0.5"), Some(500));
        assert_eq!(parse_cpu_millicores("156325041n"), Some(156));
        assert_eq!(parse_cpu_millicores("12345u"), Some(12));
        assert_eq!(parse_cpu_millicores("N/A"), None);
        assert_eq!(parse_cpu_millicores("garbage"), None);
    }

    #[test]
    fn memory_parsing_covers_binary_and_decimal() {
        assert_eq!(parse_memory_bytes("512Mi"), Some(512 * 1024 * 1024));
        assert_eq!(parse_memory_bytes("1Gi"), Some(1024 * 1024 * 1024));
        assert_eq!(parse_memory_bytes("128974848"), Some(128974848));
        assert_eq!(parse_memory_bytes("1000k"), Some(1_000_000));
        assert_eq!(parse_memory_bytes("N/A"), None);
    }

    #[test]
    fn percent_rounds_to_nearest() {
        assert_eq!(percent_of(85, 100), Some(85));
        assert_eq!(percent_of(1, 3), Some(33));
        assert_eq!(percent_of(2, 3), Some(67));
        assert_eq!(percent_of(1, 0), None);
    }

    #[test]
    fn usage_vs_limit_renders_percent_or_na() {
        assert_eq!(usage_vs_limit("250m", "500m", parse_cpu_millicores), "50%");
        assert_eq!(usage_vs_limit("N/A", "500m", parse_cpu_millicores), "N/A");
        assert_eq!(
            usage_vs_limit("256Mi", "1Gi", parse_memory_bytes),
            "25%"
        );
    }
}

//! At-exit report
//!
//! Dumps call statistics to stderr when the program finishes, controlled by
//! `report` in the config file or the `KILN_REPORT` env var:
//! - `off` → no report
//! - `human` → human-readable
//! - `json` → one JSON object (requires the `report-json` feature)

use crate::config::ReportMode;
use kiln_core::CallStats;
use serde::Serialize;
use std::io::Write;
use std::time::Duration;

// =============================================================================
// Report Data
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ReportData {
    pub program: String,
    pub exit_code: i32,
    pub wall_clock_ms: u64,
    pub native_calls: u64,
    pub tail_calls: u64,
    pub bounces: u64,
    pub longest_chain: u64,
    pub peak_depth: usize,
    pub instances_built: u64,
}

impl ReportData {
    pub fn new(program: &str, exit_code: i32, elapsed: Duration, stats: &CallStats) -> Self {
        ReportData {
            program: program.to_string(),
            exit_code,
            wall_clock_ms: elapsed.as_millis() as u64,
            native_calls: stats.native_calls,
            tail_calls: stats.tail_calls,
            bounces: stats.bounces,
            longest_chain: stats.longest_chain,
            peak_depth: stats.peak_depth,
            instances_built: stats.instances_built,
        }
    }
}

// =============================================================================
// Formatting
// =============================================================================

pub fn format_human(data: &ReportData) -> String {
    let mut out = String::new();
    out.push_str("=== KILN REPORT ===\n");
    out.push_str(&format!("Program:         {}\n", data.program));
    out.push_str(&format!("Exit code:       {}\n", data.exit_code));
    out.push_str(&format!("Wall clock:      {} ms\n", data.wall_clock_ms));
    out.push_str(&format!("Native calls:    {}\n", data.native_calls));
    out.push_str(&format!("Tail calls:      {}\n", data.tail_calls));
    out.push_str(&format!("Bounces:         {}\n", data.bounces));
    out.push_str(&format!("Longest chain:   {}\n", data.longest_chain));
    out.push_str(&format!("Peak depth:      {}\n", data.peak_depth));
    out.push_str(&format!("Instances built: {}\n", data.instances_built));
    out.push_str("===================\n");
    out
}

#[cfg(feature = "report-json")]
pub fn format_json(data: &ReportData) -> String {
    let mut json = serde_json::to_string(data).unwrap_or_else(|_| "{}".to_string());
    json.push('\n');
    json
}

#[cfg(not(feature = "report-json"))]
pub fn format_json(data: &ReportData) -> String {
    tracing::warn!("json report requires the 'report-json' feature, falling back to human format");
    format_human(data)
}

// =============================================================================
// Emit
// =============================================================================

pub fn render(mode: ReportMode, data: &ReportData) -> Option<String> {
    match mode {
        ReportMode::Off => None,
        ReportMode::Human => Some(format_human(data)),
        ReportMode::Json => Some(format_json(data)),
    }
}

/// Write the report to stderr
pub fn emit(mode: ReportMode, data: &ReportData) {
    if let Some(output) = render(mode, data) {
        let _ = std::io::stderr().write_all(output.as_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ReportData {
        let stats = CallStats {
            native_calls: 10,
            tail_calls: 4,
            bounces: 4,
            longest_chain: 3,
            depth: 0,
            peak_depth: 2,
            instances_built: 5,
        };
        ReportData::new("sum", 0, Duration::from_millis(7), &stats)
    }

    #[test]
    fn test_off_renders_nothing() {
        assert!(render(ReportMode::Off, &sample()).is_none());
    }

    #[test]
    fn test_human_format() {
        let out = render(ReportMode::Human, &sample()).unwrap();
        assert!(out.starts_with("=== KILN REPORT ==="));
        assert!(out.contains("Program:         sum\n"));
        assert!(out.contains("Tail calls:      4\n"));
        assert!(out.contains("Peak depth:      2\n"));
    }

    #[cfg(feature = "report-json")]
    #[test]
    fn test_json_format() {
        let out = render(ReportMode::Json, &sample()).unwrap();
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["program"], "sum");
        assert_eq!(v["longest_chain"], 3);
        assert_eq!(v["instances_built"], 5);
        assert_eq!(v["wall_clock_ms"], 7);
    }
}

//! Run outputs for CI: `GITHUB_OUTPUT` step outputs and the JSON report.

use std::fmt::Write as _;
use std::io::Write as _;
use std::path::Path;

use crate::sync::{RunReport, RunSummary};

/// Env var naming the file GitHub Actions reads step outputs from.
pub const GITHUB_OUTPUT_ENV: &str = "GITHUB_OUTPUT";

/// Renders the step outputs as `key=value` lines.
///
/// # Errors
///
/// Returns an error if the summary cannot be serialized.
pub fn github_outputs(summary: &RunSummary) -> Result<String, serde_json::Error> {
    let mut out = String::new();
    for (key, value) in [
        ("published", summary.published),
        ("updated", summary.updated),
        ("deleted", summary.deleted),
        ("failed", summary.failed),
    ] {
        let _ = writeln!(out, "{key}={value}");
    }
    let _ = writeln!(out, "summary={}", serde_json::to_string(summary)?);
    Ok(out)
}

/// Appends the step outputs to the file named by `GITHUB_OUTPUT`, if set.
///
/// # Errors
///
/// Returns an error if the output file cannot be written.
pub fn write_github_outputs(summary: &RunSummary) -> Result<(), String> {
    let Some(path) = std::env::var_os(GITHUB_OUTPUT_ENV).filter(|p| !p.is_empty()) else {
        return Ok(());
    };
    append_outputs(Path::new(&path), summary)
}

fn append_outputs(path: &Path, summary: &RunSummary) -> Result<(), String> {
    let lines = github_outputs(summary).map_err(|e| format!("Failed to render outputs: {e}"))?;
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .and_then(|mut file| file.write_all(lines.as_bytes()))
        .map_err(|e| format!("Failed to write step outputs to {}: {e}", path.display()))
}

/// Writes the full run report as pretty JSON.
///
/// # Errors
///
/// Returns an error if the report cannot be serialized or written.
pub fn write_summary_json(path: &Path, report: &RunReport) -> Result<(), String> {
    let json = serde_json::to_string_pretty(report)
        .map_err(|e| format!("Failed to serialize run report: {e}"))?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
    }
    std::fs::write(path, json)
        .map_err(|e| format!("Failed to write run report to {}: {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::{FileReport, ReconciliationOutcome};
    use std::path::PathBuf;

    fn summary() -> RunSummary {
        RunSummary { published: 2, skipped: 1, failed: 1, ..RunSummary::default() }
    }

    #[test]
    fn outputs_are_key_value_lines() {
        let out = github_outputs(&summary()).unwrap();
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(&lines[..4], ["published=2", "updated=0", "deleted=0", "failed=1"]);
        let json = lines[4].strip_prefix("summary=").unwrap();
        let parsed: RunSummary = serde_json::from_str(json).unwrap();
        assert_eq!(parsed, summary());
    }

    #[test]
    fn appends_to_existing_output_file() {
        let dir = std::env::temp_dir().join(format!("hashsync_report_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("github_output");
        std::fs::write(&path, "earlier=1\n").unwrap();

        append_outputs(&path, &summary()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("earlier=1\npublished=2\n"));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn summary_json_has_files_and_counters() {
        let dir = std::env::temp_dir().join(format!("hashsync_report_json_{}", std::process::id()));
        let path = dir.join("out/report.json");
        let report = RunReport {
            summary: summary(),
            files: vec![FileReport {
                path: PathBuf::from("posts/a.md"),
                outcome: ReconciliationOutcome::failed("boom"),
            }],
        };

        write_summary_json(&path, &report).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["summary"]["published"], 2);
        assert_eq!(value["files"][0]["outcome"]["status"], "failed");
        assert_eq!(value["files"][0]["outcome"]["error"], "boom");
        let _ = std::fs::remove_dir_all(&dir);
    }
}

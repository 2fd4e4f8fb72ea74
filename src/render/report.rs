//! Run report JSON generation.

use crate::domain::REPORT_SCHEMA_VERSION;
use crate::pipeline::RunSummary;
use anyhow::Result;
use chrono::Utc;
use serde_json::{json, Map, Value};
use std::path::Path;

pub fn write_report(
    report_path: &Path,
    mode: &str,
    generator: &str,
    summary: &RunSummary,
    include_timestamp: bool,
) -> Result<()> {
    let mut failed = summary.failed.clone();
    failed.sort_by(|a, b| a.source_path.cmp(&b.source_path));

    let mut report = Map::new();
    report.insert("schema_version".to_string(), Value::String(REPORT_SCHEMA_VERSION.to_string()));
    if include_timestamp {
        report.insert(
            "generated_at".to_string(),
            Value::String(Utc::now().format("%Y-%m-%dT%H:%M:%S+00:00").to_string()),
        );
    }
    report.insert("mode".to_string(), Value::String(mode.to_string()));
    report.insert("generator".to_string(), Value::String(generator.to_string()));
    report.insert(
        "files".to_string(),
        json!({
            "generated": summary.generated,
            "updated": summary.updated,
            "unchanged": summary.unchanged,
            "excluded": summary.excluded,
            "failed": failed.len(),
        }),
    );
    report.insert("elapsed_secs".to_string(), json!(round_secs(summary.elapsed_secs)));
    if !failed.is_empty() {
        report.insert("failures".to_string(), serde_json::to_value(failed)?);
    }

    if let Some(parent) = report_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(report_path, serde_json::to_string_pretty(&Value::Object(report))?)?;
    Ok(())
}

fn round_secs(secs: f64) -> f64 {
    (secs * 1000.0).round() / 1000.0
}

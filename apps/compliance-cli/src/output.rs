//! Report rendering
//!
//! Presentation only: verdicts are printed as the engine produced them.

use anyhow::Context;
use clap::ValueEnum;
use shared_types::ComplianceReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Compact JSON on one line
    Json,
    /// Indented JSON
    Pretty,
    /// Human-readable summary
    Text,
}

pub fn render(report: &ComplianceReport, format: OutputFormat, source: &str) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => serde_json::to_string(report).context("Failed to serialize report"),
        OutputFormat::Pretty => {
            serde_json::to_string_pretty(report).context("Failed to serialize report")
        }
        OutputFormat::Text => Ok(report.to_text(source)),
    }
}

/// `0` when a report was produced; with `strict`, `1` if any rule failed
pub fn exit_code(report: &ComplianceReport, strict: bool) -> u8 {
    if strict && !report.is_compliant() {
        1
    } else {
        0
    }
}

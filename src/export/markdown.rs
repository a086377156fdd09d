use std::fmt::Write;
use std::path::Path;

use crate::core::orchestrator::Orchestrator;
use crate::models::report::ScanOutcome;

/// Write a human-readable report of the current scan: file, verdict,
/// statistics, threats and the full event log.
pub fn export_markdown(scan: &Orchestrator, output_path: &Path) -> anyhow::Result<()> {
    std::fs::write(output_path, render_markdown(scan)?)?;
    Ok(())
}

pub fn render_markdown(scan: &Orchestrator) -> Result<String, std::fmt::Error> {
    let mut md = String::new();

    writeln!(md, "# ScanLens Report")?;
    writeln!(md)?;
    if let Some(file) = scan.file() {
        writeln!(md, "- **File:** {}", file.name)?;
        writeln!(md, "- **Size:** {} bytes", file.size)?;
    }
    if let Some(job) = scan.job() {
        writeln!(md, "- **Job:** `{}`", job.id)?;
        writeln!(md, "- **Started:** {}", job.created_at.format("%Y-%m-%d %H:%M:%S"))?;
    }
    writeln!(md, "- **State:** {}", scan.phase().label())?;
    if let Some(outcome) = scan.outcome() {
        writeln!(md, "- **Verdict:** {}", outcome.label())?;
    }
    writeln!(md)?;

    match scan.outcome() {
        Some(ScanOutcome::ErrorInfo { cause }) => {
            writeln!(md, "## Error")?;
            writeln!(md)?;
            writeln!(md, "{}", cause)?;
            writeln!(md)?;
        }
        Some(outcome) => {
            if let Some(report) = outcome.report() {
                if let Some(info) = &report.file_info {
                    writeln!(md, "- **SHA256:** `{}`", info.sha256)?;
                    writeln!(md)?;
                }

                let stats = &report.stats;
                writeln!(md, "## Statistics")?;
                writeln!(md)?;
                writeln!(md, "| Threats | Malicious | Suspicious | Neutral |")?;
                writeln!(md, "|---------|-----------|------------|---------|")?;
                writeln!(
                    md,
                    "| {} | {} | {} | {} |",
                    stats.threats_found, stats.malicious, stats.suspicious, stats.neutral
                )?;
                writeln!(md)?;

                if !report.threats.is_empty() {
                    writeln!(md, "## Threats")?;
                    writeln!(md)?;
                    writeln!(md, "| ID | Severity | Type | Details |")?;
                    writeln!(md, "|----|----------|------|---------|")?;
                    for threat in &report.threats {
                        writeln!(
                            md,
                            "| {} | {:?} | {} | {} |",
                            threat.threat_id, threat.severity, threat.threat_type, threat.details
                        )?;
                    }
                    writeln!(md)?;
                }
            }
        }
        None => {}
    }

    let log = scan.log().snapshot();
    if !log.is_empty() {
        writeln!(md, "## Event Log ({} lines)", log.len())?;
        writeln!(md)?;
        writeln!(md, "```")?;
        for line in log {
            writeln!(md, "{}", line.display())?;
        }
        writeln!(md, "```")?;
    }

    Ok(md)
}

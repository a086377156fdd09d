use std::path::Path;

use crate::models::report::ScanOutcome;

pub fn export_outcome(outcome: &ScanOutcome, output_path: &Path) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(outcome)?;
    std::fs::write(output_path, json)?;
    Ok(())
}

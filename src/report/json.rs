use anyhow::Result;
use std::path::Path;

use super::types::TestResults;

/// Write `test-results.json` into the output directory
pub fn write_report(results: &TestResults, output_dir: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(results)?;
    let path = output_dir.join("test-results.json");
    std::fs::write(&path, json)?;
    println!("    Generated JSON report: {}", path.display());
    Ok(())
}

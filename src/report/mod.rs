pub mod console;
pub mod json;
pub mod junit;
pub mod types;

use colored::Colorize;

use crate::runner::SuiteOutcome;
use crate::utils::config::HarnessConfig;

/// Print the summary, write optional report files and compute the exit code.
///
/// Report files are best effort; the exit code depends on the ledger alone.
pub fn emit(session_id: &str, outcome: &SuiteOutcome, config: &HarnessConfig) -> i32 {
    console::print_summary(&outcome.ledger);

    if let Some(dir) = &config.report_dir {
        let results = types::TestResults::from_outcome(session_id, outcome, config);
        let written = std::fs::create_dir_all(dir)
            .map_err(anyhow::Error::from)
            .and_then(|()| json::write_report(&results, dir))
            .and_then(|()| junit::write_report(&results, dir));
        if let Err(e) = written {
            println!(
                "{} Could not write reports to {}: {:#}",
                "⚠️".yellow(),
                dir.display(),
                e
            );
        }
    }

    outcome.ledger.exit_code()
}

pub mod driver;
pub mod report;
pub mod runner;
pub mod utils;

// Re-export common items
pub use report::emit;
pub use runner::{run_suite, ResultLedger, ScenarioResult, SuiteOutcome};
pub use utils::config::HarnessConfig;

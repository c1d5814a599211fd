use serde::{Deserialize, Serialize};

use crate::runner::{ScenarioResult, SuiteOutcome};
use crate::utils::config::HarnessConfig;

/// Machine-readable copy of a run's ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResults {
    pub session_id: String,
    pub base_url: String,
    pub authenticated: bool,
    pub results: Vec<ScenarioResult>,
    pub passed: usize,
    pub total: usize,
    /// Fault that stopped the run early
    pub error: Option<String>,
    pub generated_at: String,
}

impl TestResults {
    pub fn from_outcome(session_id: &str, outcome: &SuiteOutcome, config: &HarnessConfig) -> Self {
        Self {
            session_id: session_id.to_string(),
            base_url: config.base_url.clone(),
            authenticated: outcome.authenticated,
            results: outcome.ledger.entries().to_vec(),
            passed: outcome.ledger.passed_count(),
            total: outcome.ledger.total(),
            error: outcome.error.as_ref().map(|e| format!("{:#}", e)),
            generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    pub fn failures(&self) -> usize {
        self.total - self.passed
    }
}

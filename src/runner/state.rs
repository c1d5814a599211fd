use colored::Colorize;
use serde::{Deserialize, Serialize};

/// Outcome of a single check
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioResult {
    pub name: String,
    pub passed: bool,
    pub detail: String,
}

/// Append-only record of every check attempted in a run, in execution order
#[derive(Debug, Clone)]
pub struct ResultLedger {
    entries: Vec<ScenarioResult>,
    stream: bool,
}

impl Default for ResultLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultLedger {
    /// Ledger that prints every result as it is recorded
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            stream: true,
        }
    }

    /// Ledger that records silently
    pub fn quiet() -> Self {
        Self {
            entries: Vec::new(),
            stream: false,
        }
    }

    pub fn record(&mut self, name: &str, passed: bool, detail: impl Into<String>) {
        let result = ScenarioResult {
            name: name.to_string(),
            passed,
            detail: detail.into(),
        };

        if self.stream {
            let status = if passed {
                "✅ PASS".green().bold()
            } else {
                "❌ FAIL".red().bold()
            };
            println!("{}: {}", status, result.name);
            if !result.detail.is_empty() {
                println!("   {}", result.detail.dimmed());
            }
        }
        log::debug!("recorded {:?}", result);

        self.entries.push(result);
    }

    pub fn entries(&self) -> &[ScenarioResult] {
        &self.entries
    }

    pub fn total(&self) -> usize {
        self.entries.len()
    }

    pub fn passed_count(&self) -> usize {
        self.entries.iter().filter(|r| r.passed).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &ScenarioResult> {
        self.entries.iter().filter(|r| !r.passed)
    }

    /// An empty ledger never counts as passing
    pub fn all_passed(&self) -> bool {
        !self.entries.is_empty() && self.passed_count() == self.total()
    }

    pub fn exit_code(&self) -> i32 {
        if self.all_passed() {
            0
        } else {
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_in_order_without_dedup() {
        let mut ledger = ResultLedger::quiet();
        ledger.record("Breadcrumb present", true, "Text: Gemeinschaften");
        ledger.record("Breadcrumb present", false, "");
        ledger.record("/groups returns 404", true, "Status: 404");

        let names: Vec<_> = ledger.entries().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            ["Breadcrumb present", "Breadcrumb present", "/groups returns 404"]
        );
        assert!(ledger.entries()[0].passed);
        assert!(!ledger.entries()[1].passed);
        assert_eq!(ledger.total(), 3);
        assert_eq!(ledger.passed_count(), 2);
    }

    #[test]
    fn test_failures_keep_detail() {
        let mut ledger = ResultLedger::quiet();
        ledger.record("Community page", false, "No community found");
        ledger.record("Navigation: /groups link removed", true, "");

        let failures: Vec<_> = ledger.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].detail, "No community found");
    }

    #[test]
    fn test_exit_code_is_function_of_ledger() {
        let mut ledger = ResultLedger::quiet();
        assert_eq!(ledger.exit_code(), 1, "empty ledger must fail");

        ledger.record("a", true, "");
        assert_eq!(ledger.exit_code(), 0);

        ledger.record("b", false, "");
        assert_eq!(ledger.exit_code(), 1);
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let result = ScenarioResult {
            name: "x".into(),
            passed: true,
            detail: String::new(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["passed"], serde_json::json!(true));
        assert_eq!(json["detail"], serde_json::json!(""));
    }
}

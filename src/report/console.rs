use colored::Colorize;

use crate::runner::ResultLedger;
use crate::utils::config::HarnessConfig;

const RULE_WIDTH: usize = 60;

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

/// Run header: target and whether the signed-in checks are enabled
pub fn print_banner(config: &HarnessConfig) {
    println!("{}", rule());
    println!("{}", "E2E: group management under communities".bold());
    println!("{}", rule());
    println!("BASE_URL: {}", config.base_url.cyan());
    let auth = if config.auth_enabled() {
        "Enabled".green()
    } else {
        "Disabled".yellow()
    };
    println!("Auth: {}", auth);
    println!();
}

/// Lines of the final summary block
pub fn summary_lines(ledger: &ResultLedger) -> Vec<String> {
    let mut lines = vec![
        rule(),
        "SUMMARY".to_string(),
        rule(),
        format!("Passed: {}/{}", ledger.passed_count(), ledger.total()),
    ];

    if ledger.all_passed() {
        lines.push("✅ ALL TESTS PASSED".to_string());
    } else {
        lines.push("❌ SOME TESTS FAILED".to_string());
        lines.extend(
            ledger
                .failures()
                .map(|f| format!("   - {}: {}", f.name, f.detail)),
        );
    }
    lines
}

pub fn print_summary(ledger: &ResultLedger) {
    println!();
    for line in summary_lines(ledger) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_lists_failures() {
        let mut ledger = ResultLedger::quiet();
        ledger.record("/groups returns 404", true, "Status: 404");
        ledger.record("Community page", false, "No community found");

        let lines = summary_lines(&ledger);
        assert!(lines.contains(&"Passed: 1/2".to_string()));
        assert!(lines.contains(&"❌ SOME TESTS FAILED".to_string()));
        assert_eq!(
            lines.last().map(String::as_str),
            Some("   - Community page: No community found")
        );
    }

    #[test]
    fn test_empty_ledger_is_not_a_pass() {
        let lines = summary_lines(&ResultLedger::quiet());
        assert!(lines.contains(&"Passed: 0/0".to_string()));
        assert!(lines.contains(&"❌ SOME TESTS FAILED".to_string()));
    }

    #[test]
    fn test_all_passed() {
        let mut ledger = ResultLedger::quiet();
        ledger.record("Navigation: /groups link removed", true, "");

        let lines = summary_lines(&ledger);
        assert_eq!(lines.last().map(String::as_str), Some("✅ ALL TESTS PASSED"));
    }
}

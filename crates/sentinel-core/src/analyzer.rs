//! Rule-based static analyzer.
//!
//! Best-effort heuristic: every rule whose pattern matches the source emits
//! exactly one finding, located at the first line that matches on its own.
//! False positives are expected and missed issues are a known limitation.

use tracing::debug;

use crate::rules::{builtin_rules, Rule};
use crate::scoring::score;
use crate::types::{AnalysisReport, Vulnerability};

/// Location used when only a multi-line construct matched.
pub const UNKNOWN_LOCATION: &str = "unknown location";

/// Canonical summary for a report without findings.
pub const NO_VULNERABILITIES_SUMMARY: &str =
    "No vulnerabilities detected. The contract appears to be secure.";
const CRITICAL_SUMMARY: &str =
    "Critical security issues detected. This contract is not safe for deployment.";
const SIGNIFICANT_SUMMARY: &str =
    "Significant security issues found. Address these vulnerabilities before deployment.";
const MINOR_SUMMARY: &str =
    "Minor security concerns detected. Consider addressing these issues for improved security.";

/// Applies a rule table to contract source.
#[derive(Debug, Clone, Copy)]
pub struct StaticAnalyzer {
    rules: &'static [Rule],
}

impl Default for StaticAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl StaticAnalyzer {
    /// Analyzer over the built-in rule table.
    pub fn new() -> Self {
        Self::with_rules(builtin_rules())
    }

    pub fn with_rules(rules: &'static [Rule]) -> Self {
        Self { rules }
    }

    /// Scan `source`, producing at most one finding per rule, in rule order.
    pub fn scan(&self, source: &str) -> Vec<Vulnerability> {
        self.rules
            .iter()
            .filter(|rule| rule.is_match(source))
            .map(|rule| {
                let location = match rule.first_matching_line(source) {
                    Some(line) => format!("Line {}", line),
                    None => UNKNOWN_LOCATION.to_string(),
                };
                rule.to_vulnerability(location)
            })
            .collect()
    }

    /// Scan and score `source` into a rule-based report.
    pub fn report(&self, source: &str) -> AnalysisReport {
        let vulnerabilities = self.scan(source);
        let risk_score = score(&vulnerabilities);
        debug!(
            findings = vulnerabilities.len(),
            risk_score, "Static analysis complete"
        );

        AnalysisReport {
            summary: summarize(&vulnerabilities, risk_score).to_string(),
            vulnerabilities,
            risk_score,
            recommendations: None,
        }
    }
}

/// Pick the report summary for a scored finding list.
pub fn summarize(vulnerabilities: &[Vulnerability], risk_score: u8) -> &'static str {
    if vulnerabilities.is_empty() {
        NO_VULNERABILITIES_SUMMARY
    } else if risk_score > 70 {
        CRITICAL_SUMMARY
    } else if risk_score > 40 {
        SIGNIFICANT_SUMMARY
    } else {
        MINOR_SUMMARY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Severity;

    const TRANSFER_WITH_LOOP: &str = r#"module 0x1::bank {
    struct Vault has key { balance: u64 }

    public fun transfer(from: &signer, to: address, amount: u64) acquires Vault {
        let i = 0;
        while (i < amount) {
            i = i + 1;
        };
        let vault = borrow_global_mut<Vault>(to);
        vault.balance = vault.balance + amount;
    }
}"#;

    #[test]
    fn transfer_loop_and_global_mutation_scenario() {
        let report = StaticAnalyzer::new().report(TRANSFER_WITH_LOOP);
        let found: Vec<(&str, Severity)> = report
            .vulnerabilities
            .iter()
            .map(|v| (v.category.as_str(), v.severity))
            .collect();

        assert_eq!(found.len(), 3);
        assert!(found.contains(&("Access Control", Severity::Medium)));
        assert!(found.contains(&("Infinite Loop", Severity::Critical)));
        assert!(found.contains(&("Mutable Global State", Severity::Medium)));
        assert_eq!(report.risk_score, 44);
        assert_eq!(
            report.summary,
            "Significant security issues found. Address these vulnerabilities before deployment."
        );
    }

    #[test]
    fn findings_follow_rule_order() {
        let found = StaticAnalyzer::new().scan(TRANSFER_WITH_LOOP);
        let categories: Vec<&str> = found.iter().map(|v| v.category.as_str()).collect();
        assert_eq!(
            categories,
            vec!["Access Control", "Mutable Global State", "Infinite Loop"]
        );
    }

    #[test]
    fn location_is_first_matching_line() {
        let found = StaticAnalyzer::new().scan(TRANSFER_WITH_LOOP);
        let access = found.iter().find(|v| v.category == "Access Control").unwrap();
        let looping = found.iter().find(|v| v.category == "Infinite Loop").unwrap();
        assert_eq!(access.location, "Line 4");
        assert_eq!(looping.location, "Line 6");
    }

    #[test]
    fn one_finding_per_rule_regardless_of_occurrences() {
        let source = "public fun a() {}\npublic fun b() {}\npublic fun c() {}";
        let found = StaticAnalyzer::new().scan(source);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].location, "Line 1");
    }

    #[test]
    fn multi_line_match_falls_back_to_unknown_location() {
        let source = "module M {\n    public\n    fun f() {}\n}";
        let found = StaticAnalyzer::new().scan(source);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].category, "Access Control");
        assert_eq!(found[0].location, UNKNOWN_LOCATION);
    }

    #[test]
    fn clean_source_yields_canonical_report() {
        let report = StaticAnalyzer::new().report("module 0x1::empty {}");
        assert!(report.is_clean());
        assert_eq!(report.risk_score, 0);
        assert_eq!(report.summary, NO_VULNERABILITIES_SUMMARY);
    }

    #[test]
    fn summary_thresholds() {
        let one = StaticAnalyzer::new().scan("assert!(true, 1);");
        assert_eq!(summarize(&one, 3), MINOR_SUMMARY);
        assert_eq!(summarize(&one, 40), MINOR_SUMMARY);
        assert_eq!(summarize(&one, 41), SIGNIFICANT_SUMMARY);
        assert_eq!(summarize(&one, 71), CRITICAL_SUMMARY);
    }
}

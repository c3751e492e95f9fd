//! Static detection rules for Move source.
//!
//! The table is built once per process and never mutated. Evaluation order is
//! part of the report contract: general rules first, then critical rules.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::{Severity, Vulnerability};

/// Evaluation tier of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleTier {
    General,
    Critical,
}

/// Pattern-to-severity mapping used for heuristic detection.
#[derive(Debug)]
pub struct Rule {
    pattern: Regex,
    pub tier: RuleTier,
    pub category: &'static str,
    pub severity: Severity,
    pub description: &'static str,
    pub recommendation: &'static str,
}

impl Rule {
    fn new(
        tier: RuleTier,
        pattern: &str,
        category: &'static str,
        severity: Severity,
        description: &'static str,
        recommendation: &'static str,
    ) -> Self {
        Self {
            pattern: Regex::new(pattern).expect("built-in rule pattern must compile"),
            tier,
            category,
            severity,
            description,
            recommendation,
        }
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Whether the pattern matches anywhere in `text`.
    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    /// 1-based number of the first line matching the pattern on its own.
    pub fn first_matching_line(&self, source: &str) -> Option<usize> {
        source
            .lines()
            .position(|line| self.pattern.is_match(line))
            .map(|idx| idx + 1)
    }

    pub fn to_vulnerability(&self, location: impl Into<String>) -> Vulnerability {
        Vulnerability {
            category: self.category.to_string(),
            severity: self.severity,
            description: self.description.to_string(),
            location: location.into(),
            recommendation: self.recommendation.to_string(),
        }
    }
}

static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        Rule::new(
            RuleTier::General,
            r"public\s+fun",
            "Access Control",
            Severity::Medium,
            "Public functions may allow unauthorized access",
            "Consider using access control modifiers or explicit checks",
        ),
        Rule::new(
            RuleTier::General,
            r"assert!",
            "Error Handling",
            Severity::Low,
            "Using assert! for validation may abort the transaction without proper error handling",
            "Consider using more specific error codes and handling",
        ),
        Rule::new(
            RuleTier::General,
            r"borrow_global_mut",
            "Mutable Global State",
            Severity::Medium,
            "Mutable global state can lead to reentrancy vulnerabilities",
            "Ensure proper checks before and after mutable operations",
        ),
        Rule::new(
            RuleTier::General,
            r"copy|move_from",
            "Resource Management",
            Severity::High,
            "Improper resource handling can lead to resource leaks",
            "Ensure resources are properly created and destroyed",
        ),
        Rule::new(
            RuleTier::Critical,
            r"signer::address_of.*==.*address",
            "Authorization Bypass",
            Severity::Critical,
            "Potential authorization bypass vulnerability",
            "Use proper authorization checks with Aptos account-based authentication",
        ),
        Rule::new(
            RuleTier::Critical,
            r"while|loop",
            "Infinite Loop",
            Severity::Critical,
            "Potential infinite loop that could exhaust gas",
            "Ensure all loops have proper termination conditions",
        ),
    ]
});

/// The built-in rule table in evaluation order.
pub fn builtin_rules() -> &'static [Rule] {
    RULES.as_slice()
}

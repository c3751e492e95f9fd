//! Risk scoring.

use crate::types::Vulnerability;

/// Upper bound of the risk scale.
pub const MAX_RISK_SCORE: u8 = 100;

/// Map a vulnerability list to a risk score in `0..=100`.
///
/// Sum of per-severity weights, clamped. Order-independent.
pub fn score(vulnerabilities: &[Vulnerability]) -> u8 {
    let total = vulnerabilities
        .iter()
        .fold(0u32, |acc, v| acc.saturating_add(v.severity.weight()));
    total.min(u32::from(MAX_RISK_SCORE)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Severity;
    use proptest::prelude::*;

    fn vuln(severity: Severity) -> Vulnerability {
        Vulnerability {
            category: "Test".to_string(),
            severity,
            description: String::new(),
            location: "Line 1".to_string(),
            recommendation: String::new(),
        }
    }

    fn arb_severity() -> impl Strategy<Value = Severity> {
        prop_oneof![
            Just(Severity::Critical),
            Just(Severity::High),
            Just(Severity::Medium),
            Just(Severity::Low),
        ]
    }

    #[test]
    fn empty_list_scores_zero() {
        assert_eq!(score(&[]), 0);
    }

    #[test]
    fn weights_are_summed() {
        let vulns = vec![
            vuln(Severity::Medium),
            vuln(Severity::Critical),
            vuln(Severity::Medium),
        ];
        assert_eq!(score(&vulns), 44);
    }

    #[test]
    fn five_criticals_clamp_to_one_hundred() {
        let vulns = vec![vuln(Severity::Critical); 5];
        assert_eq!(score(&vulns), 100);
    }

    proptest! {
        #[test]
        fn score_is_bounded(severities in prop::collection::vec(arb_severity(), 0..64)) {
            let vulns: Vec<_> = severities.into_iter().map(vuln).collect();
            prop_assert!(score(&vulns) <= MAX_RISK_SCORE);
        }

        #[test]
        fn adding_a_finding_never_lowers_the_score(
            severities in prop::collection::vec(arb_severity(), 0..32),
            extra in arb_severity(),
        ) {
            let mut vulns: Vec<_> = severities.into_iter().map(vuln).collect();
            let before = score(&vulns);
            vulns.push(vuln(extra));
            prop_assert!(score(&vulns) >= before);
        }

        #[test]
        fn score_ignores_order(severities in prop::collection::vec(arb_severity(), 0..32)) {
            let vulns: Vec<_> = severities.into_iter().map(vuln).collect();
            let mut reversed = vulns.clone();
            reversed.reverse();
            prop_assert_eq!(score(&vulns), score(&reversed));
        }
    }
}

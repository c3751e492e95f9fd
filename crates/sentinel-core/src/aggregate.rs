//! Merges the rule-based and AI-based reports.

use crate::analyzer::NO_VULNERABILITIES_SUMMARY;
use crate::types::AnalysisReport;

/// Separator placed between the rule-based and AI summaries.
pub const AI_SECTION_SEPARATOR: &str = "\n\n--- AI Analysis ---\n\n";

/// Merge two reports: findings concatenated (rule-based first, no dedup),
/// worst score wins, summaries joined under a section separator.
pub fn aggregate(rule_based: AnalysisReport, ai_based: AnalysisReport) -> AnalysisReport {
    let risk_score = rule_based.risk_score.max(ai_based.risk_score);

    let mut vulnerabilities = rule_based.vulnerabilities;
    vulnerabilities.extend(ai_based.vulnerabilities);

    let summary = if vulnerabilities.is_empty() {
        NO_VULNERABILITIES_SUMMARY.to_string()
    } else {
        format!(
            "{}{}{}",
            rule_based.summary, AI_SECTION_SEPARATOR, ai_based.summary
        )
    };

    AnalysisReport {
        vulnerabilities,
        risk_score,
        summary,
        recommendations: ai_based.recommendations.or(rule_based.recommendations),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::StaticAnalyzer;
    use crate::normalizer::ai_report;
    use crate::types::AiAnalysis;

    #[test]
    fn score_is_max_not_sum() {
        let rule = StaticAnalyzer::new().report("public fun f() { while (true) {} }");
        let ai = ai_report(AiAnalysis::from_text("High risk issue in f."));
        assert_eq!(rule.risk_score, 37);
        assert_eq!(ai.risk_score, 15);

        let merged = aggregate(rule, ai);
        assert_eq!(merged.risk_score, 37);
        assert_eq!(merged.vulnerabilities.len(), 3);
    }

    #[test]
    fn rule_findings_come_first_without_dedup() {
        let rule = StaticAnalyzer::new().report("public fun f() {}");
        let ai = ai_report(AiAnalysis::from_text(
            "Access control issue: public fun f is callable by anyone.",
        ));
        let merged = aggregate(rule, ai);
        assert_eq!(merged.vulnerabilities[0].category, "Access Control");
        assert_eq!(merged.vulnerabilities[1].category, "Security Issue");
    }

    #[test]
    fn summaries_are_joined_with_separator() {
        let rule = StaticAnalyzer::new().report("assert!(x, 1);");
        let ai = ai_report(AiAnalysis::from_text("Low issue found."));
        let merged = aggregate(rule.clone(), ai);
        assert!(merged.summary.starts_with(&rule.summary));
        assert!(merged.summary.contains(AI_SECTION_SEPARATOR));
        assert!(merged.summary.ends_with("Low issue found."));
    }

    #[test]
    fn clean_inputs_keep_canonical_summary() {
        let rule = StaticAnalyzer::new().report("module 0x1::m {}");
        let ai = ai_report(AiAnalysis::from_text("Nothing to report."));
        let merged = aggregate(rule, ai);
        assert_eq!(merged.risk_score, 0);
        assert_eq!(merged.summary, NO_VULNERABILITIES_SUMMARY);
    }

    #[test]
    fn clean_ai_prose_survives_next_to_rule_findings() {
        let rule = StaticAnalyzer::new().report("public fun f() {}");
        let prose = "The module uses a capability pattern correctly.";
        let merged = aggregate(rule.clone(), ai_report(AiAnalysis::from_text(prose)));

        assert_eq!(merged.vulnerabilities.len(), 1);
        assert_eq!(
            merged.summary,
            format!("{}{}{}", rule.summary, AI_SECTION_SEPARATOR, prose)
        );
        assert!(!merged.summary.contains(NO_VULNERABILITIES_SUMMARY));
    }

    #[test]
    fn ai_recommendations_pass_through() {
        let rule = StaticAnalyzer::new().report("public fun f() {}");
        let recs = vec!["Gate f behind a capability".to_string()];
        let ai = ai_report(AiAnalysis {
            text: "issue: f is public".to_string(),
            recommendations: Some(recs.clone()),
        });
        assert_eq!(aggregate(rule, ai).recommendations, Some(recs));
    }
}

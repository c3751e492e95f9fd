//! Normalizes free-text AI analysis into the vulnerability shape.
//!
//! Lossy keyword sniffing over paragraph blocks. Not a parser.

use std::sync::LazyLock;

use regex::Regex;

use crate::scoring::score;
use crate::types::{AiAnalysis, AnalysisReport, Severity, Vulnerability};

pub const AI_CATEGORY: &str = "Security Issue";
pub const AI_LOCATION: &str = "Contract Analysis";
pub const AI_RECOMMENDATION: &str = "Review AI suggestions and implement security improvements";

const CANDIDATE_KEYWORDS: [&str; 3] = ["vulnerability", "issue", "risk"];

static BLANK_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r?\n[ \t]*\r?\n").expect("blank line pattern must compile"));

/// Convert raw AI prose into findings, one per block that mentions a keyword.
pub fn normalize(raw_analysis: &str) -> Vec<Vulnerability> {
    BLANK_LINE
        .split(raw_analysis)
        .filter_map(|block| {
            let lowered = block.to_lowercase();
            if !CANDIDATE_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
                return None;
            }

            Some(Vulnerability {
                category: AI_CATEGORY.to_string(),
                severity: infer_severity(&lowered),
                description: block.to_string(),
                location: AI_LOCATION.to_string(),
                recommendation: AI_RECOMMENDATION.to_string(),
            })
        })
        .collect()
}

fn infer_severity(lowered_block: &str) -> Severity {
    if lowered_block.contains("critical") {
        Severity::Critical
    } else if lowered_block.contains("high") {
        Severity::High
    } else if lowered_block.contains("low") {
        Severity::Low
    } else {
        Severity::Medium
    }
}

/// Build the AI-based report: normalized findings, their score, and the raw text as summary.
pub fn ai_report(analysis: AiAnalysis) -> AnalysisReport {
    let vulnerabilities = normalize(&analysis.text);
    let risk_score = score(&vulnerabilities);

    AnalysisReport {
        vulnerabilities,
        risk_score,
        summary: analysis.text,
        recommendations: analysis.recommendations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Overview of the module.\n\n\
        1. Critical vulnerability: the withdraw path lacks a signer check.\n\n\
        2. High risk: unchecked arithmetic in deposit.\n\n\
        3. Low issue: missing event emission.\n\n\
        4. Another issue worth a look.\n\n\
        Closing remarks.";

    #[test]
    fn blocks_without_keywords_are_ignored() {
        let found = normalize(SAMPLE);
        assert_eq!(found.len(), 4);
        assert!(found.iter().all(|v| v.category == AI_CATEGORY));
        assert!(found.iter().all(|v| v.location == AI_LOCATION));
        assert!(found.iter().all(|v| v.recommendation == AI_RECOMMENDATION));
    }

    #[test]
    fn severity_is_inferred_by_keyword_priority() {
        let severities: Vec<Severity> = normalize(SAMPLE).iter().map(|v| v.severity).collect();
        assert_eq!(
            severities,
            vec![
                Severity::Critical,
                Severity::High,
                Severity::Low,
                Severity::Medium
            ]
        );
    }

    #[test]
    fn keywords_match_case_insensitively() {
        let found = normalize("RISK of CRITICAL failure");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].severity, Severity::Critical);
        assert_eq!(found[0].description, "RISK of CRITICAL failure");
    }

    #[test]
    fn blank_lines_with_whitespace_split_blocks() {
        let found = normalize("an issue here\n   \nanother issue there");
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn ai_report_keeps_raw_text_and_recommendations() {
        let report = ai_report(AiAnalysis {
            text: SAMPLE.to_string(),
            recommendations: Some(vec!["Add a signer check".to_string()]),
        });
        assert_eq!(report.summary, SAMPLE);
        assert_eq!(report.risk_score, 30 + 15 + 3 + 7);
        assert_eq!(
            report.recommendations,
            Some(vec!["Add a signer check".to_string()])
        );
    }

    #[test]
    fn ai_report_without_findings_keeps_prose() {
        let report = ai_report(AiAnalysis::from_text("The module looks fine."));
        assert!(report.is_clean());
        assert_eq!(report.risk_score, 0);
        assert_eq!(report.summary, "The module looks fine.");
    }
}

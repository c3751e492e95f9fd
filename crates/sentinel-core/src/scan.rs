//! Scan pipeline: static analysis joined with optional AI analysis.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::aggregate::aggregate;
use crate::analyzer::StaticAnalyzer;
use crate::error::{SentinelError, SentinelResult};
use crate::normalizer::ai_report;
use crate::providers::AiAnalysisProvider;
use crate::types::{AnalysisReport, BehaviorPrediction};

/// What to do when the AI collaborator fails during a scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiPolicy {
    /// Fail the scan with a provider error.
    #[default]
    Required,
    /// Return the rule-based report and flag it as degraded.
    BestEffort,
}

/// Scan pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    pub ai_policy: AiPolicy,
    /// Ask the AI provider for a behavior prediction alongside the analysis.
    pub predict_behavior: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            ai_policy: AiPolicy::Required,
            predict_behavior: true,
        }
    }
}

/// Result of one scan request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanOutcome {
    #[serde(flatten)]
    pub report: AnalysisReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prediction: Option<BehaviorPrediction>,
    /// True when the AI collaborator failed and only rule-based results are returned.
    pub degraded: bool,
}

/// Joins the static analyzer with an injected AI provider.
#[derive(Clone)]
pub struct ScanService {
    analyzer: StaticAnalyzer,
    ai: Option<Arc<dyn AiAnalysisProvider>>,
    config: ScanConfig,
}

impl std::fmt::Debug for ScanService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanService")
            .field("ai", &self.ai.as_ref().map(|p| p.name()))
            .field("config", &self.config)
            .finish()
    }
}

impl ScanService {
    /// Rule-based-only scanning.
    pub fn rules_only() -> Self {
        Self {
            analyzer: StaticAnalyzer::new(),
            ai: None,
            config: ScanConfig::default(),
        }
    }

    pub fn with_ai(ai: Arc<dyn AiAnalysisProvider>, config: ScanConfig) -> Self {
        Self {
            analyzer: StaticAnalyzer::new(),
            ai: Some(ai),
            config,
        }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn has_ai(&self) -> bool {
        self.ai.is_some()
    }

    /// Scan contract source.
    #[instrument(skip(self, code), fields(code_len = code.len()))]
    pub async fn scan(&self, code: &str) -> SentinelResult<ScanOutcome> {
        if code.trim().is_empty() {
            return Err(SentinelError::validation("Contract code is required"));
        }

        let rule_based = self.analyzer.report(code);

        let Some(ai) = self.ai.as_ref() else {
            return Ok(ScanOutcome {
                report: rule_based,
                prediction: None,
                degraded: false,
            });
        };

        let (analysis, prediction) = if self.config.predict_behavior {
            tokio::join!(ai.analyze(code), ai.predict_behavior(code))
        } else {
            (ai.analyze(code).await, Ok(None))
        };

        let prediction = prediction.unwrap_or_else(|e| {
            warn!(provider = ai.name(), error = %e, "Behavior prediction failed");
            None
        });

        match analysis {
            Ok(analysis) => {
                let report = aggregate(rule_based, ai_report(analysis));
                info!(
                    provider = ai.name(),
                    findings = report.vulnerabilities.len(),
                    risk_score = report.risk_score,
                    "Scan complete"
                );
                Ok(ScanOutcome {
                    report,
                    prediction,
                    degraded: false,
                })
            }
            Err(e) => match self.config.ai_policy {
                AiPolicy::Required => Err(e),
                AiPolicy::BestEffort => {
                    warn!(
                        provider = ai.name(),
                        error = %e,
                        "AI analysis unavailable, returning rule-based results"
                    );
                    Ok(ScanOutcome {
                        report: rule_based,
                        prediction,
                        degraded: true,
                    })
                }
            },
        }
    }
}

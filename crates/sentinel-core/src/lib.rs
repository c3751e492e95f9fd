//! # Sentinel Core - Move contract scanning
//!
//! Heuristic security scanning for Move smart contracts:
//!
//! - [`rules`]: the static rule table (pattern, category, severity, advice)
//! - [`StaticAnalyzer`]: applies the rules to source text
//! - [`normalizer`]: turns free-text AI analysis into findings
//! - [`scoring`]: maps findings to a 0-100 risk score
//! - [`aggregate`]: merges rule-based and AI-based reports
//! - [`ScanService`] / [`DeployService`]: one-shot pipelines over injected providers
//!
//! Collaborators (AI services, chain nodes, activity monitors, deployers) are
//! consumed through the traits in [`providers`].
//!
//! ```rust
//! use sentinel_core::StaticAnalyzer;
//!
//! let report = StaticAnalyzer::new().report("public fun transfer(s: &signer) {}");
//! assert_eq!(report.risk_score, 7);
//! ```

#![deny(unsafe_code)]

pub mod aggregate;
pub mod analyzer;
pub mod deploy;
pub mod error;
pub mod normalizer;
pub mod providers;
pub mod rules;
pub mod scan;
pub mod scoring;
pub mod types;

pub use aggregate::{aggregate, AI_SECTION_SEPARATOR};
pub use analyzer::{StaticAnalyzer, NO_VULNERABILITIES_SUMMARY, UNKNOWN_LOCATION};
pub use deploy::DeployService;
pub use error::{SentinelError, SentinelResult};
pub use normalizer::{ai_report, normalize};
pub use providers::{
    ActivityHandle, ActivityMonitorProvider, AiAnalysisProvider, ChainQueryProvider,
    ContractDeployer,
};
pub use rules::{builtin_rules, Rule, RuleTier};
pub use scan::{AiPolicy, ScanConfig, ScanOutcome, ScanService};
pub use scoring::{score, MAX_RISK_SCORE};
pub use types::{
    ActivityEvent, AiAnalysis, AnalysisReport, BehaviorPrediction, DeploymentReceipt, Network,
    RawTransaction, Severity, Transaction, TransactionStatus, Vulnerability,
};

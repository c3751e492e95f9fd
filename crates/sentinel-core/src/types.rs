//! Data model shared across the scanner, the monitor and the service binding.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SentinelError;

/// Ordinal risk classification of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    /// Contribution of one finding of this severity to the risk score.
    pub const fn weight(self) -> u32 {
        match self {
            Severity::Critical => 30,
            Severity::High => 15,
            Severity::Medium => 7,
            Severity::Low => 3,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single finding, produced by the static analyzer or the AI normalizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vulnerability {
    #[serde(rename = "type", alias = "category")]
    pub category: String,
    pub severity: Severity,
    pub description: String,
    /// Human-readable position reference, e.g. `Line 12`.
    pub location: String,
    pub recommendation: String,
}

/// Scored vulnerability report for one scan request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub vulnerabilities: Vec<Vulnerability>,
    /// Always within `0..=100`.
    pub risk_score: u8,
    pub summary: String,
    /// Free-text recommendations surfaced by an AI provider, passed through as-is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<Vec<String>>,
}

impl AnalysisReport {
    pub fn is_clean(&self) -> bool {
        self.vulnerabilities.is_empty()
    }
}

/// Target chain network.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    #[default]
    Testnet,
    Devnet,
}

impl Network {
    pub const ALL: [Network; 3] = [Network::Mainnet, Network::Testnet, Network::Devnet];

    pub const fn as_str(self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Devnet => "devnet",
        }
    }

    /// Public full-node REST endpoint for this network.
    pub const fn default_node_url(self) -> &'static str {
        match self {
            Network::Mainnet => "https://fullnode.mainnet.aptoslabs.com/v1",
            Network::Testnet => "https://fullnode.testnet.aptoslabs.com/v1",
            Network::Devnet => "https://fullnode.devnet.aptoslabs.com/v1",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = SentinelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "testnet" => Ok(Network::Testnet),
            "devnet" => Ok(Network::Devnet),
            other => Err(SentinelError::validation(format!(
                "unknown network '{}'; expected one of: mainnet, testnet, devnet",
                other
            ))),
        }
    }
}

/// Execution status of an observed transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Success,
    Failed,
}

/// Transaction record as returned by the chain query provider, before normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTransaction {
    /// Chain-assigned, monotonically increasing ordering key.
    pub version: u64,
    pub hash: String,
    /// Node-reported record type, e.g. `user_transaction`.
    pub kind: String,
    /// `None` while the transaction has not been executed.
    pub success: Option<bool>,
    pub timestamp: String,
    pub sender: String,
    #[serde(default)]
    pub arguments: Vec<serde_json::Value>,
}

/// Normalized transaction event delivered to monitor subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub version: u64,
    pub hash: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub status: TransactionStatus,
    pub timestamp: String,
    #[serde(rename = "from")]
    pub sender: String,
    #[serde(rename = "to")]
    pub recipient: String,
    pub value: String,
}

/// Discrete event emitted by a secondary activity monitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEvent {
    pub address: String,
    pub network: Network,
    pub kind: String,
    #[serde(default)]
    pub detail: serde_json::Value,
    pub observed_at: DateTime<Utc>,
}

/// Free-form analysis returned by an AI provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiAnalysis {
    pub text: String,
    #[serde(default)]
    pub recommendations: Option<Vec<String>>,
}

impl AiAnalysis {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            recommendations: None,
        }
    }
}

/// Optional behavioral prediction returned by an AI provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorPrediction {
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// Result of a contract submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentReceipt {
    pub address: String,
    pub tx_hash: String,
    pub status: String,
    pub network: Network,
}

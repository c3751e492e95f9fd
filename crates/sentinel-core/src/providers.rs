//! Collaborator interfaces.
//!
//! Providers are constructed explicitly and injected into the scan, deploy and
//! monitor pipelines; nothing here holds process-wide client state.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::SentinelResult;
use crate::types::{
    ActivityEvent, AiAnalysis, BehaviorPrediction, DeploymentReceipt, Network, RawTransaction,
};

/// External AI analysis service.
#[async_trait]
pub trait AiAnalysisProvider: Send + Sync {
    /// Short provider name used in errors and logs.
    fn name(&self) -> &'static str;

    /// Analyze contract source and return natural-language findings.
    async fn analyze(&self, code: &str) -> SentinelResult<AiAnalysis>;

    /// Predict runtime behavior of the contract. Providers without this capability return `None`.
    async fn predict_behavior(&self, _code: &str) -> SentinelResult<Option<BehaviorPrediction>> {
        Ok(None)
    }
}

/// Chain node query interface used by monitor sessions.
#[async_trait]
pub trait ChainQueryProvider: Send + Sync {
    /// Transactions touching `address` with version strictly greater than `after_version`.
    async fn transactions_since(
        &self,
        network: Network,
        address: &str,
        after_version: u64,
    ) -> SentinelResult<Vec<RawTransaction>>;
}

/// Handle to an attached secondary activity monitor.
#[async_trait]
pub trait ActivityHandle: Send + Sync {
    /// Stop emitting events. Safe to call more than once.
    async fn detach(&mut self);
}

/// Secondary activity-monitoring collaborator.
#[async_trait]
pub trait ActivityMonitorProvider: Send + Sync {
    /// Start watching `address`, emitting discrete events into `sink` until detached.
    async fn attach(
        &self,
        network: Network,
        address: &str,
        sink: mpsc::Sender<ActivityEvent>,
    ) -> SentinelResult<Box<dyn ActivityHandle>>;
}

/// Chain submission collaborator for compiled modules.
#[async_trait]
pub trait ContractDeployer: Send + Sync {
    async fn deploy(&self, module: &[u8], network: Network) -> SentinelResult<DeploymentReceipt>;
}

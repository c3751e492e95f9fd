//! Deterministic local deployer.
//!
//! Does not sign or submit anything. The account address and transaction hash
//! are derived from a BLAKE3 digest of the module bytes, so the same module on
//! the same network always yields the same receipt.

use async_trait::async_trait;
use sentinel_core::{ContractDeployer, DeploymentReceipt, Network, SentinelResult};
use tracing::info;

/// Status reported for every local deployment.
pub const LOCAL_DEPLOY_STATUS: &str = "success";

#[derive(Debug, Clone, Default)]
pub struct LocalDeployer;

impl LocalDeployer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ContractDeployer for LocalDeployer {
    async fn deploy(&self, module: &[u8], network: Network) -> SentinelResult<DeploymentReceipt> {
        let module_digest = blake3::hash(module);

        let mut hasher = blake3::Hasher::new();
        hasher.update(network.as_str().as_bytes());
        hasher.update(module_digest.as_bytes());
        let tx_digest = hasher.finalize();

        let receipt = DeploymentReceipt {
            address: format!("0x{}", module_digest.to_hex()),
            tx_hash: format!("0x{}", tx_digest.to_hex()),
            status: LOCAL_DEPLOY_STATUS.to_string(),
            network,
        };

        info!(
            network = %network,
            address = %receipt.address,
            "Recorded local deployment"
        );
        Ok(receipt)
    }
}

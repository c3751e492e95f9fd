//! Deploy pipeline: validation in front of the chain submission collaborator.

use std::sync::Arc;

use tracing::{error, info, instrument};

use crate::error::{SentinelError, SentinelResult};
use crate::providers::ContractDeployer;
use crate::types::{DeploymentReceipt, Network};

#[derive(Clone)]
pub struct DeployService {
    deployer: Arc<dyn ContractDeployer>,
}

impl DeployService {
    pub fn new(deployer: Arc<dyn ContractDeployer>) -> Self {
        Self { deployer }
    }

    /// Submit a compiled module to `network`.
    ///
    /// Any collaborator failure other than validation is reported as a deployment error.
    #[instrument(skip(self, module), fields(module_len = module.len(), network = %network))]
    pub async fn deploy(&self, module: &[u8], network: Network) -> SentinelResult<DeploymentReceipt> {
        if module.iter().all(u8::is_ascii_whitespace) {
            return Err(SentinelError::validation("Contract code is required"));
        }

        info!("Deploying contract");
        match self.deployer.deploy(module, network).await {
            Ok(receipt) => {
                info!(tx_hash = %receipt.tx_hash, address = %receipt.address, "Contract deployed");
                Ok(receipt)
            }
            Err(SentinelError::Validation(message)) => Err(SentinelError::Validation(message)),
            Err(SentinelError::Deployment(message)) => {
                error!(error = %message, "Contract deployment failed");
                Err(SentinelError::Deployment(message))
            }
            Err(other) => {
                error!(error = %other, "Contract deployment failed");
                Err(SentinelError::deployment(other.to_string()))
            }
        }
    }
}

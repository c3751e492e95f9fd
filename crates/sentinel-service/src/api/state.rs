//! Application state for API handlers

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sentinel_adapters::{AptosRestClient, LocalDeployer, OpenAiAnalyzer, ResourceActivityMonitor};
use sentinel_core::{
    ActivityMonitorProvider, ChainQueryProvider, DeployService, Network, ScanService,
};
use sentinel_monitor::{MonitorConfig, MonitorRegistry, MonitorStream};
use tracing::{info, warn};

use crate::config::ServiceConfig;
use crate::error::ServiceResult;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Scan pipeline
    pub scan: ScanService,

    /// Deploy pipeline
    pub deploy: DeployService,

    /// Chain node used by monitor sessions
    pub chain: Arc<dyn ChainQueryProvider>,

    /// Secondary activity monitor, if enabled
    pub activity: Option<Arc<dyn ActivityMonitorProvider>>,

    /// Per-session monitor configuration
    pub monitor: MonitorConfig,

    /// Network used when a request names none
    pub default_network: Network,

    /// Service version
    pub version: String,

    /// Service start time
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Create state from explicitly constructed collaborators
    pub fn new(
        scan: ScanService,
        deploy: DeployService,
        chain: Arc<dyn ChainQueryProvider>,
        activity: Option<Arc<dyn ActivityMonitorProvider>>,
        monitor: MonitorConfig,
    ) -> Self {
        Self {
            scan,
            deploy,
            chain,
            activity,
            monitor,
            default_network: Network::default(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: Utc::now(),
        }
    }

    pub fn with_default_network(mut self, network: Network) -> Self {
        self.default_network = network;
        self
    }

    /// Build the production collaborators from configuration
    pub fn bootstrap(config: &ServiceConfig) -> ServiceResult<Self> {
        let node = AptosRestClient::with_timeout(
            config.networks.endpoints(),
            config.monitor.node_timeout(),
        )?
        .with_page_limit(config.monitor.page_limit);

        let activity: Option<Arc<dyn ActivityMonitorProvider>> = if config.monitor.activity_enabled {
            Some(Arc::new(ResourceActivityMonitor::new(
                node.clone(),
                config.monitor.activity_interval(),
            )))
        } else {
            None
        };

        let scan = match OpenAiAnalyzer::from_env(config.analysis.openai_config())? {
            Some(analyzer) => {
                info!(
                    model = %config.analysis.openai_model,
                    policy = ?config.analysis.ai_policy,
                    "AI analysis enabled"
                );
                ScanService::with_ai(Arc::new(analyzer), config.analysis.scan_config())
            }
            None => {
                warn!("OPENAI_API_KEY not set, contract analysis runs rule-based only");
                ScanService::rules_only()
            }
        };

        let deploy = DeployService::new(Arc::new(LocalDeployer::new()));

        Ok(Self::new(
            scan,
            deploy,
            Arc::new(node),
            activity,
            config.monitor.monitor_config(),
        )
        .with_default_network(config.networks.default_network))
    }

    /// Fresh registry for one subscriber connection
    pub fn monitor_registry(&self) -> (MonitorRegistry, MonitorStream) {
        MonitorRegistry::new(
            self.chain.clone(),
            self.activity.clone(),
            self.monitor.clone(),
        )
    }

    /// Uptime as a human-readable string
    pub fn uptime(&self) -> String {
        let secs = (Utc::now() - self.started_at).num_seconds().max(0);
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

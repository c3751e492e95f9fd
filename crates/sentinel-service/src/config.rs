//! Configuration for sentineld

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use sentinel_adapters::{NodeEndpoints, OpenAiConfig, DEFAULT_OPENAI_ENDPOINT};
use sentinel_core::{AiPolicy, Network, ScanConfig};
use sentinel_monitor::MonitorConfig;
use serde::{Deserialize, Serialize};

/// Main service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Chain node endpoints
    #[serde(default)]
    pub networks: NetworksConfig,

    /// Scan pipeline configuration
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Live monitoring configuration
    #[serde(default)]
    pub monitor: MonitorSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// Maximum request body size in bytes
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            enable_cors: true,
            max_body_size: default_max_body_size(),
        }
    }
}

/// Node REST endpoint per network
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworksConfig {
    #[serde(default = "default_mainnet_url")]
    pub mainnet: String,

    #[serde(default = "default_testnet_url")]
    pub testnet: String,

    #[serde(default = "default_devnet_url")]
    pub devnet: String,

    /// Network used when a request does not name one
    #[serde(default)]
    pub default_network: Network,
}

impl Default for NetworksConfig {
    fn default() -> Self {
        Self {
            mainnet: default_mainnet_url(),
            testnet: default_testnet_url(),
            devnet: default_devnet_url(),
            default_network: Network::default(),
        }
    }
}

impl NetworksConfig {
    pub fn endpoints(&self) -> NodeEndpoints {
        NodeEndpoints {
            mainnet: self.mainnet.clone(),
            testnet: self.testnet.clone(),
            devnet: self.devnet.clone(),
        }
    }
}

/// Scan pipeline configuration
///
/// The OpenAI key is never read from here, only from `OPENAI_API_KEY`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// What a scan does when the AI provider fails
    #[serde(default)]
    pub ai_policy: AiPolicy,

    /// Ask the AI provider for a behavior prediction
    #[serde(default = "default_true")]
    pub predict_behavior: bool,

    #[serde(default = "default_openai_endpoint")]
    pub openai_endpoint: String,

    #[serde(default = "default_openai_model")]
    pub openai_model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// AI request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            ai_policy: AiPolicy::default(),
            predict_behavior: true,
            openai_endpoint: default_openai_endpoint(),
            openai_model: default_openai_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl AnalysisConfig {
    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig {
            ai_policy: self.ai_policy,
            predict_behavior: self.predict_behavior,
        }
    }

    pub fn openai_config(&self) -> OpenAiConfig {
        OpenAiConfig {
            endpoint: self.openai_endpoint.clone(),
            model: self.openai_model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}

/// Live monitoring configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorSettings {
    /// Delay between transaction polls in seconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Per-subscriber event channel capacity
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,

    /// Transactions requested per poll
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,

    /// Delay between account resource polls in seconds
    #[serde(default = "default_activity_interval")]
    pub activity_interval_secs: u64,

    /// Attach the account resource monitor to each session
    #[serde(default = "default_true")]
    pub activity_enabled: bool,

    /// Node request timeout in seconds
    #[serde(default = "default_node_timeout")]
    pub node_timeout_secs: u64,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            event_buffer: default_event_buffer(),
            page_limit: default_page_limit(),
            activity_interval_secs: default_activity_interval(),
            activity_enabled: true,
            node_timeout_secs: default_node_timeout(),
        }
    }
}

impl MonitorSettings {
    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            poll_interval: Duration::from_secs(self.poll_interval_secs.max(1)),
            event_buffer: self.event_buffer,
            ..MonitorConfig::default()
        }
    }

    pub fn activity_interval(&self) -> Duration {
        Duration::from_secs(self.activity_interval_secs.max(1))
    }

    pub fn node_timeout(&self) -> Duration {
        Duration::from_secs(self.node_timeout_secs.max(1))
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// Default value helpers
fn default_true() -> bool {
    true
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::LOCALHOST, 3001))
}

fn default_max_body_size() -> usize {
    1024 * 1024
}

fn default_mainnet_url() -> String {
    Network::Mainnet.default_node_url().to_string()
}

fn default_testnet_url() -> String {
    Network::Testnet.default_node_url().to_string()
}

fn default_devnet_url() -> String {
    Network::Devnet.default_node_url().to_string()
}

fn default_openai_endpoint() -> String {
    DEFAULT_OPENAI_ENDPOINT.to_string()
}

fn default_openai_model() -> String {
    "gpt-4".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    2000
}

fn default_request_timeout() -> u64 {
    60
}

fn default_poll_interval() -> u64 {
    5
}

fn default_event_buffer() -> usize {
    256
}

fn default_page_limit() -> u32 {
    100
}

fn default_activity_interval() -> u64 {
    15
}

fn default_node_timeout() -> u64 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

impl ServiceConfig {
    /// Load configuration from defaults, an optional file and `SENTINEL_` environment variables
    ///
    /// Nested keys use a double underscore, e.g. `SENTINEL_SERVER__LISTEN_ADDR`.
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&ServiceConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("SENTINEL")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }
}

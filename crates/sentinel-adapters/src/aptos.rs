//! Aptos full-node REST client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use sentinel_core::{ChainQueryProvider, Network, RawTransaction, SentinelError, SentinelResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::http::{build_http_client, ensure_success, DEFAULT_REQUEST_TIMEOUT};

const PROVIDER: &str = "aptos";

/// Default number of transactions requested per page.
pub const DEFAULT_PAGE_LIMIT: u32 = 100;

/// Node REST endpoint per network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeEndpoints {
    pub mainnet: String,
    pub testnet: String,
    pub devnet: String,
}

impl Default for NodeEndpoints {
    fn default() -> Self {
        Self {
            mainnet: Network::Mainnet.default_node_url().to_string(),
            testnet: Network::Testnet.default_node_url().to_string(),
            devnet: Network::Devnet.default_node_url().to_string(),
        }
    }
}

impl NodeEndpoints {
    /// All networks served by one node, e.g. a local test node.
    pub fn single(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            mainnet: url.clone(),
            testnet: url.clone(),
            devnet: url,
        }
    }

    pub fn url(&self, network: Network) -> &str {
        let url = match network {
            Network::Mainnet => &self.mainnet,
            Network::Testnet => &self.testnet,
            Network::Devnet => &self.devnet,
        };
        url.trim_end_matches('/')
    }
}

#[derive(Debug, Deserialize)]
struct NodePayload {
    #[serde(default)]
    arguments: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct NodeTransaction {
    version: String,
    hash: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    sequence_number: Option<String>,
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default)]
    sender: Option<String>,
    #[serde(default)]
    payload: Option<NodePayload>,
}

impl NodeTransaction {
    fn sequence_number(&self) -> Option<u64> {
        self.sequence_number.as_deref().and_then(|s| s.parse().ok())
    }

    fn into_raw(self) -> SentinelResult<RawTransaction> {
        let version = self.version.parse::<u64>().map_err(|e| {
            SentinelError::provider(
                PROVIDER,
                format!("invalid transaction version '{}': {}", self.version, e),
            )
        })?;

        Ok(RawTransaction {
            version,
            hash: self.hash,
            kind: self.kind,
            success: self.success,
            timestamp: self.timestamp.unwrap_or_default(),
            sender: self.sender.unwrap_or_default(),
            arguments: self.payload.map(|p| p.arguments).unwrap_or_default(),
        })
    }
}

/// REST client over the per-network full-node endpoints.
#[derive(Debug, Clone)]
pub struct AptosRestClient {
    client: Client,
    endpoints: NodeEndpoints,
    page_limit: u32,
}

impl AptosRestClient {
    pub fn new(endpoints: NodeEndpoints) -> SentinelResult<Self> {
        Self::with_timeout(endpoints, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(endpoints: NodeEndpoints, timeout: Duration) -> SentinelResult<Self> {
        Ok(Self {
            client: build_http_client(timeout)?,
            endpoints,
            page_limit: DEFAULT_PAGE_LIMIT,
        })
    }

    pub fn with_page_limit(mut self, page_limit: u32) -> Self {
        self.page_limit = page_limit.max(1);
        self
    }

    pub fn endpoints(&self) -> &NodeEndpoints {
        &self.endpoints
    }

    /// Most recent page of transactions sent by `address`.
    #[instrument(skip(self), fields(network = %network))]
    pub async fn account_transactions(
        &self,
        network: Network,
        address: &str,
    ) -> SentinelResult<Vec<RawTransaction>> {
        self.transactions_page(network, address, None, self.page_limit)
            .await?
            .into_iter()
            .map(NodeTransaction::into_raw)
            .collect()
    }

    /// Every transaction of `address` above `after_version`, in version order.
    ///
    /// Starts from the newest page and walks back by account sequence number
    /// until a page reaches the cursor, comes back short, or hits sequence 0.
    #[instrument(skip(self), fields(network = %network))]
    pub async fn account_transactions_since(
        &self,
        network: Network,
        address: &str,
        after_version: u64,
    ) -> SentinelResult<Vec<RawTransaction>> {
        let mut collected = Vec::new();
        let mut start = None;
        let mut limit = self.page_limit;
        let mut pages = 0usize;

        loop {
            let page = self.transactions_page(network, address, start, limit).await?;
            pages += 1;

            let full = page.len() >= limit as usize;
            let lowest_sequence = page.iter().filter_map(NodeTransaction::sequence_number).min();
            let mut reached_cursor = false;

            for record in page {
                let raw = record.into_raw()?;
                if raw.version > after_version {
                    collected.push(raw);
                } else {
                    reached_cursor = true;
                }
            }

            match lowest_sequence {
                Some(lowest) if full && !reached_cursor && lowest > 0 => {
                    limit = u32::try_from(lowest).map_or(self.page_limit, |l| l.min(self.page_limit));
                    start = Some(lowest - u64::from(limit));
                }
                _ => break,
            }
        }

        collected.sort_by_key(|tx| tx.version);
        collected.dedup_by_key(|tx| tx.version);

        debug!(
            address = %address,
            after_version,
            pages,
            new = collected.len(),
            "Fetched account transactions"
        );
        Ok(collected)
    }

    async fn transactions_page(
        &self,
        network: Network,
        address: &str,
        start: Option<u64>,
        limit: u32,
    ) -> SentinelResult<Vec<NodeTransaction>> {
        let url = format!(
            "{}/accounts/{}/transactions",
            self.endpoints.url(network),
            address
        );

        let mut request = self.client.get(&url).query(&[("limit", limit)]);
        if let Some(start) = start {
            request = request.query(&[("start", start)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SentinelError::provider(PROVIDER, format!("request failed: {}", e)))?;
        let response = ensure_success(PROVIDER, response).await?;

        response.json().await.map_err(|e| {
            SentinelError::provider(PROVIDER, format!("invalid transactions response: {}", e))
        })
    }

    /// Resources currently stored under `address`.
    #[instrument(skip(self), fields(network = %network))]
    pub async fn account_resources(&self, network: Network, address: &str) -> SentinelResult<Vec<Value>> {
        let url = format!("{}/accounts/{}/resources", self.endpoints.url(network), address);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SentinelError::provider(PROVIDER, format!("request failed: {}", e)))?;
        let response = ensure_success(PROVIDER, response).await?;

        response.json().await.map_err(|e| {
            SentinelError::provider(PROVIDER, format!("invalid resources response: {}", e))
        })
    }
}

#[async_trait]
impl ChainQueryProvider for AptosRestClient {
    async fn transactions_since(
        &self,
        network: Network,
        address: &str,
        after_version: u64,
    ) -> SentinelResult<Vec<RawTransaction>> {
        self.account_transactions_since(network, address, after_version).await
    }
}

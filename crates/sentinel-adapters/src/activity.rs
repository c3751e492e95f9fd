//! Secondary monitor watching an account's resource set.
//!
//! Emits an `ActivityEvent` each time the BLAKE3 digest of the account's
//! resources changes between polls.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sentinel_core::{
    ActivityEvent, ActivityHandle, ActivityMonitorProvider, Network, SentinelResult,
};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::aptos::AptosRestClient;

/// Event kind emitted when the resource set changes.
pub const RESOURCES_CHANGED: &str = "resources_changed";

/// Default delay between resource polls.
pub const DEFAULT_ACTIVITY_INTERVAL: Duration = Duration::from_secs(15);

#[derive(Debug, Clone)]
pub struct ResourceActivityMonitor {
    node: AptosRestClient,
    interval: Duration,
}

impl ResourceActivityMonitor {
    pub fn new(node: AptosRestClient, interval: Duration) -> Self {
        Self { node, interval }
    }
}

fn digest(resources: &[Value]) -> String {
    let bytes = serde_json::to_vec(resources).unwrap_or_default();
    blake3::hash(&bytes).to_hex().to_string()
}

fn resource_types(resources: &[Value]) -> Vec<&str> {
    resources
        .iter()
        .filter_map(|r| r.get("type").and_then(Value::as_str))
        .collect()
}

#[async_trait]
impl ActivityMonitorProvider for ResourceActivityMonitor {
    async fn attach(
        &self,
        network: Network,
        address: &str,
        sink: mpsc::Sender<ActivityEvent>,
    ) -> SentinelResult<Box<dyn ActivityHandle>> {
        // Baseline read. Fails the attach when the account cannot be read.
        let baseline = self.node.account_resources(network, address).await?;

        let watcher = ResourceWatcher {
            node: self.node.clone(),
            network,
            address: address.to_string(),
            sink,
            last_digest: digest(&baseline),
            last_types: resource_types(&baseline)
                .into_iter()
                .map(str::to_string)
                .collect(),
        };

        info!(
            address = %address,
            network = %network,
            resources = baseline.len(),
            "Resource activity monitor attached"
        );

        let task = tokio::spawn(watcher.run(self.interval));
        Ok(Box::new(ResourceWatchHandle { task: Some(task) }))
    }
}

struct ResourceWatcher {
    node: AptosRestClient,
    network: Network,
    address: String,
    sink: mpsc::Sender<ActivityEvent>,
    last_digest: String,
    last_types: Vec<String>,
}

impl ResourceWatcher {
    async fn run(mut self, period: Duration) {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let resources = match self.node.account_resources(self.network, &self.address).await {
                Ok(resources) => resources,
                Err(e) => {
                    warn!(address = %self.address, error = %e, "Resource poll failed");
                    continue;
                }
            };

            let current = digest(&resources);
            if current == self.last_digest {
                continue;
            }

            let types: Vec<String> = resource_types(&resources)
                .into_iter()
                .map(str::to_string)
                .collect();
            let added: Vec<&String> = types.iter().filter(|t| !self.last_types.contains(t)).collect();
            let removed: Vec<&String> = self.last_types.iter().filter(|t| !types.contains(t)).collect();

            let event = ActivityEvent {
                address: self.address.clone(),
                network: self.network,
                kind: RESOURCES_CHANGED.to_string(),
                detail: json!({
                    "digest": current,
                    "resourceCount": resources.len(),
                    "added": added,
                    "removed": removed,
                }),
                observed_at: Utc::now(),
            };

            debug!(address = %self.address, digest = %current, "Account resources changed");
            if self.sink.send(event).await.is_err() {
                break;
            }

            self.last_digest = current;
            self.last_types = types;
        }
    }
}

/// Aborts the watcher task on detach or drop.
struct ResourceWatchHandle {
    task: Option<JoinHandle<()>>,
}

#[async_trait]
impl ActivityHandle for ResourceWatchHandle {
    async fn detach(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
        }
    }
}

impl Drop for ResourceWatchHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

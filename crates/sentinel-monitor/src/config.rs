//! Monitor configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration shared by every session a registry creates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Wall-clock delay between poll ticks.
    pub poll_interval: Duration,

    /// Capacity of the per-subscriber event channel.
    pub event_buffer: usize,

    /// Capacity of the channel between a secondary monitor and the subscriber.
    pub activity_buffer: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            event_buffer: 256,
            activity_buffer: 64,
        }
    }
}

impl MonitorConfig {
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

//! Events delivered to a monitor subscriber, and transaction normalization.

use sentinel_core::{ActivityEvent, Network, RawTransaction, Transaction, TransactionStatus};
use serde::Serialize;

use crate::error::{MonitorError, MonitorResult};
use crate::session::SessionId;

/// Record type the node reports for transactions not yet executed.
const PENDING_KIND: &str = "pending_transaction";

/// One item on a subscriber's stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum MonitorEvent {
    /// New transaction on the monitored address.
    Transaction(Transaction),

    /// Event from the secondary activity monitor.
    Activity(ActivityEvent),

    /// Error report. Does not end the stream.
    Error { message: String },
}

impl MonitorEvent {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

/// A [`MonitorEvent`] stamped with the session that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionEvent {
    pub session: SessionId,
    pub event: MonitorEvent,
}

impl SessionEvent {
    pub fn new(session: SessionId, event: MonitorEvent) -> Self {
        Self { session, event }
    }
}

/// Contract address and network a session watches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct MonitorTarget {
    pub address: String,
    pub network: Network,
}

impl MonitorTarget {
    /// Validate request parameters. A missing or blank address is rejected.
    pub fn parse(address: Option<&str>, network: Network) -> MonitorResult<Self> {
        let address = address.map(str::trim).unwrap_or_default();
        if address.is_empty() {
            return Err(MonitorError::Validation(
                "Contract address is required".to_string(),
            ));
        }

        Ok(Self {
            address: address.to_string(),
            network,
        })
    }
}

/// Normalize a raw node record into the subscriber-facing transaction shape.
pub fn normalize_transaction(raw: RawTransaction, monitored_address: &str) -> Transaction {
    let status = if raw.kind == PENDING_KIND {
        TransactionStatus::Pending
    } else {
        match raw.success {
            Some(true) => TransactionStatus::Success,
            Some(false) => TransactionStatus::Failed,
            None => TransactionStatus::Pending,
        }
    };

    let value = raw
        .arguments
        .first()
        .map(|arg| match arg {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .unwrap_or_else(|| "0".to_string());

    Transaction {
        version: raw.version,
        hash: raw.hash,
        kind: raw.kind,
        status,
        timestamp: raw.timestamp,
        sender: raw.sender,
        recipient: monitored_address.to_string(),
        value,
    }
}

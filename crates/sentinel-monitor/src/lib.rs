//! # Sentinel Monitor - live transaction monitoring
//!
//! Polling sessions that stream new transactions of a contract address to a
//! subscriber:
//!
//! - [`MonitorSession`]: `Idle -> Active -> Stopped` poll loop with a
//!   monotonic version cursor
//! - [`MonitorRegistry`]: per-subscriber owner of at most one active session
//!   and its secondary activity monitor
//! - [`MonitorStream`]: what the subscriber receives, as [`MonitorEvent`]s
//!   of its current session only

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod event;
pub mod registry;
pub mod session;

pub use config::MonitorConfig;
pub use error::{MonitorError, MonitorResult};
pub use event::{normalize_transaction, MonitorEvent, MonitorTarget, SessionEvent};
pub use registry::{MonitorRegistry, MonitorStream};
pub use session::{MonitorSession, SessionId, SessionState, SessionStatus, GENESIS_VERSION};

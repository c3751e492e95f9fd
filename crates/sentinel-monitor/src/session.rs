//! Per-subscriber monitor session.
//!
//! A session moves `Idle -> Active -> Stopped`. While active, a tokio task
//! polls the chain node on a fixed interval for transactions past the cursor,
//! advances the cursor, then delivers each transaction to the subscriber.
//! The cursor is written only by that task. A task that ends on its own
//! because the subscriber went away publishes `Stopped` itself.

use std::fmt;
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use sentinel_core::ChainQueryProvider;
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::{MonitorError, MonitorResult};
use crate::event::{normalize_transaction, MonitorEvent, MonitorTarget, SessionEvent};

/// Cursor value before any transaction has been seen.
pub const GENESIS_VERSION: u64 = 0;

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// Constructed, not yet polling.
    Idle,
    /// Polling on the configured interval.
    Active,
    /// Terminal. Cursor frozen, no further network calls.
    Stopped,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => f.write_str("idle"),
            SessionState::Active => f.write_str("active"),
            SessionState::Stopped => f.write_str("stopped"),
        }
    }
}

/// Unique identifier of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session:{}", self.0)
    }
}

/// Read-only view of a session's state and cursor.
#[derive(Debug, Clone)]
pub struct SessionStatus {
    id: SessionId,
    target: MonitorTarget,
    state: watch::Receiver<SessionState>,
    cursor: Arc<AtomicU64>,
}

impl SessionStatus {
    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn target(&self) -> &MonitorTarget {
        &self.target
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Highest version already delivered (or being delivered).
    pub fn cursor(&self) -> u64 {
        self.cursor.load(Ordering::Acquire)
    }

    pub fn is_active(&self) -> bool {
        self.state() == SessionState::Active
    }
}

/// Handle owning one monitoring session.
pub struct MonitorSession {
    id: SessionId,
    target: MonitorTarget,
    chain: Arc<dyn ChainQueryProvider>,
    sink: mpsc::Sender<SessionEvent>,
    poll_interval: Duration,
    state: Arc<watch::Sender<SessionState>>,
    cursor: Arc<AtomicU64>,
    cancel: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl fmt::Debug for MonitorSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MonitorSession")
            .field("id", &self.id)
            .field("target", &self.target)
            .field("state", &*self.state.borrow())
            .field("cursor", &self.cursor.load(Ordering::Acquire))
            .finish()
    }
}

impl MonitorSession {
    /// Create an idle session delivering into `sink`.
    pub fn new(
        target: MonitorTarget,
        chain: Arc<dyn ChainQueryProvider>,
        sink: mpsc::Sender<SessionEvent>,
        poll_interval: Duration,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::Idle);
        let (cancel, _) = watch::channel(false);

        Self {
            id: SessionId::generate(),
            target,
            chain,
            sink,
            poll_interval,
            state: Arc::new(state),
            cursor: Arc::new(AtomicU64::new(GENESIS_VERSION)),
            cancel,
            task: None,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn target(&self) -> &MonitorTarget {
        &self.target
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    pub fn cursor(&self) -> u64 {
        self.cursor.load(Ordering::Acquire)
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            id: self.id,
            target: self.target.clone(),
            state: self.state.subscribe(),
            cursor: self.cursor.clone(),
        }
    }

    /// `Idle -> Active`: schedule the recurring poll tick.
    ///
    /// Rejected without side effects when the session is already active or stopped.
    pub fn start(&mut self) -> MonitorResult<()> {
        let current = self.state();
        if current != SessionState::Idle {
            return Err(MonitorError::InvalidTransition {
                from: current,
                to: SessionState::Active,
            });
        }

        let poller = Poller {
            session_id: self.id,
            target: self.target.clone(),
            chain: self.chain.clone(),
            sink: self.sink.clone(),
            cursor: self.cursor.clone(),
            cancel: self.cancel.subscribe(),
            state: self.state.clone(),
        };
        self.state.send_replace(SessionState::Active);
        self.task = Some(tokio::spawn(poller.run(self.poll_interval)));

        info!(
            session = %self.id,
            address = %self.target.address,
            network = %self.target.network,
            interval = ?self.poll_interval,
            "Monitor session started"
        );
        Ok(())
    }

    /// `Active -> Stopped`. No-op before `start` and after a previous `stop`.
    ///
    /// Cancels the poll task and waits for it to exit, so nothing is sent into
    /// the sink after this returns. An in-flight node query or a delivery
    /// blocked on a full sink is abandoned.
    pub async fn stop(&mut self) {
        let Some(task) = self.task.take() else {
            return;
        };

        self.cancel.send_replace(true);
        if let Err(e) = task.await {
            if e.is_panic() {
                error!(session = %self.id, "Monitor poll task panicked");
            }
        }
        self.state.send_replace(SessionState::Stopped);

        info!(
            session = %self.id,
            cursor = self.cursor(),
            "Monitor session stopped"
        );
    }
}

impl Drop for MonitorSession {
    fn drop(&mut self) {
        self.cancel.send_replace(true);
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Poll loop state moved into the session task.
struct Poller {
    session_id: SessionId,
    target: MonitorTarget,
    chain: Arc<dyn ChainQueryProvider>,
    sink: mpsc::Sender<SessionEvent>,
    cursor: Arc<AtomicU64>,
    cancel: watch::Receiver<bool>,
    state: Arc<watch::Sender<SessionState>>,
}

impl Poller {
    async fn run(mut self, period: Duration) {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.changed() => break,
                _ = ticker.tick() => {}
            }

            if self.tick().await.is_break() {
                break;
            }
        }

        if !*self.cancel.borrow() {
            self.state.send_replace(SessionState::Stopped);
        }
        debug!(session = %self.session_id, "Monitor poll loop exited");
    }

    /// One poll. Node errors are logged and retried on the next tick.
    async fn tick(&mut self) -> ControlFlow<()> {
        let after = self.cursor.load(Ordering::Acquire);

        let fetched = tokio::select! {
            biased;
            _ = self.cancel.changed() => return ControlFlow::Break(()),
            result = self.chain.transactions_since(self.target.network, &self.target.address, after) => result,
        };

        let mut records = match fetched {
            Ok(records) => records,
            Err(e) => {
                warn!(
                    session = %self.session_id,
                    address = %self.target.address,
                    error = %e,
                    "Transaction monitoring error"
                );
                return ControlFlow::Continue(());
            }
        };

        records.retain(|raw| raw.version > after);
        records.sort_by_key(|raw| raw.version);
        records.dedup_by_key(|raw| raw.version);

        if !records.is_empty() {
            debug!(
                session = %self.session_id,
                count = records.len(),
                after_version = after,
                "Delivering transactions"
            );
        }

        for raw in records {
            if *self.cancel.borrow() {
                return ControlFlow::Break(());
            }

            let transaction = normalize_transaction(raw, &self.target.address);
            self.cursor.store(transaction.version, Ordering::Release);

            let event = SessionEvent::new(self.session_id, MonitorEvent::Transaction(transaction));
            let delivered = tokio::select! {
                biased;
                _ = self.cancel.changed() => return ControlFlow::Break(()),
                sent = self.sink.send(event) => sent.is_ok(),
            };

            if !delivered {
                debug!(session = %self.session_id, "Subscriber gone, ending poll loop");
                return ControlFlow::Break(());
            }
        }

        ControlFlow::Continue(())
    }
}

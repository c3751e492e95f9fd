//! Per-subscriber session registry.
//!
//! Each subscriber connection owns one registry. The registry holds at most one
//! active monitor (primary session plus optional secondary activity monitor)
//! and replaces or tears it down atomically.
//!
//! Every event on the shared subscriber channel carries the id of the session
//! that produced it. [`MonitorStream`] yields only events of the session the
//! registry currently publishes, so anything a stopped or replaced session left
//! in the buffer is discarded.

use std::sync::Arc;

use sentinel_core::{ActivityEvent, ActivityHandle, ActivityMonitorProvider, ChainQueryProvider};
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use crate::config::MonitorConfig;
use crate::error::MonitorResult;
use crate::event::{MonitorEvent, MonitorTarget, SessionEvent};
use crate::session::{MonitorSession, SessionId, SessionStatus};

/// The monitor currently owned by a subscriber.
struct ActiveMonitor {
    session: MonitorSession,
    activity: Option<Box<dyn ActivityHandle>>,
    forwarder: Option<JoinHandle<()>>,
}

impl ActiveMonitor {
    async fn shutdown(mut self) {
        self.session.stop().await;

        if let Some(mut handle) = self.activity.take() {
            handle.detach().await;
        }

        if let Some(forwarder) = self.forwarder.take() {
            forwarder.abort();
            let _ = forwarder.await;
        }

        debug!(session = %self.session.id(), "Monitor torn down");
    }
}

impl Drop for ActiveMonitor {
    fn drop(&mut self) {
        if let Some(forwarder) = self.forwarder.take() {
            forwarder.abort();
        }
    }
}

/// Receiving end of a subscriber's event stream.
pub struct MonitorStream {
    events: mpsc::Receiver<SessionEvent>,
    current: watch::Receiver<Option<SessionId>>,
}

impl MonitorStream {
    /// Next event of the currently active session.
    ///
    /// Events of any other session are dropped. Returns `None` once the
    /// registry and every session feeding it are gone. Cancel safe.
    pub async fn recv(&mut self) -> Option<MonitorEvent> {
        loop {
            let SessionEvent { session, event } = self.events.recv().await?;
            if *self.current.borrow() == Some(session) {
                return Some(event);
            }
            trace!(session = %session, "Dropping event of inactive session");
        }
    }
}

/// Owns the single active monitor of one subscriber.
pub struct MonitorRegistry {
    chain: Arc<dyn ChainQueryProvider>,
    activity: Option<Arc<dyn ActivityMonitorProvider>>,
    config: MonitorConfig,
    sink: mpsc::Sender<SessionEvent>,
    published: watch::Sender<Option<SessionId>>,
    current: Mutex<Option<ActiveMonitor>>,
}

impl MonitorRegistry {
    /// Create a registry and the receiving end of its subscriber stream.
    pub fn new(
        chain: Arc<dyn ChainQueryProvider>,
        activity: Option<Arc<dyn ActivityMonitorProvider>>,
        config: MonitorConfig,
    ) -> (Self, MonitorStream) {
        let (sink, events) = mpsc::channel(config.event_buffer.max(1));
        let (published, current) = watch::channel(None);
        let registry = Self {
            chain,
            activity,
            config,
            sink,
            published,
            current: Mutex::new(None),
        };
        (registry, MonitorStream { events, current })
    }

    /// Stop any existing monitor, then start one for `target`.
    ///
    /// The secondary activity monitor is attached alongside the primary session.
    /// An attach failure is reported on the stream as an error event and the
    /// primary session keeps running.
    pub async fn replace(&self, target: MonitorTarget) -> MonitorResult<SessionStatus> {
        let mut current = self.current.lock().await;
        self.published.send_replace(None);

        if let Some(previous) = current.take() {
            previous.shutdown().await;
        }

        let mut session = MonitorSession::new(
            target.clone(),
            self.chain.clone(),
            self.sink.clone(),
            self.config.poll_interval,
        );
        let session_id = session.id();
        session.start()?;
        self.published.send_replace(Some(session_id));
        let status = session.status();

        let mut monitor = ActiveMonitor {
            session,
            activity: None,
            forwarder: None,
        };

        if let Some(provider) = self.activity.as_ref() {
            let (activity_tx, activity_rx) = mpsc::channel(self.config.activity_buffer.max(1));
            match provider
                .attach(target.network, &target.address, activity_tx)
                .await
            {
                Ok(handle) => {
                    monitor.activity = Some(handle);
                    monitor.forwarder = Some(tokio::spawn(forward_activity(
                        session_id,
                        activity_rx,
                        self.sink.clone(),
                    )));
                }
                Err(e) => {
                    warn!(
                        address = %target.address,
                        network = %target.network,
                        error = %e,
                        "Activity monitor attach failed"
                    );
                    let event = MonitorEvent::error(format!("Activity monitoring unavailable: {}", e));
                    if self.sink.try_send(SessionEvent::new(session_id, event)).is_err() {
                        debug!("Subscriber stream full or closed, dropping error event");
                    }
                }
            }
        }

        info!(
            session = %session_id,
            address = %target.address,
            network = %target.network,
            "Monitoring started"
        );

        *current = Some(monitor);
        Ok(status)
    }

    /// Stop the active monitor, if any. Returns whether one was running.
    ///
    /// Once this returns the stream yields nothing further from that monitor.
    pub async fn teardown(&self) -> bool {
        let previous = {
            let mut current = self.current.lock().await;
            self.published.send_replace(None);
            current.take()
        };

        match previous {
            Some(monitor) => {
                monitor.shutdown().await;
                info!("Monitoring stopped");
                true
            }
            None => false,
        }
    }

    /// Status of the active monitor's primary session.
    pub async fn active_status(&self) -> Option<SessionStatus> {
        self.current
            .lock()
            .await
            .as_ref()
            .map(|monitor| monitor.session.status())
    }

    /// Whether a secondary activity monitor is configured.
    pub fn has_activity_monitor(&self) -> bool {
        self.activity.is_some()
    }
}

async fn forward_activity(
    session: SessionId,
    mut activity: mpsc::Receiver<ActivityEvent>,
    sink: mpsc::Sender<SessionEvent>,
) {
    while let Some(event) = activity.recv().await {
        let event = SessionEvent::new(session, MonitorEvent::Activity(event));
        if sink.send(event).await.is_err() {
            break;
        }
    }
}

//! Live monitoring over WebSocket
//!
//! Each connection owns one `MonitorRegistry`. Client messages:
//! `{"type":"monitor","contractAddress":..,"network":..}` and
//! `{"type":"stop-monitoring"}`. The registry is torn down on disconnect.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use sentinel_core::{ActivityEvent, Network, Transaction};
use sentinel_monitor::{MonitorError, MonitorEvent, MonitorRegistry, MonitorTarget};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::api::state::AppState;

/// Message sent by the client
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
    Monitor {
        #[serde(default, rename = "contractAddress")]
        contract_address: Option<String>,
        #[serde(default)]
        network: Option<String>,
    },
    StopMonitoring,
}

/// Message sent to the client
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerMessage {
    Transaction {
        data: Transaction,
    },
    Activity {
        data: ActivityEvent,
    },
    Error {
        message: String,
    },
    /// Acknowledges a monitor request
    Monitoring {
        #[serde(rename = "sessionId")]
        session_id: String,
        #[serde(rename = "contractAddress")]
        contract_address: String,
        network: Network,
    },
    /// Acknowledges a stop request
    Stopped,
}

impl ServerMessage {
    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
        }
    }
}

impl From<MonitorEvent> for ServerMessage {
    fn from(event: MonitorEvent) -> Self {
        match event {
            MonitorEvent::Transaction(data) => ServerMessage::Transaction { data },
            MonitorEvent::Activity(data) => ServerMessage::Activity { data },
            MonitorEvent::Error { message } => ServerMessage::Error { message },
        }
    }
}

fn client_error(err: MonitorError) -> ServerMessage {
    match err {
        MonitorError::Validation(message) => ServerMessage::error(message),
        other => ServerMessage::error(other.to_string()),
    }
}

/// Command handling for one subscriber connection
pub struct MonitorConnection {
    registry: MonitorRegistry,
    default_network: Network,
}

impl MonitorConnection {
    pub fn new(registry: MonitorRegistry, default_network: Network) -> Self {
        Self {
            registry,
            default_network,
        }
    }

    /// Apply one client text frame and return the reply
    pub async fn handle_text(&self, text: &str) -> ServerMessage {
        let message: ClientMessage = match serde_json::from_str(text) {
            Ok(message) => message,
            Err(e) => return ServerMessage::error(format!("Invalid message: {}", e)),
        };

        match message {
            ClientMessage::Monitor {
                contract_address,
                network,
            } => {
                let network = match network.as_deref() {
                    Some(name) => match name.parse::<Network>() {
                        Ok(network) => network,
                        Err(e) => return ServerMessage::error(e.to_string()),
                    },
                    None => self.default_network,
                };

                let target = match MonitorTarget::parse(contract_address.as_deref(), network) {
                    Ok(target) => target,
                    Err(e) => return client_error(e),
                };

                match self.registry.replace(target.clone()).await {
                    Ok(status) => ServerMessage::Monitoring {
                        session_id: status.id().to_string(),
                        contract_address: target.address,
                        network: target.network,
                    },
                    Err(e) => client_error(e),
                }
            }
            ClientMessage::StopMonitoring => {
                self.registry.teardown().await;
                ServerMessage::Stopped
            }
        }
    }

    /// Release the connection's monitor
    pub async fn close(&self) {
        self.registry.teardown().await;
    }
}

/// WebSocket /api/monitor
pub async fn monitor_socket(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_monitor_socket(socket, state))
}

async fn handle_monitor_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let (registry, mut events) = state.monitor_registry();
    let connection = MonitorConnection::new(registry, state.default_network);

    info!("Monitor client connected");

    loop {
        tokio::select! {
            Some(event) = events.recv() => {
                if send_message(&mut sender, &ServerMessage::from(event)).await.is_err() {
                    break;
                }
            }
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let reply = connection.handle_text(&text).await;
                        if send_message(&mut sender, &reply).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sender.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        debug!(error = %e, "Monitor socket error");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    connection.close().await;
    info!("Monitor client disconnected");
}

async fn send_message(
    sender: &mut SplitSink<WebSocket, Message>,
    message: &ServerMessage,
) -> Result<(), axum::Error> {
    match serde_json::to_string(message) {
        Ok(text) => sender.send(Message::Text(text)).await,
        Err(e) => {
            warn!(error = %e, "Failed to encode monitor message");
            Ok(())
        }
    }
}

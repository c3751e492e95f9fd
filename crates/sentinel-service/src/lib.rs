//! Sentinel service library
//!
//! HTTP/WebSocket binding for the sentinel pipelines:
//! - `GET /api/health`
//! - `POST /api/analyze`: rule-based and AI contract scanning
//! - `POST /api/deploy`: module submission
//! - `GET /api/monitor`: live transaction monitoring over WebSocket

pub mod api;
pub mod config;
pub mod error;
pub mod server;

pub use api::{create_router, AppState};
pub use config::ServiceConfig;
pub use error::{ApiError, ApiResult, ServiceError, ServiceResult};
pub use server::Server;

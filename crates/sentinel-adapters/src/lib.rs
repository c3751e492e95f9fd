//! Concrete collaborators for the sentinel pipelines.
//!
//! - [`AptosRestClient`]: chain query provider over the full-node REST API
//! - [`ResourceActivityMonitor`]: secondary monitor over account resources
//! - [`OpenAiAnalyzer`]: AI analysis and behavior prediction
//! - [`LocalDeployer`]: deterministic deployment fixture

#![deny(unsafe_code)]

pub mod activity;
pub mod aptos;
pub mod deployer;
mod http;
pub mod openai;

pub use activity::{ResourceActivityMonitor, DEFAULT_ACTIVITY_INTERVAL, RESOURCES_CHANGED};
pub use aptos::{AptosRestClient, NodeEndpoints, DEFAULT_PAGE_LIMIT};
pub use deployer::{LocalDeployer, LOCAL_DEPLOY_STATUS};
pub use http::DEFAULT_REQUEST_TIMEOUT;
pub use openai::{OpenAiAnalyzer, OpenAiConfig, DEFAULT_OPENAI_ENDPOINT, OPENAI_API_KEY_ENV};

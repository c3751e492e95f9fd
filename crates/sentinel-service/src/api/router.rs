//! API Router configuration

use axum::extract::DefaultBodyLimit;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::state::AppState;
use crate::config::ServerConfig;

/// Create the main API router
pub fn create_router(state: AppState, server: &ServerConfig) -> Router {
    let api_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/analyze", post(handlers::analyze_contract))
        .route("/deploy", post(handlers::deploy_contract))
        .route("/monitor", get(handlers::monitor_socket));

    let mut router = Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(server.max_body_size))
        .layer(TraceLayer::new_for_http());

    if server.enable_cors {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    router.with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use sentinel_core::{
        AiAnalysis, AiAnalysisProvider, AiPolicy, ChainQueryProvider, ContractDeployer,
        DeployService, DeploymentReceipt, Network, RawTransaction, ScanConfig, ScanService,
        SentinelError, SentinelResult,
    };
    use sentinel_monitor::MonitorConfig;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    struct NoChain;

    #[async_trait]
    impl ChainQueryProvider for NoChain {
        async fn transactions_since(
            &self,
            _network: Network,
            _address: &str,
            _after_version: u64,
        ) -> SentinelResult<Vec<RawTransaction>> {
            Ok(Vec::new())
        }
    }

    struct EchoDeployer {
        fail: bool,
    }

    #[async_trait]
    impl ContractDeployer for EchoDeployer {
        async fn deploy(&self, _module: &[u8], network: Network) -> SentinelResult<DeploymentReceipt> {
            if self.fail {
                return Err(SentinelError::deployment("sequence number too old"));
            }
            Ok(DeploymentReceipt {
                address: "0xfeed".to_string(),
                tx_hash: "0xbeef".to_string(),
                status: "success".to_string(),
                network,
            })
        }
    }

    struct DownAi;

    #[async_trait]
    impl AiAnalysisProvider for DownAi {
        fn name(&self) -> &'static str {
            "down"
        }

        async fn analyze(&self, _code: &str) -> SentinelResult<AiAnalysis> {
            Err(SentinelError::provider("down", "connection refused"))
        }
    }

    fn app_with(scan: ScanService, deploy_fails: bool) -> Router {
        let state = AppState::new(
            scan,
            DeployService::new(Arc::new(EchoDeployer { fail: deploy_fails })),
            Arc::new(NoChain),
            None,
            MonitorConfig::default(),
        );
        create_router(state, &ServerConfig::default())
    }

    fn app() -> Router {
        app_with(ScanService::rules_only(), false)
    }

    fn post_json(uri: &str, body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    async fn read_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let response = app()
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["message"], "Server is running");
        assert_eq!(body["aiEnabled"], false);
    }

    #[tokio::test]
    async fn analyze_returns_flat_report() {
        let code = "module 0x1::vault {\n    public fun withdraw(s: &signer) {\n        while (true) {}\n    }\n}";
        let response = app()
            .oneshot(post_json("/api/analyze", json!({ "code": code }).to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["riskScore"], 37);
        assert_eq!(body["degraded"], false);
        let vulns = body["vulnerabilities"].as_array().unwrap();
        assert_eq!(vulns[0]["type"], "Access Control");
        assert_eq!(vulns[0]["location"], "Line 2");
        assert_eq!(vulns[1]["type"], "Infinite Loop");
    }

    #[tokio::test]
    async fn analyze_without_code_is_bad_request() {
        let response = app()
            .oneshot(post_json("/api/analyze", "{}".to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = read_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Contract code is required");
    }

    #[tokio::test]
    async fn analyze_with_malformed_body_is_bad_request() {
        let response = app()
            .oneshot(post_json("/api/analyze", "{\"code\":".to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(read_json(response).await["success"], false);
    }

    #[tokio::test]
    async fn required_ai_failure_is_bad_gateway() {
        let scan = ScanService::with_ai(
            Arc::new(DownAi),
            ScanConfig {
                ai_policy: AiPolicy::Required,
                predict_behavior: false,
            },
        );
        let response = app_with(scan, false)
            .oneshot(post_json("/api/analyze", json!({ "code": "public fun f() {}" }).to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(read_json(response).await["success"], false);
    }

    #[tokio::test]
    async fn best_effort_ai_failure_is_degraded() {
        let scan = ScanService::with_ai(
            Arc::new(DownAi),
            ScanConfig {
                ai_policy: AiPolicy::BestEffort,
                predict_behavior: false,
            },
        );
        let response = app_with(scan, false)
            .oneshot(post_json("/api/analyze", json!({ "code": "public fun f() {}" }).to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["degraded"], true);
        assert_eq!(body["riskScore"], 7);
    }

    #[tokio::test]
    async fn deploy_defaults_to_testnet() {
        let response = app()
            .oneshot(post_json("/api/deploy", json!({ "code": "0xa11ce" }).to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["txHash"], "0xbeef");
        assert_eq!(body["network"], "testnet");
    }

    #[tokio::test]
    async fn deploy_parses_network_case_insensitively() {
        let response = app()
            .oneshot(post_json(
                "/api/deploy",
                json!({ "code": "0xa11ce", "network": "DevNet" }).to_string(),
            ))
            .await
            .unwrap();

        assert_eq!(read_json(response).await["network"], "devnet");
    }

    #[tokio::test]
    async fn deploy_rejects_unknown_network() {
        let response = app()
            .oneshot(post_json(
                "/api/deploy",
                json!({ "code": "0xa11ce", "network": "moonnet" }).to_string(),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn deploy_failure_is_server_error() {
        let response = app_with(ScanService::rules_only(), true)
            .oneshot(post_json("/api/deploy", json!({ "code": "0xa11ce" }).to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = read_json(response).await;
        assert!(body["message"]
            .as_str()
            .unwrap()
            .starts_with("Failed to deploy contract"));
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let state = AppState::new(
            ScanService::rules_only(),
            DeployService::new(Arc::new(EchoDeployer { fail: false })),
            Arc::new(NoChain),
            None,
            MonitorConfig::default(),
        );
        let server = ServerConfig {
            max_body_size: 16,
            ..ServerConfig::default()
        };
        let body = json!({ "code": "public fun f() { assert!(true, 1); }" }).to_string();
        let request = Request::builder()
            .method("POST")
            .uri("/api/analyze")
            .header("content-type", "application/json")
            .header("content-length", body.len())
            .body(Body::from(body))
            .unwrap();
        let response = create_router(state, &server).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}

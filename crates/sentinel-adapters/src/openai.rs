//! OpenAI chat-completions analyzer.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use sentinel_core::{
    AiAnalysis, AiAnalysisProvider, BehaviorPrediction, SentinelError, SentinelResult,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, instrument};

use crate::http::{build_http_client, ensure_success};

const PROVIDER: &str = "openai";

/// Environment variable holding the API key.
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

pub const DEFAULT_OPENAI_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

const AUDITOR_PROMPT: &str = "You are an expert Move smart contract security auditor. Analyze the provided contract for vulnerabilities, focusing on security issues specific to Move and the Aptos blockchain. Consider access control, resource management, arithmetic operations, and other common attack vectors.";

const BEHAVIOR_PROMPT: &str = "You are an expert in Move smart contracts on the Aptos blockchain. Describe how the provided contract is likely to behave once deployed: who can call which entry functions, how resources and funds move, and which state changes users should expect. Answer in a short paragraph.";

/// Model parameters for the analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenAiConfig {
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub request_timeout: Duration,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_OPENAI_ENDPOINT.to_string(),
            model: "gpt-4".to_string(),
            temperature: 0.7,
            max_tokens: 2000,
            request_timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

/// AI provider backed by an OpenAI-compatible chat-completions endpoint.
#[derive(Clone)]
pub struct OpenAiAnalyzer {
    client: Client,
    api_key: String,
    config: OpenAiConfig,
}

impl std::fmt::Debug for OpenAiAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiAnalyzer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl OpenAiAnalyzer {
    pub fn new(api_key: impl Into<String>, config: OpenAiConfig) -> SentinelResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(SentinelError::provider(PROVIDER, "API key is empty"));
        }

        Ok(Self {
            client: build_http_client(config.request_timeout)?,
            api_key,
            config,
        })
    }

    /// Build from `OPENAI_API_KEY`. Returns `Ok(None)` when the variable is unset or blank.
    pub fn from_env(config: OpenAiConfig) -> SentinelResult<Option<Self>> {
        match std::env::var(OPENAI_API_KEY_ENV) {
            Ok(key) if !key.trim().is_empty() => Self::new(key, config).map(Some),
            _ => Ok(None),
        }
    }

    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    async fn complete(&self, system: &str, user: String) -> SentinelResult<String> {
        let payload = json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens,
        });

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| SentinelError::provider(PROVIDER, format!("request failed: {}", e)))?;
        let response = ensure_success(PROVIDER, response).await?;

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| SentinelError::provider(PROVIDER, format!("invalid response: {}", e)))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| SentinelError::provider(PROVIDER, "response did not include content"))
    }
}

#[async_trait]
impl AiAnalysisProvider for OpenAiAnalyzer {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    #[instrument(skip(self, code), fields(model = %self.config.model))]
    async fn analyze(&self, code: &str) -> SentinelResult<AiAnalysis> {
        let text = self
            .complete(
                AUDITOR_PROMPT,
                format!(
                    "Analyze this Move smart contract for security vulnerabilities:\n\n{}",
                    code
                ),
            )
            .await?;

        debug!(chars = text.len(), "AI analysis received");
        Ok(AiAnalysis::from_text(text))
    }

    #[instrument(skip(self, code), fields(model = %self.config.model))]
    async fn predict_behavior(&self, code: &str) -> SentinelResult<Option<BehaviorPrediction>> {
        let text = self
            .complete(
                BEHAVIOR_PROMPT,
                format!("Predict the runtime behavior of this Move smart contract:\n\n{}", code),
            )
            .await?;

        let summary = text.trim();
        if summary.is_empty() {
            return Ok(None);
        }
        Ok(Some(BehaviorPrediction {
            summary: summary.to_string(),
            confidence: None,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn analyzer(server: &MockServer) -> OpenAiAnalyzer {
        OpenAiAnalyzer::new(
            "test-key",
            OpenAiConfig {
                endpoint: format!("{}/v1/chat/completions", server.uri()),
                ..OpenAiConfig::default()
            },
        )
        .unwrap()
    }

    fn completion(content: &str) -> serde_json::Value {
        json!({
            "id": "chatcmpl-1",
            "choices": [{ "index": 0, "message": { "role": "assistant", "content": content }, "finish_reason": "stop" }]
        })
    }

    #[tokio::test]
    async fn analyze_sends_auditor_prompt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(json!({ "model": "gpt-4", "max_tokens": 2000 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(
                "High risk issue: unchecked withdraw.\n\nOverall the module is small.",
            )))
            .expect(1)
            .mount(&server)
            .await;

        let analysis = analyzer(&server).analyze("module 0x1::m {}").await.unwrap();
        assert!(analysis.text.starts_with("High risk issue"));
        assert!(analysis.recommendations.is_none());
    }

    #[tokio::test]
    async fn http_failure_is_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let err = analyzer(&server).analyze("module 0x1::m {}").await.unwrap_err();
        assert!(matches!(err, SentinelError::Provider { ref provider, .. } if provider == "openai"));
    }

    #[tokio::test]
    async fn empty_choices_are_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .mount(&server)
            .await;

        assert!(analyzer(&server).analyze("module 0x1::m {}").await.is_err());
    }

    #[tokio::test]
    async fn prediction_is_trimmed_summary() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(completion("  Anyone can mint.  ")),
            )
            .mount(&server)
            .await;

        let prediction = analyzer(&server)
            .predict_behavior("module 0x1::m {}")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(prediction.summary, "Anyone can mint.");
    }

    #[test]
    fn blank_key_is_rejected() {
        assert!(OpenAiAnalyzer::new("  ", OpenAiConfig::default()).is_err());
    }
}

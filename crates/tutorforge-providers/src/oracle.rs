//! HTTP-based `Oracle` implementation (C9): prompt-in/text-out against a
//! configurable OpenAI-compatible completion endpoint, generalized from a
//! single-vendor chat API client.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use tutorforge_core::traits::{Oracle, OracleRequest, OracleResponse};

use crate::error::ProviderError;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// The fixed placeholder API key value that disables the oracle without
/// treating its absence as a pipeline fault (§4.9/§9C).
pub const PLACEHOLDER_KEY: &str = "dummy";

/// The message returned in place of a real hint when the oracle is
/// disabled or exhausts its retries; never surfaced as an error.
pub const UNAVAILABLE_HINT: &str =
    "Hint generation is currently unavailable. Review the evidence above and try again.";

pub struct HttpOracle {
    api_key: String,
    base_url: String,
    model: String,
    max_retries: u32,
    retry_delay: Duration,
    client: reqwest::Client,
}

impl HttpOracle {
    pub fn new(api_key: impl Into<String>, base_url: Option<String>, model: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("failed to build HTTP client");

        Self {
            api_key: api_key.into(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_retries: 3,
            retry_delay: Duration::from_secs(2),
            client,
        }
    }

    pub fn with_retries(mut self, max_retries: u32, retry_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_delay = retry_delay;
        self
    }

    fn disabled(&self) -> bool {
        self.api_key.is_empty() || self.api_key == PLACEHOLDER_KEY
    }

    async fn call_once(&self, request: &OracleRequest) -> Result<OracleResponse, ProviderError> {
        let body = ChatRequest {
            model: self.model.clone(),
            max_tokens: request.max_tokens,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: request.prompt.clone(),
            }],
        };

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(DEFAULT_TIMEOUT_SECS)
                } else {
                    ProviderError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(2)
                * 1000;
            return Err(ProviderError::RateLimited {
                retry_after_ms: retry_after,
            });
        }
        if status == 401 {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::AuthenticationFailed(body));
        }
        if status == 404 {
            return Err(ProviderError::ModelNotFound(self.model.clone()));
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError { status, message: body });
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| ProviderError::ApiError {
            status: 0,
            message: format!("failed to parse oracle response: {e}"),
        })?;
        let content = parsed.content.into_iter().next().map(|c| c.text).unwrap_or_default();
        Ok(OracleResponse { content })
    }
}

#[async_trait]
impl Oracle for HttpOracle {
    /// Up to `max_retries` attempts; a rate-limit reply waits `attempt × 2`
    /// seconds before retrying (§4.9). A placeholder or missing key short-
    /// circuits to a fixed response without ever touching the network.
    #[instrument(skip(self, request))]
    async fn complete(&self, request: &OracleRequest) -> anyhow::Result<OracleResponse> {
        if self.disabled() {
            return Ok(OracleResponse {
                content: UNAVAILABLE_HINT.to_string(),
            });
        }

        let start = Instant::now();
        let mut last_err = None;
        for attempt in 1..=self.max_retries {
            match self.call_once(request).await {
                Ok(response) => return Ok(response),
                Err(ProviderError::RateLimited { .. }) if attempt < self.max_retries => {
                    warn!(attempt, "oracle rate-limited, retrying with backoff");
                    tokio::time::sleep(self.retry_delay * attempt).await;
                    last_err = Some(ProviderError::RateLimited { retry_after_ms: 0 });
                }
                Err(err) => {
                    last_err = Some(err);
                    break;
                }
            }
        }
        let _elapsed = start.elapsed();

        Ok(OracleResponse {
            content: last_err
                .map(|e| format!("{UNAVAILABLE_HINT} ({e})"))
                .unwrap_or_else(|| UNAVAILABLE_HINT.to_string()),
        })
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    content: Vec<ChatContent>,
}

#[derive(Deserialize)]
struct ChatContent {
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn placeholder_key_short_circuits_without_network_call() {
        let oracle = HttpOracle::new(PLACEHOLDER_KEY, None, None);
        let response = oracle
            .complete(&OracleRequest {
                prompt: "hint please".to_string(),
                max_tokens: 100,
            })
            .await
            .unwrap();
        assert_eq!(response.content, UNAVAILABLE_HINT);
    }

    #[tokio::test]
    async fn successful_call_returns_model_text() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "content": [{"type": "text", "text": "Check your loop bound."}]
        });
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let oracle = HttpOracle::new("test-key", Some(server.uri()), None);
        let response = oracle
            .complete(&OracleRequest {
                prompt: "hint please".to_string(),
                max_tokens: 100,
            })
            .await
            .unwrap();
        assert_eq!(response.content, "Check your loop bound.");
    }

    #[tokio::test]
    async fn rate_limit_retries_then_falls_back_to_unavailable_hint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "0"))
            .mount(&server)
            .await;

        let oracle = HttpOracle::new("test-key", Some(server.uri()), None)
            .with_retries(2, Duration::from_millis(1));
        let response = oracle
            .complete(&OracleRequest {
                prompt: "hint please".to_string(),
                max_tokens: 100,
            })
            .await
            .unwrap();
        assert!(response.content.starts_with(UNAVAILABLE_HINT));
    }
}

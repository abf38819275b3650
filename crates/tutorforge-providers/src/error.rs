//! Oracle transport error types, generalized from a single-vendor client to
//! whatever OpenAI-compatible completion endpoint `oracle_base_url` points
//! at.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("model not found: {0}")]
    ModelNotFound(String),

    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("network error: {0}")]
    NetworkError(String),
}

impl ProviderError {
    /// Whether this error is worth retrying with backoff, as opposed to a
    /// permanent client-side problem (bad key, unknown model).
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProviderError::RateLimited { .. } | ProviderError::Timeout(_) | ProviderError::NetworkError(_)
        )
    }
}

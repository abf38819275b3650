//! Core error types.
//!
//! Mirrors the provider crate's `ProviderError`: a typed enum so transport
//! bindings can map variants onto status codes without string matching.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("problem not found: {0}")]
    UnknownProblem(String),

    #[error("unknown language: {0}")]
    UnknownLanguage(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    /// `true` for errors a transport binding should map onto a 404-class
    /// response rather than a 500-class one.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::UnknownProblem(_))
    }
}

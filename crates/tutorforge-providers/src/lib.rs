//! tutorforge-providers — the Oracle client and layered configuration.
//!
//! Implements the `Oracle` trait against a configurable OpenAI-compatible
//! completion endpoint, plus a deterministic mock for tests.

pub mod config;
pub mod error;
pub mod mock;
pub mod oracle;

pub use config::{load_config, TutorforgeConfig};
pub use error::ProviderError;
pub use oracle::HttpOracle;

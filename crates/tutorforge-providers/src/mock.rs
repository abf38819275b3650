//! Deterministic `Oracle` stub for testing the hint orchestrator without a
//! real model call.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use tutorforge_core::traits::{Oracle, OracleRequest, OracleResponse};

/// Returns configurable responses based on prompt content matching, mirroring
/// the substring-routing mock used elsewhere in this stack.
pub struct MockOracle {
    responses: HashMap<String, String>,
    default_response: String,
    call_count: AtomicU32,
    last_request: Mutex<Option<OracleRequest>>,
}

impl MockOracle {
    pub fn new(responses: HashMap<String, String>) -> Self {
        Self {
            responses,
            default_response: "Consider what happens at the boundary of your loop.".to_string(),
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn with_fixed_response(response: &str) -> Self {
        Self {
            responses: HashMap::new(),
            default_response: response.to_string(),
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    pub fn last_request(&self) -> Option<OracleRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl Oracle for MockOracle {
    async fn complete(&self, request: &OracleRequest) -> anyhow::Result<OracleResponse> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self.last_request.lock().unwrap() = Some(request.clone());

        let content = self
            .responses
            .iter()
            .find(|(key, _)| request.prompt.contains(key.as_str()))
            .map(|(_, v)| v.clone())
            .unwrap_or_else(|| self.default_response.clone());

        Ok(OracleResponse { content })
    }
}

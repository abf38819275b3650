//! Capability traits that keep the investigation pipeline and the hint
//! orchestrator generic over the container runtime and the LLM oracle
//! ("Oracle as interface" design note, §9).

use async_trait::async_trait;

/// One-shot execution of a compile/run command chain inside an isolated
/// container (C1's contract).
#[async_trait]
pub trait ContainerRunner: Send + Sync {
    /// Runs `commands` in sequence inside a fresh container rooted at
    /// `work_dir`, feeding `stdin` to the final command's stdin handle.
    /// Returns the raw exit code and captured stdout/stderr; timeout and
    /// signal-death canonicalization (§4.1) are the implementor's job.
    async fn run(
        &self,
        commands: &[Vec<String>],
        stdin: &[u8],
        work_dir: &std::path::Path,
    ) -> anyhow::Result<ExecutionResult>;
}

#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
}

/// Per-language materialization, compilation, and pre-classification
/// (C2's contract).
#[async_trait]
pub trait LanguageDriver: Send + Sync {
    fn language(&self) -> crate::model::Language;

    /// Writes `source` into `work_dir` under the language's canonical
    /// filename, compiles it if compilation applies, and runs it against
    /// `stdin` via `runner`.
    async fn run(
        &self,
        runner: &dyn ContainerRunner,
        work_dir: &std::path::Path,
        source: &str,
        stdin: &str,
    ) -> anyhow::Result<crate::model::DriverResult>;
}

/// A single prompt-in/text-out request to the LLM oracle.
#[derive(Debug, Clone)]
pub struct OracleRequest {
    pub prompt: String,
    pub max_tokens: u32,
}

#[derive(Debug, Clone)]
pub struct OracleResponse {
    pub content: String,
}

/// Abstracts the LLM call behind a capability so the hint orchestrator can
/// be tested against deterministic stubs (§9 design note).
#[async_trait]
pub trait Oracle: Send + Sync {
    async fn complete(&self, request: &OracleRequest) -> anyhow::Result<OracleResponse>;
}


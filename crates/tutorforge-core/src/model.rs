//! Core data model types for tutorforge.
//!
//! These are the fundamental types shared by every component: the problem
//! catalog, the outcome taxonomy, evidence, diagnostics, knowledge entries,
//! and per-(user, problem) session state.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A single sample or hidden input/output pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Case {
    pub input: String,
    pub output: String,
}

/// A graded problem. Hidden cases are loaded but never serialized back out
/// through a listing response — see `Problem::sanitized`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub sample_cases: Vec<Case>,
    #[serde(default)]
    pub hidden_cases: Vec<Case>,
    #[serde(default = "default_difficulty")]
    pub difficulty: String,
}

fn default_difficulty() -> String {
    "Unknown".to_string()
}

/// The listing shape returned to a student: no hidden cases, only their count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemSummary {
    pub title: String,
    pub description: String,
    pub sample_cases: Vec<Case>,
    pub difficulty: String,
    pub case_count: usize,
}

impl Problem {
    pub fn sanitized(&self) -> ProblemSummary {
        ProblemSummary {
            title: self.title.clone(),
            description: self.description.clone(),
            sample_cases: self.sample_cases.clone(),
            difficulty: self.difficulty.clone(),
            case_count: self.hidden_cases.len(),
        }
    }
}

/// Supported submission languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    C,
    Cpp,
    Python,
    Java,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::C => write!(f, "c"),
            Language::Cpp => write!(f, "cpp"),
            Language::Python => write!(f, "python"),
            Language::Java => write!(f, "java"),
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "c" => Ok(Language::C),
            "cpp" | "c++" => Ok(Language::Cpp),
            "python" | "py" => Ok(Language::Python),
            "java" => Ok(Language::Java),
            other => Err(format!("unknown language: {other}")),
        }
    }
}

/// A submission is ephemeral: it lives only for the duration of one investigation.
#[derive(Debug, Clone)]
pub struct Submission {
    pub user_id: String,
    pub problem_id: String,
    pub language: Language,
    pub source: String,
}

/// The closed outcome enumeration. Produced by the investigation pipeline and
/// possibly rewritten by the priority analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TestOutcome {
    #[serde(rename = "SUCCESS")]
    Success,
    #[serde(rename = "SYNTAX_ERROR")]
    SyntaxError,
    #[serde(rename = "COMPILATION_ERROR")]
    CompilationError,
    #[serde(rename = "RUNTIME_ERROR")]
    RuntimeError,
    #[serde(rename = "SEGFAULT_ERROR")]
    SegfaultError,
    #[serde(rename = "TYPE_ERROR")]
    TypeError,
    #[serde(rename = "TIME_LIMIT_EXCEEDED")]
    TimeLimitExceeded,
    #[serde(rename = "MEMORY_LIMIT_EXCEEDED")]
    MemoryLimitExceeded,
    #[serde(rename = "INPUT_OUTPUT_ERROR")]
    InputOutputError,
    #[serde(rename = "LOGIC_ERROR")]
    LogicError,
    #[serde(rename = "SYSTEM_ERROR")]
    SystemError,
}

impl TestOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestOutcome::Success => "SUCCESS",
            TestOutcome::SyntaxError => "SYNTAX_ERROR",
            TestOutcome::CompilationError => "COMPILATION_ERROR",
            TestOutcome::RuntimeError => "RUNTIME_ERROR",
            TestOutcome::SegfaultError => "SEGFAULT_ERROR",
            TestOutcome::TypeError => "TYPE_ERROR",
            TestOutcome::TimeLimitExceeded => "TIME_LIMIT_EXCEEDED",
            TestOutcome::MemoryLimitExceeded => "MEMORY_LIMIT_EXCEEDED",
            TestOutcome::InputOutputError => "INPUT_OUTPUT_ERROR",
            TestOutcome::LogicError => "LOGIC_ERROR",
            TestOutcome::SystemError => "SYSTEM_ERROR",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TestOutcome::Success)
    }
}

impl fmt::Display for TestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TestOutcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SUCCESS" => Ok(TestOutcome::Success),
            "SYNTAX_ERROR" => Ok(TestOutcome::SyntaxError),
            "COMPILATION_ERROR" => Ok(TestOutcome::CompilationError),
            "RUNTIME_ERROR" => Ok(TestOutcome::RuntimeError),
            "SEGFAULT_ERROR" => Ok(TestOutcome::SegfaultError),
            "TYPE_ERROR" => Ok(TestOutcome::TypeError),
            "TIME_LIMIT_EXCEEDED" => Ok(TestOutcome::TimeLimitExceeded),
            "MEMORY_LIMIT_EXCEEDED" => Ok(TestOutcome::MemoryLimitExceeded),
            "INPUT_OUTPUT_ERROR" => Ok(TestOutcome::InputOutputError),
            "LOGIC_ERROR" => Ok(TestOutcome::LogicError),
            "SYSTEM_ERROR" => Ok(TestOutcome::SystemError),
            other => Err(format!("unknown outcome: {other}")),
        }
    }
}

/// Evidence is a sum type rather than the original's untyped payload (see
/// design notes): a plain message for compile/runtime/resource outcomes, or
/// the three-way diff record for a logic mismatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Evidence {
    Text { message: String },
    Diff {
        expected: String,
        actual: String,
        diff: String,
    },
}

impl Evidence {
    pub fn text(message: impl Into<String>) -> Self {
        Evidence::Text {
            message: message.into(),
        }
    }

    /// The string form used when embedding evidence in a hint prompt or a
    /// log line; the diff variant surfaces only its prose summary here, the
    /// full diff is appended to the logs separately once unlocked.
    pub fn as_display(&self) -> String {
        match self {
            Evidence::Text { message } => message.clone(),
            Evidence::Diff { expected, actual, .. } => {
                format!("Expected: {expected:?}, got: {actual:?}")
            }
        }
    }

    pub fn diff_body(&self) -> Option<&str> {
        match self {
            Evidence::Diff { diff, .. } => Some(diff),
            Evidence::Text { .. } => None,
        }
    }
}

/// The tagged variant replacing the original's duck-typed driver result.
#[derive(Debug, Clone)]
pub enum DriverResult {
    Raw {
        exit_code: i32,
        stdout: String,
        stderr: String,
    },
    PreClassified {
        status: TestOutcome,
        stderr: String,
    },
}

/// `{line, column, message}` extracted from raw toolchain diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticRecord {
    pub line: String,
    pub column: String,
    pub message: String,
    pub raw: String,
}

impl DiagnosticRecord {
    pub fn unknown(raw: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            line: "?".to_string(),
            column: "0".to_string(),
            message: message.into(),
            raw: raw.into(),
        }
    }
}

/// A merged error-class record used by the priority analyzer and the hint
/// orchestrator's prompt assembly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    #[serde(rename = "type")]
    pub error_type: String,
    #[serde(default = "default_priority")]
    pub priority: u8,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default = "default_concept")]
    pub concept: String,
    #[serde(default = "default_hint_template")]
    pub hint_template: String,
    #[serde(default = "default_citation")]
    pub citation: String,
}

fn default_priority() -> u8 {
    3
}

fn default_concept() -> String {
    "Unknown Error".to_string()
}

fn default_hint_template() -> String {
    "Explain the error clearly.".to_string()
}

fn default_citation() -> String {
    "General Concept".to_string()
}

/// Per-(user, problem) state. Invariants A/B/C in the data model section bind
/// how `attempt` and `draft_code` may change between mutations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub last_error: Option<TestOutcome>,
    #[serde(default)]
    pub attempt: u32,
    #[serde(default)]
    pub draft_code: Option<String>,
}

impl Session {
    pub fn session_key(user_id: &str, problem_id: &str) -> String {
        format!("{user_id}_{problem_id}")
    }
}

//! The Investigation Pipeline (C4): drives the hidden test cases through a
//! language driver and maps each result through the outcome decision
//! ladder, short-circuiting on the first non-success.

use tutorforge_core::comparator;
use tutorforge_core::model::{Case, DriverResult, Evidence, TestOutcome};
use tutorforge_core::traits::{ContainerRunner, LanguageDriver};

use crate::container::{is_segfault, EXIT_OOM_KILLED, EXIT_TIMEOUT};

/// The pipeline's result: an ordered log of human-readable progress lines
/// (consumed by the priority analyzer and surfaced to the student), the
/// final outcome, and its evidence.
pub struct InvestigationResult {
    pub logs: Vec<String>,
    pub status: TestOutcome,
    pub evidence: Evidence,
}

/// Runs `source` against `cases` in declared order using `driver` and
/// `runner`, rooting each case's workspace under `base_dir`.
pub async fn investigate(
    runner: &dyn ContainerRunner,
    driver: &dyn LanguageDriver,
    base_dir: &std::path::Path,
    source: &str,
    cases: &[Case],
) -> anyhow::Result<InvestigationResult> {
    let mut logs = Vec::new();

    for (index, case) in cases.iter().enumerate() {
        logs.push(format!("Running hidden case {}/{}", index + 1, cases.len()));

        let workspace = crate::sandbox::Workspace::new(base_dir)?;
        let result = driver
            .run(runner, workspace.path(), source, &case.input)
            .await?;

        match classify(result, case) {
            CaseOutcome::Pass => continue,
            CaseOutcome::Fail { status, evidence, log_line } => {
                logs.push(log_line);
                return Ok(InvestigationResult { logs, status, evidence });
            }
        }
    }

    logs.push("All hidden cases passed".to_string());
    Ok(InvestigationResult {
        logs,
        status: TestOutcome::Success,
        evidence: Evidence::text("All hidden cases passed."),
    })
}

enum CaseOutcome {
    Pass,
    Fail {
        status: TestOutcome,
        evidence: Evidence,
        log_line: String,
    },
}

/// The decision ladder from §4.4, applied to one case's driver result.
fn classify(result: DriverResult, case: &Case) -> CaseOutcome {
    match result {
        DriverResult::PreClassified { status, stderr } => CaseOutcome::Fail {
            status,
            evidence: Evidence::text(stderr.clone()),
            log_line: format!("Pre-classified as {status}: {stderr}"),
        },
        DriverResult::Raw { exit_code, stdout, stderr } => {
            if exit_code == EXIT_TIMEOUT {
                return CaseOutcome::Fail {
                    status: TestOutcome::TimeLimitExceeded,
                    evidence: Evidence::text("Time Limit Exceeded."),
                    log_line: "Time limit exceeded".to_string(),
                };
            }
            if exit_code == EXIT_OOM_KILLED {
                return CaseOutcome::Fail {
                    status: TestOutcome::MemoryLimitExceeded,
                    evidence: Evidence::text("Memory Limit Exceeded."),
                    log_line: "Memory limit exceeded".to_string(),
                };
            }
            if is_segfault(exit_code) {
                return CaseOutcome::Fail {
                    status: TestOutcome::SegfaultError,
                    evidence: Evidence::text("Memory Access Violation."),
                    log_line: "Segmentation fault".to_string(),
                };
            }
            if exit_code != 0 {
                return CaseOutcome::Fail {
                    status: TestOutcome::RuntimeError,
                    evidence: Evidence::text(stderr.clone()),
                    log_line: format!("Runtime error (exit {exit_code}): {stderr}"),
                };
            }
            if stdout.trim().is_empty() && !case.output.trim().is_empty() {
                return CaseOutcome::Fail {
                    status: TestOutcome::InputOutputError,
                    evidence: Evidence::text("Program produced no output."),
                    log_line: "No output produced".to_string(),
                };
            }
            if !comparator::outputs_match(&case.output, &stdout) {
                let diff = comparator::compare(&case.output, &stdout).render();
                return CaseOutcome::Fail {
                    status: TestOutcome::LogicError,
                    evidence: Evidence::Diff {
                        expected: case.output.clone(),
                        actual: stdout.clone(),
                        diff,
                    },
                    log_line: "Output did not match expected".to_string(),
                };
            }
            CaseOutcome::Pass
        }
    }
}

/// `SYSTEM_ERROR` shortcut for preconditions the pipeline refuses to run
/// against: an unrecognized language or a problem that doesn't exist.
pub fn system_error(message: impl Into<String>) -> InvestigationResult {
    let message = message.into();
    InvestigationResult {
        logs: vec![message.clone()],
        status: TestOutcome::SystemError,
        evidence: Evidence::text(message),
    }
}

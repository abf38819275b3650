//! End-to-end pipeline tests wiring the investigation pipeline, priority
//! analyzer, and hint orchestrator together through a fake container runner
//! — the real `docker` binary is not available in this test environment, but
//! the capability traits (`ContainerRunner`, `Oracle`) let the whole pipeline
//! be exercised against deterministic stand-ins instead.

use std::path::Path;

use async_trait::async_trait;

use tutorforge_core::analyzer::{self, AnalyzerConfig};
use tutorforge_core::hint::{self, HintContext, SessionTransition};
use tutorforge_core::knowledge::KnowledgeBase;
use tutorforge_core::model::{Case, Language, Session, TestOutcome};
use tutorforge_core::traits::{ContainerRunner, ExecutionResult};
use tutorforge_providers::mock::MockOracle;
use tutorforge_runner::drivers;
use tutorforge_runner::investigation::investigate;

/// Canned runner: ignores the compile/run commands entirely and returns a
/// fixed result, standing in for a real Docker-backed `ContainerRunner`.
struct FakeRunner {
    exit_code: i32,
    stdout: String,
    stderr: String,
}

#[async_trait]
impl ContainerRunner for FakeRunner {
    async fn run(&self, _commands: &[Vec<String>], _stdin: &[u8], _work_dir: &Path) -> anyhow::Result<ExecutionResult> {
        Ok(ExecutionResult {
            exit_code: self.exit_code,
            stdout: self.stdout.clone(),
            stderr: self.stderr.clone(),
            timed_out: false,
        })
    }
}

fn one_case(expected: &str) -> Vec<Case> {
    vec![Case {
        input: String::new(),
        output: expected.to_string(),
    }]
}

#[tokio::test]
async fn segfault_yields_memory_access_violation() {
    let runner = FakeRunner {
        exit_code: 139,
        stdout: String::new(),
        stderr: String::new(),
    };
    let driver = drivers::driver_for(Language::C);
    let base_dir = tempfile::tempdir().unwrap();

    let result = investigate(&runner, driver.as_ref(), base_dir.path(), "int main(){int*p=0;*p=1;}", &one_case("42"))
        .await
        .unwrap();

    assert_eq!(result.status, TestOutcome::SegfaultError);
    assert_eq!(result.evidence.as_display(), "Memory Access Violation.");
}

#[tokio::test]
async fn logic_error_is_upgraded_by_priority_analyzer() {
    let runner = FakeRunner {
        exit_code: 0,
        stdout: "0".to_string(),
        stderr: String::new(),
    };
    let driver = drivers::driver_for(Language::Python);
    let base_dir = tempfile::tempdir().unwrap();

    let investigation = investigate(&runner, driver.as_ref(), base_dir.path(), "print(0)", &one_case("42"))
        .await
        .unwrap();
    assert_eq!(investigation.status, TestOutcome::LogicError);

    let knowledge_dir = tempfile::tempdir().unwrap();
    std::fs::write(
        knowledge_dir.path().join("error_dictionary.json"),
        serde_json::json!({
            "priority_1": [{
                "type": "RUNTIME_ERROR",
                "priority": 1,
                "pattern": "Output did not match",
                "concept": "Output formatting",
                "hint_template": "Check how you are formatting the printed output.",
                "citation": "Chapter 4: Output"
            }]
        })
        .to_string(),
    )
    .unwrap();
    let knowledge = KnowledgeBase::load_dir(knowledge_dir.path()).unwrap();

    let logs = investigation.logs.join("\n");
    let analysis = analyzer::apply_override(
        investigation.status,
        investigation.evidence,
        &logs,
        &knowledge,
        AnalyzerConfig::default(),
    );

    assert_eq!(analysis.outcome, TestOutcome::RuntimeError);
    assert_eq!(analysis.evidence.as_display(), "Check how you are formatting the printed output.");
    assert!(analysis.override_log.unwrap().contains("RUNTIME_ERROR"));
}

#[tokio::test]
async fn third_consecutive_logic_error_unlocks_patch() {
    let runner = FakeRunner {
        exit_code: 0,
        stdout: "41".to_string(),
        stderr: String::new(),
    };
    let driver = drivers::driver_for(Language::Python);
    let base_dir = tempfile::tempdir().unwrap();
    let knowledge = KnowledgeBase::default();
    let source = "print(int(input()) - 1)";

    let mut session = Session {
        attempt: 2,
        last_error: Some(TestOutcome::LogicError),
        draft_code: None,
    };

    let investigation = investigate(&runner, driver.as_ref(), base_dir.path(), source, &one_case("42"))
        .await
        .unwrap();
    let logs = investigation.logs.join("\n");
    let analysis = analyzer::apply_override(
        investigation.status,
        investigation.evidence,
        &logs,
        &knowledge,
        AnalyzerConfig::default(),
    );
    assert_eq!(analysis.outcome, TestOutcome::LogicError);

    let transition = hint::update_session(&mut session, analysis.outcome);
    assert!(matches!(transition, SessionTransition::Persisted { attempt: 3 }));

    let oracle = MockOracle::with_fixed_response(
        "You are subtracting one too many.\n```\nprint(int(input()))\n```",
    );
    let entry = knowledge.lookup_or_default(analysis.outcome.as_str());
    let ctx = HintContext {
        outcome: analysis.outcome,
        evidence: &analysis.evidence,
        knowledge: &entry,
        attempt: session.attempt,
        source,
    };
    let response = hint::generate_hint(&oracle, &ctx).await.unwrap();

    assert!(response.diff_unlocked);
    assert!(response.patch.is_some());
    assert!(response.message.contains("Source Patch Unlocked"));
}

#[tokio::test]
async fn success_case_short_circuits_with_no_hint_needed() {
    let runner = FakeRunner {
        exit_code: 0,
        stdout: "42".to_string(),
        stderr: String::new(),
    };
    let driver = drivers::driver_for(Language::Python);
    let base_dir = tempfile::tempdir().unwrap();

    let investigation = investigate(&runner, driver.as_ref(), base_dir.path(), "print(42)", &one_case("42"))
        .await
        .unwrap();

    assert_eq!(investigation.status, TestOutcome::Success);
    assert!(investigation.status.is_success());

    let mut session = Session {
        attempt: 2,
        last_error: Some(TestOutcome::LogicError),
        draft_code: None,
    };
    let transition = hint::update_session(&mut session, investigation.status);
    assert!(matches!(transition, SessionTransition::Solved));
    assert_eq!(session.attempt, 0);
    assert_eq!(session.last_error, Some(TestOutcome::Success));
}

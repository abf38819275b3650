//! The `tutorforge submit` command: runs one full investigation end to end
//! and prints the `{status, agent_logs, system_messages, hint, citation,
//! patch}` bundle as JSON (§6, §9C).

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::instrument;

use tutorforge_core::analyzer::{self, AnalyzerConfig};
use tutorforge_core::diagnostics;
use tutorforge_core::hint::{self, HintContext};
use tutorforge_core::model::{Evidence, Language, Session, TestOutcome};

use crate::context::AppContext;

#[derive(Serialize)]
struct SubmitResponse {
    status: String,
    agent_logs: Vec<String>,
    system_messages: Vec<String>,
    hint: Option<String>,
    citation: String,
    patch: Option<String>,
}

#[allow(clippy::too_many_arguments)]
#[instrument(skip(source), fields(user_id = %user_id, problem_id = %problem_id, language = %language))]
pub async fn execute(
    user_id: String,
    problem_id: String,
    language: Language,
    file: PathBuf,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let ctx = AppContext::load(config_path.as_deref())?;
    let source = std::fs::read_to_string(&file)
        .with_context(|| format!("failed to read source file: {}", file.display()))?;

    let problem = ctx
        .catalog
        .get(&problem_id)
        .with_context(|| format!("problem not found: {problem_id}"))?;

    let driver = tutorforge_runner::drivers::driver_for(language);
    let base_dir = ctx.workspace_root();

    let investigation = tutorforge_runner::investigation::investigate(
        ctx.runner.as_ref(),
        driver.as_ref(),
        &base_dir,
        &source,
        &problem.hidden_cases,
    )
    .await?;

    let logs = investigation.logs.join("\n");
    let analysis = analyzer::apply_override(
        investigation.status,
        investigation.evidence,
        &logs,
        &ctx.knowledge,
        AnalyzerConfig {
            allow_runtime_override: ctx.config.allow_runtime_override,
        },
    );

    let mut agent_logs = investigation.logs;
    if let Some(override_log) = &analysis.override_log {
        agent_logs.push(override_log.clone());
    }

    let session_key = Session::session_key(&user_id, &problem_id);
    let mut captured_transition = None;
    let session_after = ctx
        .sessions
        .mutate(&session_key, |session| {
            captured_transition = Some(hint::update_session(session, analysis.outcome));
        })
        .await?;
    let transition = captured_transition.expect("mutate always invokes its closure");
    let system_message = transition.status_line(analysis.outcome);

    let knowledge_entry = ctx.knowledge.lookup_or_default(analysis.outcome.as_str());

    let (hint_message, patch) = if analysis.outcome.is_success() {
        (None, None)
    } else {
        let hint_evidence = normalize_evidence_for_hint(analysis.outcome, &analysis.evidence, language);
        let hint_ctx = HintContext {
            outcome: analysis.outcome,
            evidence: &hint_evidence,
            knowledge: &knowledge_entry,
            attempt: session_after.attempt,
            source: &source,
        };
        let response = hint::generate_hint(ctx.oracle.as_ref(), &hint_ctx).await?;
        (Some(response.message), response.patch)
    };

    let response = SubmitResponse {
        status: analysis.outcome.to_string(),
        agent_logs,
        system_messages: vec![system_message],
        hint: hint_message,
        citation: knowledge_entry.citation.clone(),
        patch,
    };

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

/// Normalizes raw compiler/runtime stderr into `"Line N: message"` via the
/// diagnostic parser before it is embedded in the hint prompt (§7); resource-
/// exhaustion and logic evidence already carry their final wording and pass
/// through untouched.
fn normalize_evidence_for_hint(outcome: TestOutcome, evidence: &Evidence, language: Language) -> Evidence {
    let needs_normalization = matches!(
        outcome,
        TestOutcome::CompilationError | TestOutcome::RuntimeError | TestOutcome::SyntaxError | TestOutcome::TypeError
    );
    if !needs_normalization {
        return evidence.clone();
    }
    let Evidence::Text { message } = evidence else {
        return evidence.clone();
    };
    let diag = diagnostics::get_first_error(message, language);
    Evidence::text(format!("Line {}: {}", diag.line, diag.message))
}

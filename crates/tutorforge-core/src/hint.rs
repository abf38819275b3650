//! The hint orchestrator (C8): turns an investigation outcome plus the
//! student's attempt history into a session update and an LLM-authored
//! hint, gated by a three-level disclosure ladder so early attempts get
//! Socratic nudges and only persistent struggles unlock the raw diff and a
//! suggested patch.

use regex::Regex;

use crate::model::{Evidence, KnowledgeEntry, Session, TestOutcome};
use crate::traits::{Oracle, OracleRequest};

/// How much the hint is allowed to reveal, driven by `Session::attempt`
/// *after* the session update for this submission has already been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisclosureLevel {
    /// Attempt 1: a Socratic nudge, no mention of the specific construct.
    Vague,
    /// Attempt 2: names the concept and knowledge-base citation.
    Specific,
    /// Attempt 3+: direct explanation, diff unlocked, patch offered.
    Direct,
}

pub fn disclosure_level(attempt: u32) -> DisclosureLevel {
    match attempt {
        0 | 1 => DisclosureLevel::Vague,
        2 => DisclosureLevel::Specific,
        _ => DisclosureLevel::Direct,
    }
}

/// Whether this attempt count has unlocked the diff/patch surface. Only
/// `LOGIC_ERROR` outcomes ever have a diff to unlock (B-series edge case:
/// every other outcome's evidence is already a plain message).
pub fn diff_unlocked(attempt: u32) -> bool {
    attempt >= 3
}

/// The three ways a new submission updates the session (§4.7): the student
/// solved it, the same class of failure persists, or a different failure
/// replaced the old one. Each carries the exact status line the original
/// surfaces to the student.
pub enum SessionTransition {
    Solved,
    Persisted { attempt: u32 },
    Changed { attempt: u32 },
}

impl SessionTransition {
    /// Matches the original's exact wording so pipeline output stays
    /// recognizable to anyone who built tooling or grading rubrics against
    /// it.
    pub fn status_line(&self, status: TestOutcome) -> String {
        match self {
            SessionTransition::Solved => "**Great Job!** You passed all tests.".to_string(),
            SessionTransition::Persisted { attempt } => {
                format!("**Issue Persists:** Attempt #{attempt} at fixing {status}.")
            }
            SessionTransition::Changed { attempt } => {
                format!("**New Challenge:** Encountered a {status}.")
            }
        }
    }
}

/// Applies the session-update rule (§4.7) in place and returns which
/// transition fired. `SUCCESS` always resets `attempt` to 0; a repeat of the
/// same non-success outcome increments it; any other outcome restarts the
/// ladder at 1.
pub fn update_session(session: &mut Session, outcome: TestOutcome) -> SessionTransition {
    if outcome.is_success() {
        session.attempt = 0;
        session.last_error = Some(TestOutcome::Success);
        return SessionTransition::Solved;
    }

    let transition = match session.last_error {
        Some(previous) if previous == outcome => {
            session.attempt += 1;
            SessionTransition::Persisted {
                attempt: session.attempt,
            }
        }
        _ => {
            session.attempt = 1;
            SessionTransition::Changed {
                attempt: session.attempt,
            }
        }
    };
    session.last_error = Some(outcome);
    transition
}

/// Everything the prompt assembler and patch deriver need about the failed
/// submission.
pub struct HintContext<'a> {
    pub outcome: TestOutcome,
    pub evidence: &'a Evidence,
    pub knowledge: &'a KnowledgeEntry,
    pub attempt: u32,
    pub source: &'a str,
}

/// The orchestrator's final answer: the rendered hint text, plus an
/// optional unified-diff-derived patch when the disclosure ladder and the
/// outcome both permit it.
pub struct HintResponse {
    pub message: String,
    pub diff_unlocked: bool,
    pub patch: Option<String>,
}

fn system_prompt(level: DisclosureLevel) -> &'static str {
    match level {
        DisclosureLevel::Vague => {
            "You are a patient teaching assistant. Respond with a single short \
             Socratic question that nudges the student toward the bug without \
             naming the error, the language construct involved, or the fix. \
             Never include code."
        }
        DisclosureLevel::Specific => {
            "You are a teaching assistant. Name the general concept the \
             student is missing and point at roughly where to look, but do \
             not give the corrected line or the exact fix. Keep it to two or \
             three sentences."
        }
        DisclosureLevel::Direct => {
            "You are a teaching assistant. Explain exactly what is wrong and \
             why, referencing the evidence provided. Be direct and specific; \
             the student has already struggled with this for multiple \
             attempts."
        }
    }
}

fn build_prompt(ctx: &HintContext<'_>, level: DisclosureLevel) -> String {
    let mut prompt = format!(
        "Problem outcome: {}\nConcept: {}\nEvidence: {}\n",
        ctx.outcome,
        ctx.knowledge.concept,
        ctx.evidence.as_display()
    );
    if level == DisclosureLevel::Direct {
        prompt.push_str(&format!("Reference: {}\n", ctx.knowledge.citation));
        prompt.push_str(&format!("Student source:\n```\n{}\n```\n", ctx.source));
        prompt.push_str(
            "After your explanation, include the corrected source in a single \
             fenced code block so a patch can be derived from it.\n",
        );
    }
    prompt.push_str(&format!(
        "Hint template to draw from (do not quote verbatim): {}\n",
        ctx.knowledge.hint_template
    ));
    prompt
}

/// Pulls the last fenced code block out of a model reply, if any.
fn extract_code_block(raw: &str) -> Option<String> {
    let mut blocks = Vec::new();
    let mut in_block = false;
    let mut current = String::new();
    for line in raw.lines() {
        let trimmed = line.trim();
        if !in_block && trimmed.starts_with("```") {
            in_block = true;
            current.clear();
            continue;
        }
        if in_block && trimmed == "```" {
            in_block = false;
            blocks.push(current.clone());
            continue;
        }
        if in_block {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(line);
        }
    }
    blocks.pop()
}

/// Requests a hint from `oracle` at the disclosure level implied by
/// `ctx.attempt`, falling back to the raw model reply when the response
/// isn't the structured shape we asked for (§4.8: a failed parse degrades to
/// using the raw text as the hint, never a hard failure).
pub async fn generate_hint(
    oracle: &dyn Oracle,
    ctx: &HintContext<'_>,
) -> anyhow::Result<HintResponse> {
    let level = disclosure_level(ctx.attempt);
    let request = OracleRequest {
        prompt: format!("{}\n\n{}", system_prompt(level), build_prompt(ctx, level)),
        max_tokens: 512,
    };
    let response = oracle.complete(&request).await?;
    let mut message = extract_hint_text(&response.content);

    let unlocked = diff_unlocked(ctx.attempt) && ctx.outcome == TestOutcome::LogicError;
    if unlocked {
        message.push_str("\n\n**Diff Analysis Unlocked (Attempt 3+):**\n");
        match ctx.evidence.diff_body() {
            Some(diff) => message.push_str(diff),
            // The priority analyzer may have already overridden LOGIC_ERROR's
            // evidence with a knowledge-base hint by the time this runs.
            None => message.push_str("No output diff available."),
        }
    }

    let patch = if unlocked {
        extract_code_block(&response.content).and_then(|corrected| derive_patch(ctx.source, &corrected))
    } else {
        None
    };
    if patch.is_some() {
        message.push_str("\n\n**Source Patch Unlocked:** A suggested code fix is now available.");
    }

    Ok(HintResponse {
        message,
        diff_unlocked: unlocked,
        patch,
    })
}

/// Pulls a `{...}`-delimited JSON hint field out of a raw model reply if
/// present, otherwise returns the reply verbatim (§4.8 fallback rule).
fn extract_hint_text(raw: &str) -> String {
    if let (Some(start), Some(end)) = (raw.find('{'), raw.rfind('}')) {
        if end > start {
            if let Ok(value) =
                serde_json::from_str::<serde_json::Value>(&raw[start..=end])
            {
                if let Some(hint) = value.get("hint").and_then(|v| v.as_str()) {
                    return hint.to_string();
                }
            }
        }
    }
    raw.trim().to_string()
}

/// Derives a unified diff between the student's source and the oracle's
/// corrected version, stripping the two `---`/`+++` header lines and using
/// a one-line context radius (§4.9). `None` when the two are identical —
/// there is nothing to patch.
fn derive_patch(source: &str, corrected: &str) -> Option<String> {
    if source.trim() == corrected.trim() {
        return None;
    }

    let text_diff = similar::TextDiff::from_lines(source, corrected);
    let unified = text_diff
        .unified_diff()
        .context_radius(1)
        .header("a/source", "b/source")
        .to_string();

    let stripped: String = unified.lines().skip(2).collect::<Vec<_>>().join("\n");

    if stripped.trim().is_empty() {
        None
    } else {
        Some(stripped)
    }
}

/// Strips ANSI-ish markdown emphasis the knowledge base sometimes embeds in
/// hint templates, used when rendering a hint into a plain-text transcript.
pub fn strip_markdown_emphasis(text: &str) -> String {
    let re = Regex::new(r"\*\*(.*?)\*\*").expect("static pattern");
    re.replace_all(text, "$1").to_string()
}

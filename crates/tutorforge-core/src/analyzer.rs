//! Priority analyzer: scans raw investigation logs against the knowledge
//! base's pattern catalog and, when the coarse outcome is a logic mismatch
//! (or, with the flag enabled, a runtime error), may rewrite it to a
//! higher-priority classification the catalog recognized.

use regex::RegexBuilder;

use crate::knowledge::KnowledgeBase;
use crate::model::{Evidence, KnowledgeEntry, TestOutcome};

/// Configuration for the override rule. `allow_runtime_override` resolves
/// the open question about whether Priority-1 patterns may also upgrade a
/// `RUNTIME_ERROR` coarse outcome; it defaults to off to match the
/// original's behavior exactly.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyzerConfig {
    pub allow_runtime_override: bool,
}

/// A pure function of `(logs, catalog)`: scans every patterned entry
/// case-insensitively against the concatenated logs and returns the lowest
/// numeric priority match, ties broken by catalog order.
pub fn scan(logs: &str, knowledge: &KnowledgeBase) -> Option<&KnowledgeEntry> {
    let mut best: Option<&KnowledgeEntry> = None;
    for entry in knowledge.catalog() {
        let Some(pattern) = entry.pattern.as_deref() else {
            continue;
        };
        let Ok(re) = RegexBuilder::new(pattern).case_insensitive(true).build() else {
            continue;
        };
        if re.is_match(logs) {
            match best {
                None => best = Some(entry),
                Some(current) if entry.priority < current.priority => best = Some(entry),
                _ => {}
            }
        }
    }
    best
}

/// Outcome of applying the override rule: either the coarse outcome passed
/// through unchanged, or an upgraded outcome plus a log line recording why.
pub struct AnalysisResult {
    pub outcome: TestOutcome,
    pub evidence: Evidence,
    pub override_log: Option<String>,
}

/// Applies the override rule (§4.6) to a coarse outcome. `coarse_evidence`
/// is the evidence the investigation pipeline already produced; it passes
/// through untouched unless an override fires.
pub fn apply_override(
    coarse_outcome: TestOutcome,
    coarse_evidence: Evidence,
    logs: &str,
    knowledge: &KnowledgeBase,
    config: AnalyzerConfig,
) -> AnalysisResult {
    let eligible = coarse_outcome == TestOutcome::LogicError
        || (config.allow_runtime_override && coarse_outcome == TestOutcome::RuntimeError);

    if !eligible {
        return AnalysisResult {
            outcome: coarse_outcome,
            evidence: coarse_evidence,
            override_log: None,
        };
    }

    match scan(logs, knowledge) {
        Some(matched) => {
            let upgraded = matched
                .error_type
                .parse::<TestOutcome>()
                .unwrap_or(coarse_outcome);
            AnalysisResult {
                outcome: upgraded,
                evidence: Evidence::text(matched.hint_template.clone()),
                override_log: Some(format!(
                    "[Agent Override] Logic Error masked by Critical Warning: {}",
                    matched.error_type
                )),
            }
        }
        None => AnalysisResult {
            outcome: coarse_outcome,
            evidence: coarse_evidence,
            override_log: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::KnowledgeBase;

    fn kb_with(entries: serde_json::Value) -> KnowledgeBase {
        let mut kb = KnowledgeBase::default();
        kb.merge_value(entries);
        kb
    }

    #[test]
    fn lowest_priority_wins_among_multiple_matches() {
        let kb = kb_with(serde_json::json!({
            "priority_1": [
                {"type": "MISSING_SCANF", "priority": 1, "pattern": "scanf", "concept": "c", "hint_template": "h1", "citation": "c1"},
                {"type": "LOW_PRIORITY_THING", "priority": 2, "pattern": "scanf", "concept": "c", "hint_template": "h2", "citation": "c2"}
            ]
        }));
        let matched = scan("warning: scanf format mismatch", &kb).unwrap();
        assert_eq!(matched.error_type, "MISSING_SCANF");
    }

    #[test]
    fn override_fires_for_logic_error_and_rewrites_evidence() {
        let kb = kb_with(serde_json::json!({
            "priority_1": [
                {"type": "RUNTIME_ERROR", "priority": 1, "pattern": "scanf", "concept": "c", "hint_template": "Check your scanf.", "citation": "c1"}
            ]
        }));
        let logs = "warning: scanf format mismatch";
        let result = apply_override(
            TestOutcome::LogicError,
            Evidence::text("raw diff"),
            logs,
            &kb,
            AnalyzerConfig::default(),
        );
        assert_eq!(result.outcome, TestOutcome::RuntimeError);
        assert_eq!(result.evidence.as_display(), "Check your scanf.");
        assert!(result.override_log.unwrap().contains("RUNTIME_ERROR"));
    }

    #[test]
    fn override_does_not_fire_for_runtime_error_by_default() {
        let kb = kb_with(serde_json::json!({
            "priority_1": [
                {"type": "SYNTAX_ERROR", "priority": 1, "pattern": "scanf", "concept": "c", "hint_template": "Check your scanf.", "citation": "c1"}
            ]
        }));
        let logs = "warning: scanf format mismatch";
        let result = apply_override(
            TestOutcome::RuntimeError,
            Evidence::text("raw stderr"),
            logs,
            &kb,
            AnalyzerConfig::default(),
        );
        assert_eq!(result.outcome, TestOutcome::RuntimeError);
        assert!(result.override_log.is_none());
    }

    #[test]
    fn override_extends_to_runtime_error_when_flag_enabled() {
        let kb = kb_with(serde_json::json!({
            "priority_1": [
                {"type": "SEGFAULT_ERROR", "priority": 1, "pattern": "segmentation", "concept": "c", "hint_template": "Null deref.", "citation": "c1"}
            ]
        }));
        let result = apply_override(
            TestOutcome::RuntimeError,
            Evidence::text("Segmentation fault (core dumped)"),
            "Segmentation fault (core dumped)",
            &kb,
            AnalyzerConfig {
                allow_runtime_override: true,
            },
        );
        assert_eq!(result.outcome, TestOutcome::SegfaultError);
        assert!(result.override_log.is_some());
    }

    #[test]
    fn non_logic_outcomes_pass_through_unchanged_without_a_match() {
        let kb = KnowledgeBase::default();
        let result = apply_override(
            TestOutcome::CompilationError,
            Evidence::text("Line 3: expected ';'"),
            "error: expected ';'",
            &kb,
            AnalyzerConfig::default(),
        );
        assert_eq!(result.outcome, TestOutcome::CompilationError);
        assert!(result.override_log.is_none());
    }
}

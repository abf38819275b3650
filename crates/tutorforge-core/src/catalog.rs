//! The problem catalog: process-wide, loaded once at startup, read-only
//! after load (§3 ownership & lifecycles).

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};

use crate::error::CoreError;
use crate::model::Problem;

#[derive(Debug, Default, Clone)]
pub struct ProblemCatalog {
    problems: HashMap<String, Problem>,
}

impl ProblemCatalog {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read problem catalog: {}", path.display()))?;
        let problems: HashMap<String, Problem> = serde_json::from_str(&content)
            .with_context(|| format!("corrupt problem catalog: {}", path.display()))?;
        Ok(Self { problems })
    }

    pub fn get(&self, problem_id: &str) -> Result<&Problem, CoreError> {
        self.problems
            .get(problem_id)
            .ok_or_else(|| CoreError::UnknownProblem(problem_id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.problems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    /// The sanitized `GET /problems`-equivalent listing: hidden cases never
    /// appear (I6).
    pub fn listing(&self) -> HashMap<String, crate::model::ProblemSummary> {
        self.problems
            .iter()
            .map(|(id, problem)| (id.clone(), problem.sanitized()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Case;

    #[test]
    fn missing_problem_is_a_typed_error() {
        let catalog = ProblemCatalog::default();
        let err = catalog.get("nonexistent").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn listing_never_exposes_hidden_cases() {
        let mut problems = HashMap::new();
        problems.insert(
            "two-sum".to_string(),
            Problem {
                id: "two-sum".to_string(),
                title: "Two Sum".to_string(),
                description: "...".to_string(),
                sample_cases: vec![Case {
                    input: "1 2".to_string(),
                    output: "3".to_string(),
                }],
                hidden_cases: vec![Case {
                    input: "secret".to_string(),
                    output: "answer".to_string(),
                }],
                difficulty: "Easy".to_string(),
            },
        );
        let catalog = ProblemCatalog { problems };
        let listing = catalog.listing();
        let summary = &listing["two-sum"];
        assert_eq!(summary.case_count, 1);
        assert!(!format!("{summary:?}").contains("secret"));
    }

    #[test]
    fn load_missing_file_yields_empty_catalog() {
        let catalog = ProblemCatalog::load(Path::new("/nonexistent/problems.json")).unwrap();
        assert!(catalog.is_empty());
    }
}

//! Per-language drivers (C2): materialize source into a workspace, run it
//! through the container runner's compile/run chain, and pre-classify
//! unambiguous failure modes before handing a result back to the
//! investigation pipeline.

use async_trait::async_trait;

use tutorforge_core::model::{DriverResult, Language, TestOutcome};
use tutorforge_core::traits::{ContainerRunner, LanguageDriver};

use crate::sandbox::Workspace;

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

/// Looks for `"error:"` alongside a compiler/source-file token — the
/// heuristic the original used to tell "this stderr is a compiler
/// diagnostic" from "this stderr is a runtime panic/traceback".
fn looks_like_compile_error(stderr: &str, source_filename: &str) -> bool {
    stderr.contains("error:") && (stderr.contains(source_filename) || stderr.contains("gcc") || stderr.contains("g++") || stderr.contains("javac"))
}

fn pre_classify(language: Language, source_filename: &str, stderr: &str) -> Option<TestOutcome> {
    match language {
        Language::C | Language::Cpp | Language::Java => {
            if looks_like_compile_error(stderr, source_filename) {
                return Some(TestOutcome::CompilationError);
            }
            if language == Language::Java && stderr.contains("ClassCastException") {
                return Some(TestOutcome::TypeError);
            }
            None
        }
        Language::Python => {
            if stderr.contains("SyntaxError") || stderr.contains("IndentationError") || stderr.contains("TabError") {
                Some(TestOutcome::SyntaxError)
            } else if stderr.contains("TypeError") {
                Some(TestOutcome::TypeError)
            } else {
                None
            }
        }
    }
}

struct BaseDriver {
    language: Language,
}

#[async_trait]
impl LanguageDriver for BaseDriver {
    fn language(&self) -> Language {
        self.language
    }

    async fn run(
        &self,
        runner: &dyn ContainerRunner,
        work_dir: &std::path::Path,
        source: &str,
        stdin: &str,
    ) -> anyhow::Result<DriverResult> {
        let workspace_filename = crate::sandbox::source_filename(self.language);
        std::fs::write(work_dir.join(workspace_filename), source)?;

        let commands = match self.language {
            Language::C => vec![
                argv(&["gcc", "main.c", "-o", "main.out"]),
                argv(&["./main.out"]),
            ],
            Language::Cpp => vec![
                argv(&["g++", "main.cpp", "-o", "main.out"]),
                argv(&["./main.out"]),
            ],
            Language::Python => vec![argv(&["python3", "main.py"])],
            Language::Java => vec![
                argv(&["javac", "Main.java"]),
                argv(&["java", "-cp", ".", "Main"]),
            ],
        };

        let result = runner.run(&commands, stdin.as_bytes(), work_dir).await?;

        if let Some(status) = pre_classify(self.language, workspace_filename, &result.stderr) {
            return Ok(DriverResult::PreClassified {
                status,
                stderr: result.stderr,
            });
        }

        Ok(DriverResult::Raw {
            exit_code: result.exit_code,
            stdout: result.stdout,
            stderr: result.stderr,
        })
    }
}

pub fn driver_for(language: Language) -> Box<dyn LanguageDriver> {
    Box::new(BaseDriver { language })
}

/// Materializes `source` into a fresh workspace under `base_dir` and runs it
/// through `runner`, destroying the workspace on every exit path (I4) via
/// `Workspace`'s `Drop`.
pub async fn run_in_fresh_workspace(
    runner: &dyn ContainerRunner,
    base_dir: &std::path::Path,
    language: Language,
    source: &str,
    stdin: &str,
) -> anyhow::Result<DriverResult> {
    let workspace = Workspace::new(base_dir)?;
    let driver = driver_for(language);
    driver.run(runner, workspace.path(), source, stdin).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_error_detected_via_error_token_and_filename() {
        let stderr = "main.c:3:5: error: expected ';' before '}' token";
        assert_eq!(
            pre_classify(Language::C, "main.c", stderr),
            Some(TestOutcome::CompilationError)
        );
    }

    #[test]
    fn runtime_stderr_is_not_misclassified_as_compile_error() {
        let stderr = "Segmentation fault (core dumped)";
        assert_eq!(pre_classify(Language::C, "main.c", stderr), None);
    }

    #[test]
    fn python_syntax_error_is_preclassified() {
        let stderr = "  File \"main.py\", line 2\nSyntaxError: invalid syntax";
        assert_eq!(
            pre_classify(Language::Python, "main.py", stderr),
            Some(TestOutcome::SyntaxError)
        );
    }

    #[test]
    fn python_type_error_is_preclassified() {
        let stderr = "TypeError: unsupported operand type(s)";
        assert_eq!(
            pre_classify(Language::Python, "main.py", stderr),
            Some(TestOutcome::TypeError)
        );
    }

    #[test]
    fn java_class_cast_exception_is_preclassified_as_type_error() {
        let stderr = "Exception in thread \"main\" java.lang.ClassCastException: ...";
        assert_eq!(
            pre_classify(Language::Java, "Main.java", stderr),
            Some(TestOutcome::TypeError)
        );
    }

    #[test]
    fn clean_runtime_stderr_is_not_preclassified() {
        assert_eq!(pre_classify(Language::Java, "Main.java", ""), None);
    }

    #[test]
    fn driver_command_chains_match_per_language_conventions() {
        assert_eq!(driver_for(Language::C).language(), Language::C);
        assert_eq!(driver_for(Language::Python).language(), Language::Python);
    }
}

//! Per-language extraction of `{line, column, message}` from raw toolchain
//! stderr. Semantics (not code) are carried over from the original error
//! analyzer: regexes, fallback order, and the 150-character truncation are
//! all load-bearing, not incidental.

use regex::Regex;
use std::sync::OnceLock;

use crate::model::{DiagnosticRecord, Language};

fn c_cpp_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(.*?):(\d+):(\d+): (error|warning|fatal error): (.+)$").unwrap()
    })
}

fn java_compile_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(.*?):(\d+): error: (.+)$").unwrap())
}

fn java_trace_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"at .*?\((.*?):(\d+)\)").unwrap())
}

fn python_file_line_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"File "(.*?)", line (\d+)"#).unwrap())
}

/// Extracts the first diagnostic from raw stderr for the given language.
/// Returns a record with `line = "?"` and the first 150 characters of the
/// first stderr line when nothing matches.
pub fn get_first_error(stderr: &str, language: Language) -> DiagnosticRecord {
    if stderr.is_empty() {
        return DiagnosticRecord {
            line: "?".to_string(),
            column: "0".to_string(),
            message: "Unknown Error".to_string(),
            raw: String::new(),
        };
    }

    if language == Language::Python {
        return parse_python_error(stderr);
    }

    if let Some(record) = parse_standard_compiler(stderr, language) {
        return record;
    }

    if language == Language::Java {
        if let Some(record) = parse_java_traceback(stderr) {
            if record.line != "?" {
                return record;
            }
        }
    }

    let first_line = stderr.lines().next().unwrap_or("").trim();
    let truncated: String = first_line.chars().take(150).collect();
    DiagnosticRecord {
        line: "?".to_string(),
        column: "0".to_string(),
        message: truncated,
        raw: stderr.to_string(),
    }
}

fn parse_standard_compiler(stderr: &str, language: Language) -> Option<DiagnosticRecord> {
    match language {
        Language::C | Language::Cpp => {
            let re = c_cpp_pattern();
            for line in stderr.lines() {
                if let Some(caps) = re.captures(line.trim()) {
                    return Some(DiagnosticRecord {
                        line: caps[2].to_string(),
                        column: caps[3].to_string(),
                        message: caps[5].trim().to_string(),
                        raw: line.trim().to_string(),
                    });
                }
            }
            None
        }
        Language::Java => {
            let re = java_compile_pattern();
            for line in stderr.lines() {
                if let Some(caps) = re.captures(line.trim()) {
                    return Some(DiagnosticRecord {
                        line: caps[2].to_string(),
                        column: "0".to_string(),
                        message: caps[3].trim().to_string(),
                        raw: line.trim().to_string(),
                    });
                }
            }
            None
        }
        Language::Python => None,
    }
}

fn parse_java_traceback(stderr: &str) -> Option<DiagnosticRecord> {
    let first_line = stderr.lines().next().unwrap_or("Runtime Error");
    let re = java_trace_pattern();
    for line in stderr.lines() {
        if let Some(caps) = re.captures(line) {
            let file = &caps[1];
            if file.contains("Main.java") {
                return Some(DiagnosticRecord {
                    line: caps[2].to_string(),
                    column: "0".to_string(),
                    message: first_line.to_string(),
                    raw: stderr.to_string(),
                });
            }
        }
    }
    Some(DiagnosticRecord {
        line: "?".to_string(),
        column: "0".to_string(),
        message: first_line.to_string(),
        raw: stderr.to_string(),
    })
}

fn parse_python_error(stderr: &str) -> DiagnosticRecord {
    let mut message = "Runtime Error".to_string();
    for line in stderr.lines().rev() {
        let trimmed = line.trim();
        if !trimmed.is_empty() && trimmed.contains("Error:") {
            message = trimmed.to_string();
            break;
        }
    }

    let mut line_num = "?".to_string();
    let re = python_file_line_pattern();
    for line in stderr.lines() {
        if let Some(caps) = re.captures(line) {
            line_num = caps[2].to_string();
        }
    }

    DiagnosticRecord {
        line: line_num,
        column: "0".to_string(),
        message,
        raw: stderr.to_string(),
    }
}

//! Whitespace-trimmed line comparison of actual vs. expected output.

/// One line of the comparison report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComparisonLine {
    Expected(String),
    Actual(String),
    Match(String),
}

impl ComparisonLine {
    pub fn tag(&self) -> &'static str {
        match self {
            ComparisonLine::Expected(_) => "EXPECTED",
            ComparisonLine::Actual(_) => "ACTUAL",
            ComparisonLine::Match(_) => "MATCH",
        }
    }

    pub fn text(&self) -> &str {
        match self {
            ComparisonLine::Expected(s) | ComparisonLine::Actual(s) | ComparisonLine::Match(s) => s,
        }
    }
}

pub struct ComparisonReport {
    pub lines: Vec<ComparisonLine>,
    pub has_diff: bool,
}

impl ComparisonReport {
    /// Renders the report as `TAG: text` lines, one per line of the longer side.
    pub fn render(&self) -> String {
        self.lines
            .iter()
            .map(|l| format!("{}: {}", l.tag(), l.text()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn trim_lines(s: &str) -> Vec<&str> {
    s.lines().map(|l| l.trim_end()).collect()
}

/// Compares two strings line by line after trailing-whitespace trimming per
/// line. A trailing newline in either string never produces a trailing empty
/// line that would otherwise break equality (B2).
pub fn compare(expected: &str, actual: &str) -> ComparisonReport {
    let expected_lines = trim_lines(expected.trim_end_matches('\n'));
    let actual_lines = trim_lines(actual.trim_end_matches('\n'));

    let has_diff = expected_lines != actual_lines;

    let max_len = expected_lines.len().max(actual_lines.len());
    let mut lines = Vec::with_capacity(max_len);
    for i in 0..max_len {
        let e = expected_lines.get(i).copied();
        let a = actual_lines.get(i).copied();
        match (e, a) {
            (Some(e), Some(a)) if e == a => lines.push(ComparisonLine::Match(e.to_string())),
            (Some(e), Some(a)) => {
                lines.push(ComparisonLine::Expected(e.to_string()));
                lines.push(ComparisonLine::Actual(a.to_string()));
            }
            (Some(e), None) => lines.push(ComparisonLine::Expected(e.to_string())),
            (None, Some(a)) => lines.push(ComparisonLine::Actual(a.to_string())),
            (None, None) => unreachable!(),
        }
    }

    ComparisonReport { lines, has_diff }
}

/// `true` when `actual` equals `expected` under the same trimming rule used
/// by `compare`, without building a full report — the investigation pipeline
/// uses this on the hot path.
pub fn outputs_match(expected: &str, actual: &str) -> bool {
    trim_lines(expected.trim_end_matches('\n')) == trim_lines(actual.trim_end_matches('\n'))
}

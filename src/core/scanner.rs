// Copyright 2025 Eric Jingryd (tidynest@proton.me)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! src/core/scanner.rs
//!
//! Line scanner: walks a script line by line and evaluates every executable
//! line against the rule catalog and the structural detectors.
//!
//! # Comments
//! Comments never execute, so they never produce findings. Recognised forms:
//! - Line comments: `#`, `REM`, `@REM`, `::`, `//`, `'`
//! - Block comments: `<# ... #>` (PowerShell) and `/* ... */` (script host)
//!
//! The only state carried across lines is whether a block comment is open.
//! A block opens when the trimmed line *starts* with an open token that is not
//! closed on the same line; an open token in the middle of a code line is not
//! treated as a comment, so it can never hide the lines after it. Text after a
//! close token is code again and is scanned.
//!
//! # Evaluation order
//! For each executable line: BLOCKED rules, DANGER rules, WARNING rules, then
//! the structural detectors. The combined findings are stably ordered by
//! severity (most severe first) and a DANGER finding whose description
//! duplicates a BLOCKED finding on the same line is dropped.

use tracing::trace;

use crate::core::catalog;
use crate::core::detectors;
use crate::core::types::{Finding, Severity};

/// Block comment dialects
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BlockStyle {
    /// `<# ... #>`
    PowerShell,
    /// `/* ... */`
    CStyle,
}

impl BlockStyle {
    fn open_token(self) -> &'static str {
        match self {
            BlockStyle::PowerShell => "<#",
            BlockStyle::CStyle => "/*",
        }
    }

    fn close_token(self) -> &'static str {
        match self {
            BlockStyle::PowerShell => "#>",
            BlockStyle::CStyle => "*/",
        }
    }

    fn opening(trimmed: &str) -> Option<Self> {
        [BlockStyle::PowerShell, BlockStyle::CStyle]
            .into_iter()
            .find(|style| trimmed.starts_with(style.open_token()))
    }
}

/// Comment state threaded through the line loop
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum CommentState {
    /// Outside any block comment
    #[default]
    Code,
    /// Inside an unterminated block comment
    InBlock(BlockStyle),
}

/// True for single-line comment syntax of the shell, batch and script-host dialects
fn is_line_comment(trimmed: &str) -> bool {
    if ["#", "::", "//", "'"].iter().any(|prefix| trimmed.starts_with(prefix)) {
        return true;
    }

    let rest = trimmed.strip_prefix('@').unwrap_or(trimmed);
    match rest.get(..3) {
        Some(keyword) if keyword.eq_ignore_ascii_case("rem") => rest[3..]
            .chars()
            .next()
            .is_none_or(|c| c.is_whitespace() || c == ':'),
        _ => false,
    }
}

impl CommentState {
    /// Returns the executable part of `line`, advancing the comment state
    ///
    /// `None` means the line contributes nothing: blank, a line comment, or
    /// entirely inside a block comment.
    pub fn executable<'a>(&mut self, line: &'a str) -> Option<&'a str> {
        match *self {
            CommentState::InBlock(style) => {
                let close = line.find(style.close_token())?;
                *self = CommentState::Code;
                self.executable(&line[close + style.close_token().len()..])
            }
            CommentState::Code => {
                let trimmed = line.trim();
                if trimmed.is_empty() || is_line_comment(trimmed) {
                    return None;
                }
                if let Some(style) = BlockStyle::opening(trimmed) {
                    *self = CommentState::InBlock(style);
                    return self.executable(&trimmed[style.open_token().len()..]);
                }
                Some(line)
            }
        }
    }
}

/// Iterates the executable lines of a script with their 1-based line numbers
pub fn executable_lines(script: &str) -> impl Iterator<Item = (usize, &str)> {
    let mut state = CommentState::default();
    script
        .lines()
        .enumerate()
        .filter_map(move |(index, line)| state.executable(line).map(|code| (index + 1, code)))
}

/// Drops DANGER findings that repeat a BLOCKED finding's description
///
/// The BLOCKED finding already dominates the verdict. Findings must all
/// belong to the same line.
pub(crate) fn suppress_shadowed_dangers(findings: &mut Vec<Finding>) {
    let blocked: Vec<String> = findings
        .iter()
        .filter(|f| f.severity == Severity::Blocked)
        .map(|f| f.description.clone())
        .collect();

    findings.retain(|f| f.severity != Severity::Danger || !blocked.contains(&f.description));
}

/// Evaluates one executable line
pub fn scan_line(line_number: usize, line: &str) -> Vec<Finding> {
    let mut findings = Vec::new();

    for tier in [Severity::Blocked, Severity::Danger, Severity::Warning] {
        for rule in catalog::rules(tier) {
            if let Some(matched) = rule.find(line) {
                findings.push(Finding::at_line(
                    line_number,
                    matched,
                    rule.severity(),
                    rule.description(),
                    rule.recommendation(),
                ));
            }
        }
    }

    findings.extend(detectors::subnet_targeting(line_number, line));
    findings.extend(detectors::bulk_query_targeting(line_number, line));

    findings.sort_by(|a, b| b.severity.cmp(&a.severity));
    suppress_shadowed_dangers(&mut findings);

    for finding in &findings {
        trace!(line = line_number, severity = %finding.severity, "{}", finding.description);
    }

    findings
}

/// Scans a whole script, returning line findings in line order
///
/// # Example
/// ```
/// use fleet_script_guard::core::scanner::scan;
/// use fleet_script_guard::core::Severity;
///
/// let findings = scan("REM net stop DNS\nnet stop DNS");
/// assert_eq!(findings.len(), 1);
/// assert_eq!(findings[0].line, 2);
/// assert_eq!(findings[0].severity, Severity::Blocked);
/// ```
pub fn scan(script: &str) -> Vec<Finding> {
    executable_lines(script)
        .flat_map(|(line_number, line)| scan_line(line_number, line))
        .collect()
}

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

//! Analysis reports
//!
//! Two renderings of the same verdict:
//! - **Text**: colored, for an operator at a terminal
//! - **JSON**: an [`AuditRecord`] envelope for the deployment audit log
//!
//! The envelope carries the tool and catalog versions and a timestamp. The
//! embedded `result` is the analyzer's verdict untouched, so two records for
//! the same input differ only in `analyzed_at`.

use atomic_write_file::AtomicWriteFile;
use chrono::{SecondsFormat, Utc};
use colored::*;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

use super::error::ReportError;
use crate::core::catalog::CATALOG_VERSION;
use crate::core::types::{AnalysisResult, Finding, Severity};

/// One audited analysis run
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct AuditRecord {
    pub tool_version: String,
    pub catalog_version: String,
    /// RFC 3339, UTC
    pub analyzed_at: String,
    /// Script path as given on the command line, `-` for stdin
    pub script: String,
    /// False when no policy was supplied or it failed to load
    pub policy_applied: bool,
    pub result: AnalysisResult,
}

impl AuditRecord {
    /// Wraps a verdict, stamping it with the current time
    pub fn new(script: impl Into<String>, policy_applied: bool, result: AnalysisResult) -> Self {
        Self {
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            catalog_version: CATALOG_VERSION.to_string(),
            analyzed_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            script: script.into(),
            policy_applied,
            result,
        }
    }
}

/// Pretty-printed JSON for an audit record
pub fn render_json(record: &AuditRecord) -> Result<String, ReportError> {
    Ok(serde_json::to_string_pretty(record)?)
}

fn severity_label(severity: Severity) -> ColoredString {
    let label = format!("[{}]", severity);
    match severity {
        Severity::Blocked => label.red().bold(),
        Severity::Danger => label.red(),
        Severity::Warning => label.yellow(),
        Severity::Info => label.dimmed(),
    }
}

fn render_finding(out: &mut String, finding: &Finding) {
    let location = if finding.is_document_level() {
        "script".to_string()
    } else {
        format!("line {}", finding.line)
    };

    out.push_str(&format!(
        "{} {}: {}\n",
        severity_label(finding.severity),
        location.cyan(),
        finding.description
    ));
    out.push_str(&format!("    {} {}\n", "matched:".dimmed(), finding.matched_pattern));
    out.push_str(&format!("    {} {}\n", "fix:".dimmed(), finding.recommendation));
}

/// Human-readable report for one script
pub fn render_text(script: &str, result: &AnalysisResult) -> String {
    let verdict = if !result.is_safe {
        "✗ BLOCKED".red().bold()
    } else if result.requires_override() {
        "⚠ APPROVAL REQUIRED".yellow().bold()
    } else {
        "✓ SAFE".green().bold()
    };

    let mut out = String::new();
    out.push_str(&format!("{} {}\n", "Script:".bold(), script));
    out.push_str(&format!(
        "{} {} (risk {})\n",
        "Verdict:".bold(),
        verdict,
        result.risk_level
    ));
    out.push_str(&format!("{}\n", result.summary));

    if !result.findings.is_empty() {
        out.push('\n');
        for finding in &result.findings {
            render_finding(&mut out, finding);
        }
    }

    out
}

/// Atomically writes a rendered report to `path`
///
/// # Errors
///
/// Returns `ReportError::WriteFailed` if the file cannot be opened, written
/// or committed. A failed write leaves any previous report untouched.
pub fn write_report(path: &Path, content: &str) -> Result<(), ReportError> {
    let mut file = AtomicWriteFile::options()
        .open(path)
        .map_err(|e| ReportError::WriteFailed(format!("Failed to open for atomic write: {}", e)))?;

    file.write_all(content.as_bytes())
        .map_err(|e| ReportError::WriteFailed(format!("Failed to write report: {}", e)))?;

    file.commit()
        .map_err(|e| ReportError::WriteFailed(format!("Failed to commit atomic write: {}", e)))?;

    Ok(())
}

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

//! Severity aggregation and verdict construction

use crate::core::enforcer::scope_violation_description;
use crate::core::types::{AnalysisResult, Finding, RiskLevel, Severity};

/// Accumulates findings in arrival order and derives the verdict from them
///
/// Nothing pushed into the builder is ever dropped.
#[derive(Debug, Default)]
pub struct ResultBuilder {
    findings: Vec<Finding>,
    scope_violations: Vec<String>,
}

impl ResultBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, findings: impl IntoIterator<Item = Finding>) -> &mut Self {
        self.findings.extend(findings);
        self
    }

    /// Adds a hostname scope violation, recording its description separately
    pub fn push_scope_violation(&mut self, finding: Finding) -> &mut Self {
        self.scope_violations
            .push(scope_violation_description(&finding.matched_pattern));
        self.findings.push(finding);
        self
    }

    pub fn build(self) -> AnalysisResult {
        let max = self.findings.iter().map(|f| f.severity).max();
        let blocked_descriptions = self
            .findings
            .iter()
            .filter(|f| f.severity == Severity::Blocked)
            .map(located_description)
            .collect();
        let summary = summarise(&self.findings, self.scope_violations.len());

        AnalysisResult {
            is_safe: max != Some(Severity::Blocked),
            risk_level: RiskLevel::from_max_severity(max),
            findings: self.findings,
            summary,
            blocked_descriptions,
            scope_violation_descriptions: self.scope_violations,
        }
    }
}

fn located_description(finding: &Finding) -> String {
    if finding.is_document_level() {
        format!("Script: {}", finding.description)
    } else {
        format!("Line {}: {}", finding.line, finding.description)
    }
}

fn summarise(findings: &[Finding], scope_violations: usize) -> String {
    if findings.is_empty() {
        return "No dangerous patterns detected.".to_string();
    }

    let count = |severity: Severity| findings.iter().filter(|f| f.severity == severity).count();
    let (blocked, danger, warning) = (
        count(Severity::Blocked),
        count(Severity::Danger),
        count(Severity::Warning),
    );

    let mut summary = format!(
        "{} finding(s): {blocked} blocked, {danger} danger, {warning} warning.",
        findings.len()
    );
    summary.push_str(if blocked > 0 {
        " Deployment blocked."
    } else if danger > 0 {
        " Deployment requires explicit approval."
    } else {
        " Deployment allowed with warnings."
    });
    if scope_violations > 0 {
        summary.push_str(&format!(" {scope_violations} scope violation(s) detected."));
    }
    summary
}

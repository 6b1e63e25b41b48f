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

//! src/core/types.rs
//!
//! Core type definitions for script safety analysis
//!
//! This module defines the value types every analysis stage produces or consumes:
//! - `Severity`: Risk tier of a single pattern match (INFO < WARNING < DANGER < BLOCKED)
//! - `RiskLevel`: Overall verdict level derived from the worst severity observed
//! - `Finding`: One match, attributed to a line (or to the whole script)
//! - `AnalysisResult`: The complete, deterministic verdict for one script
//!
//! All types are plain values. They serialise for audit reports and compare
//! field-for-field, which is what the determinism guarantees are tested against.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity tier of a single finding
///
/// The ordering is load-bearing: aggregation takes the maximum ("worst wins").
/// Tiers encode consequence, not likelihood.
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Informational only
    Info = 0,
    /// Worth surfacing, never gates deployment
    Warning = 1,
    /// Legitimate but systemically risky, needs human sign-off
    Danger = 2,
    /// Irreversible or beyond the intended target set, never runs
    Blocked = 3,
}

impl Severity {
    /// All tiers, most severe first (the scanner's evaluation order)
    pub const DESCENDING: [Severity; 4] = [
        Severity::Blocked,
        Severity::Danger,
        Severity::Warning,
        Severity::Info,
    ];
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "INFO"),
            Severity::Warning => write!(f, "WARNING"),
            Severity::Danger => write!(f, "DANGER"),
            Severity::Blocked => write!(f, "BLOCKED"),
        }
    }
}

/// Overall risk of a script
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Maps the worst severity observed onto a risk level
    ///
    /// `None` (no findings at all) and `Info` both map to `Low`.
    pub fn from_max_severity(max: Option<Severity>) -> Self {
        match max {
            Some(Severity::Blocked) => RiskLevel::Critical,
            Some(Severity::Danger) => RiskLevel::High,
            Some(Severity::Warning) => RiskLevel::Medium,
            Some(Severity::Info) | None => RiskLevel::Low,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "LOW"),
            RiskLevel::Medium => write!(f, "MEDIUM"),
            RiskLevel::High => write!(f, "HIGH"),
            RiskLevel::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// A single detection produced by any analysis stage
///
/// `line` is 1-based. Line 0 marks a document-level finding that applies to
/// the whole script (policy checks, hostname scope violations).
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Finding {
    /// 1-based line number, or 0 for the whole document
    pub line: usize,
    /// The text (or hostname) that triggered the finding
    pub matched_pattern: String,
    /// Severity tier
    pub severity: Severity,
    /// Human-readable explanation of the risk
    pub description: String,
    /// Suggested mitigation or alternative
    pub recommendation: String,
}

impl Finding {
    /// Creates a finding attributed to one script line
    pub fn at_line(
        line: usize,
        matched_pattern: impl Into<String>,
        severity: Severity,
        description: impl Into<String>,
        recommendation: impl Into<String>,
    ) -> Self {
        Self {
            line,
            matched_pattern: matched_pattern.into(),
            severity,
            description: description.into(),
            recommendation: recommendation.into(),
        }
    }

    /// Creates a document-level finding (line 0)
    pub fn document(
        matched_pattern: impl Into<String>,
        severity: Severity,
        description: impl Into<String>,
        recommendation: impl Into<String>,
    ) -> Self {
        Self::at_line(0, matched_pattern, severity, description, recommendation)
    }

    /// True when the finding applies to the whole script rather than one line
    pub fn is_document_level(&self) -> bool {
        self.line == 0
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_document_level() {
            write!(f, "[{}] script: {}", self.severity, self.description)
        } else {
            write!(f, "[{}] line {}: {}", self.severity, self.line, self.description)
        }
    }
}

/// Complete verdict for one `(script, policy)` pair
///
/// Derived entirely from the inputs. Two calls with the same inputs compare
/// equal field-for-field.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct AnalysisResult {
    /// False iff at least one finding is BLOCKED
    pub is_safe: bool,
    /// Mapping of the worst severity present
    pub risk_level: RiskLevel,
    /// Line findings first, then document-level findings
    pub findings: Vec<Finding>,
    /// One-paragraph human-readable summary
    pub summary: String,
    /// Descriptions of every BLOCKED finding, prefixed with its location
    pub blocked_descriptions: Vec<String>,
    /// Descriptions of every hostname scope violation
    pub scope_violation_descriptions: Vec<String>,
}

impl AnalysisResult {
    /// Worst severity among the findings, if any
    pub fn max_severity(&self) -> Option<Severity> {
        self.findings.iter().map(|f| f.severity).max()
    }

    /// Number of findings in the given tier
    pub fn count(&self, severity: Severity) -> usize {
        self.findings.iter().filter(|f| f.severity == severity).count()
    }

    /// True when the script may run only after an explicit human override
    ///
    /// Blocked scripts never run, so this is false for them.
    pub fn requires_override(&self) -> bool {
        self.is_safe && self.count(Severity::Danger) > 0
    }

    /// True when any hostname outside the approved set was referenced
    pub fn has_scope_violations(&self) -> bool {
        !self.scope_violation_descriptions.is_empty()
    }
}

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

//! src/core/analyzer.rs
//!
//! The single analysis entry point
//!
//! ```text
//! script ──► scanner (catalog + detectors) ──► line findings ─────┐
//!    │                                                             ├─► ResultBuilder ──► AnalysisResult
//!    └─────► enforcer (policy checks + hostnames) ──► document ───┘
//! ```
//!
//! The call is pure: no I/O, no clock, no shared mutable state. It is safe to
//! run concurrently from any number of threads.

use tracing::debug;

use crate::core::enforcer::enforce;
use crate::core::policy::ScopePolicy;
use crate::core::result::ResultBuilder;
use crate::core::scanner::scan;
use crate::core::types::{AnalysisResult, Severity};

/// Analyzes one script against an optional scope policy
///
/// Without a policy only the catalog and structural detectors run.
///
/// # Example
/// ```
/// use fleet_script_guard::{analyze, RiskLevel};
///
/// let result = analyze("shutdown /r", None);
/// assert!(!result.is_safe);
/// assert_eq!(result.risk_level, RiskLevel::Critical);
///
/// let result = analyze("echo Hello", None);
/// assert!(result.is_safe);
/// assert!(result.findings.is_empty());
/// ```
pub fn analyze(script: &str, policy: Option<&ScopePolicy>) -> AnalysisResult {
    let mut builder = ResultBuilder::new();
    builder.extend(scan(script));

    if let Some(policy) = policy {
        let enforcement = enforce(script, policy);
        builder.extend(enforcement.policy_findings);
        for violation in enforcement.scope_violations {
            builder.push_scope_violation(violation);
        }
    }

    let result = builder.build();
    debug!(
        lines = script.lines().count(),
        policy = policy.is_some(),
        blocked = result.count(Severity::Blocked),
        danger = result.count(Severity::Danger),
        warning = result.count(Severity::Warning),
        risk = %result.risk_level,
        "analysis complete"
    );
    result
}

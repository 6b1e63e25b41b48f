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

//! Fleet Script Guard
//!
//! A deterministic static safety analyzer for automation scripts that are
//! about to run against a fleet of networked machines.
//!
//! # Features
//!
//! - **Tiered Rule Catalog:** BLOCKED, DANGER and WARNING patterns for batch,
//!   PowerShell, script-host and POSIX shell commands
//! - **Structural Detectors:** Subnet, range, broadcast and bulk-directory targeting
//! - **Scope Policy:** Hostname allow-lists and per-family operation bans
//! - **Comment Aware:** Comments of every supported dialect never raise findings
//! - **Reproducible Verdicts:** Same script and policy, byte-identical result
//! - **Bounded Cost:** Linear-time pattern engine, no backtracking
//!
//! # Architecture
//!
//! - **`core`:** Pure analysis (catalog, detectors, scanner, policy, verdict)
//! - **`config`:** Policy files and reports (TOML loading, JSON/text, atomic writes)
//!
//! # Verdicts
//!
//! | `is_safe` | DANGER findings | Meaning                                 |
//! |-----------|-----------------|-----------------------------------------|
//! | false     | any             | Never run the script                    |
//! | true      | one or more     | Run only after an explicit human override |
//! | true      | none            | Run                                     |
//!
//! # Examples
//!
//! ## Catalog-only analysis
//!
//! ```
//! use fleet_script_guard::{analyze, RiskLevel};
//!
//! let result = analyze("net stop DNS", None);
//! assert!(!result.is_safe);
//! assert_eq!(result.risk_level, RiskLevel::Critical);
//! ```
//!
//! ## Enforcing a scope policy
//!
//! ```
//! use fleet_script_guard::{analyze, ScopePolicy};
//!
//! let policy = ScopePolicy::default().with_hostnames(["PC01"]);
//! let result = analyze(r"copy agent.msi \\REMOTE01\drop", Some(&policy));
//!
//! assert!(result.is_safe);
//! assert!(result.has_scope_violations());
//! assert!(result.requires_override());
//! ```

pub mod config;
pub mod core;

// Re-export commonly used types for convenience
pub use crate::core::{analyze, AnalysisResult, Finding, RiskLevel, ScopePolicy, Severity};

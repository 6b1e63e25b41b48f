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

//! src/core/mod.rs
//!
//! Core analysis logic
//!
//! Everything needed to turn script text and an optional scope policy into a
//! verdict:
//! - Value types for findings and verdicts
//! - The versioned rule catalog and the structural detectors
//! - Hostname extraction and scope policy enforcement
//! - The comment-aware line scanner and the result builder
//!
//! Nothing in this module performs I/O. File handling lives in `config`.

pub mod analyzer;
pub mod catalog;
pub mod detectors;
pub mod enforcer;
pub mod hostnames;
pub mod policy;
pub mod result;
pub mod scanner;
pub mod types;

pub use analyzer::analyze;
pub use catalog::{PatternRule, Veto, CATALOG_VERSION};
pub use policy::ScopePolicy;
pub use types::*;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests;

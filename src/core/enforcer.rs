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

//! Scope policy enforcement
//!
//! Whole-script checks driven by a [`ScopePolicy`]. Each enabled operation
//! family produces at most one document-level BLOCKED finding, however many
//! lines match. These checks overlap with the line scanner on purpose; a
//! broadcast ping is reported both on its line and as a policy violation.
//!
//! Findings come out in a fixed order: broadcast, subnet-wide, registry
//! write, service stop, then one DANGER finding per unapproved hostname in
//! sorted order.

use regex::Regex;
use std::sync::LazyLock;

use crate::core::catalog::compile_pattern;
use crate::core::detectors;
use crate::core::hostnames::extract_hostnames;
use crate::core::policy::ScopePolicy;
use crate::core::scanner::executable_lines;
use crate::core::types::{Finding, Severity};

static BROADCAST_COMMAND: LazyLock<Regex> = LazyLock::new(|| {
    compile_pattern(
        r"(?:\bnet(?:1)?\s+send\s+\*|\bmsg(?:\.exe)?\s+\*|\bEnableBroadcast\b|SocketOptionName\]::Broadcast\b|\bIPAddress\]::Broadcast\b)",
    )
});

static WILDCARD_TARGET: LazyLock<Regex> = LazyLock::new(|| {
    compile_pattern(
        r#"(?:-(?:ComputerName|Cn)\s*[:=]?\s*["']?\*|(?:^|[\s"'])\\\\\*|/node:\s*["']?\*|\bwinrs\b.*-r(?:emote)?:\s*\*)"#,
    )
});

static MACHINE_REGISTRY_WRITE: LazyLock<Regex> = LazyLock::new(|| {
    compile_pattern(
        r"(?:\breg(?:\.exe)?\s+(?:add|delete|copy|restore|load|unload)\s+.*\b(?:HKLM|HKEY_LOCAL_MACHINE)\b|\breg(?:\.exe)?\s+import\b|\bregedit(?:\.exe)?\s+/s\b|\b(?:Set-ItemProperty|sp|New-ItemProperty|Remove-ItemProperty|rp|New-Item|ni|Remove-Item|Set-Item|si)\b.*(?:HKLM:|Registry::HKEY_LOCAL_MACHINE))",
    )
});

static SERVICE_STOP: LazyLock<Regex> = LazyLock::new(|| {
    compile_pattern(
        r"(?:\bnet(?:1)?\s+stop\b|\bsc(?:\.exe)?\s+(?:\\\\\S+\s+)?(?:stop|pause|delete)\b|\b(?:Stop-Service|spsv|Suspend-Service|Remove-Service)\b|\bSet-Service\b.*-(?:StartupType\s*[:=]?\s*Disabled|Status\s*[:=]?\s*(?:Stopped|Paused))\b|\bsystemctl\s+(?:stop|disable|mask)\b|\bservice\s+\S+\s+stop\b)",
    )
});

fn find<'a>(pattern: &Regex, line: &'a str) -> Option<&'a str> {
    pattern.find(line).map(|m| m.as_str().trim())
}

fn broadcast_probe(line: &str) -> Option<&str> {
    detectors::broadcast_address(line)
        .or_else(|| detectors::range_sweep(line))
        .or_else(|| find(&BROADCAST_COMMAND, line))
}

fn subnet_probe(line: &str) -> Option<&str> {
    detectors::wildcard_octet(line)
        .or_else(|| detectors::cidr_block(line))
        .or_else(|| detectors::ip_range(line))
        .or_else(|| detectors::all_computers_query(line))
        .or_else(|| find(&WILDCARD_TARGET, line))
}

fn registry_probe(line: &str) -> Option<&str> {
    find(&MACHINE_REGISTRY_WRITE, line)
}

fn service_stop_probe(line: &str) -> Option<&str> {
    find(&SERVICE_STOP, line)
}

/// One policy toggle and the finding it raises
struct PolicyCheck {
    enabled: fn(&ScopePolicy) -> bool,
    probe: fn(&str) -> Option<&str>,
    description: &'static str,
    recommendation: &'static str,
}

const POLICY_CHECKS: &[PolicyCheck] = &[
    PolicyCheck {
        enabled: |p| p.block_broadcast_commands,
        probe: broadcast_probe,
        description: "Policy forbids broadcast commands",
        recommendation: "Remove broadcast addressing and target approved machines individually.",
    },
    PolicyCheck {
        enabled: |p| p.block_subnet_wide_operations,
        probe: subnet_probe,
        description: "Policy forbids subnet-wide operations",
        recommendation: "Replace subnet, range or wildcard targeting with the approved device list.",
    },
    PolicyCheck {
        enabled: |p| p.block_registry_writes,
        probe: registry_probe,
        description: "Policy forbids machine-wide registry writes",
        recommendation: "Deliver machine-wide registry settings through Group Policy instead.",
    },
    PolicyCheck {
        enabled: |p| p.block_service_stops,
        probe: service_stop_probe,
        description: "Policy forbids stopping services",
        recommendation: "Schedule service maintenance through the change process instead of a fleet script.",
    },
];

/// Description recorded for a hostname outside the approved set
pub fn scope_violation_description(hostname: &str) -> String {
    format!("Hostname '{hostname}' is not in the approved target list")
}

/// Findings produced by the policy checks for one script
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Enforcement {
    /// One BLOCKED finding per violated operation family
    pub policy_findings: Vec<Finding>,
    /// One DANGER finding per unapproved hostname
    pub scope_violations: Vec<Finding>,
}

impl Enforcement {
    pub fn is_empty(&self) -> bool {
        self.policy_findings.is_empty() && self.scope_violations.is_empty()
    }
}

/// Runs every enabled policy check against the executable lines of `script`
pub fn enforce(script: &str, policy: &ScopePolicy) -> Enforcement {
    let mut enforcement = Enforcement::default();

    for check in POLICY_CHECKS.iter().filter(|check| (check.enabled)(policy)) {
        let first_match = executable_lines(script).find_map(|(_, line)| (check.probe)(line));
        if let Some(matched) = first_match {
            enforcement.policy_findings.push(Finding::document(
                matched,
                Severity::Blocked,
                check.description,
                check.recommendation,
            ));
        }
    }

    if policy.enforce_hostname_whitelist {
        enforcement.scope_violations = extract_hostnames(script)
            .into_iter()
            .filter(|host| !policy.allows_hostname(host))
            .map(|host| {
                let description = scope_violation_description(&host);
                Finding::document(
                    host,
                    Severity::Danger,
                    description,
                    "Add the machine to the approved inventory or remove the reference.",
                )
            })
            .collect();
    }

    enforcement
}

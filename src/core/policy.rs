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

//! src/core/policy.rs
//!
//! Scope policy supplied by the deployment orchestrator
//!
//! The policy says which machines a script may touch and which families of
//! operation are forbidden outright. The analyzer only reads it. Fields the
//! analyzer never consults (`allowed_macs`, `max_device_count`,
//! `require_explicit_selection`) are carried so the orchestrator can gate
//! device selection with the same object.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Which machines and operations a script is allowed to reach
///
/// Every field is optional in serialised form. Missing fields take the
/// restrictive defaults of [`ScopePolicy::default`].
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct ScopePolicy {
    /// Approved machine names (compared case-insensitively)
    pub allowed_hostnames: BTreeSet<String>,
    /// Approved hardware addresses, `AA:BB:CC:DD:EE:FF`
    pub allowed_macs: BTreeSet<String>,
    /// Largest selection a single deployment may target, 0 = unlimited
    pub max_device_count: usize,
    /// Devices must be picked one by one, never "select all"
    pub require_explicit_selection: bool,
    pub block_broadcast_commands: bool,
    pub block_subnet_wide_operations: bool,
    /// Writes under HKEY_LOCAL_MACHINE
    pub block_registry_writes: bool,
    pub block_service_stops: bool,
    /// Cross-check every referenced hostname against `allowed_hostnames`
    pub enforce_hostname_whitelist: bool,
}

impl Default for ScopePolicy {
    fn default() -> Self {
        Self {
            allowed_hostnames: BTreeSet::new(),
            allowed_macs: BTreeSet::new(),
            max_device_count: 0,
            require_explicit_selection: true,
            block_broadcast_commands: true,
            block_subnet_wide_operations: true,
            block_registry_writes: true,
            block_service_stops: true,
            enforce_hostname_whitelist: true,
        }
    }
}

impl ScopePolicy {
    /// A policy with every check switched off
    ///
    /// Equivalent in effect to passing no policy, but still usable for
    /// selection gating through [`ScopePolicy::permits_selection`].
    pub fn permissive() -> Self {
        Self {
            require_explicit_selection: false,
            block_broadcast_commands: false,
            block_subnet_wide_operations: false,
            block_registry_writes: false,
            block_service_stops: false,
            enforce_hostname_whitelist: false,
            ..Self::default()
        }
    }

    /// Builder-style helper adding approved hostnames
    pub fn with_hostnames<I, S>(mut self, hostnames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.allowed_hostnames.extend(
            hostnames
                .into_iter()
                .map(|h| h.as_ref().trim().to_uppercase())
                .filter(|h| !h.is_empty()),
        );
        self
    }

    /// Case-insensitive membership in `allowed_hostnames`
    pub fn allows_hostname(&self, hostname: &str) -> bool {
        let hostname = hostname.trim();
        self.allowed_hostnames
            .iter()
            .any(|allowed| allowed.trim().eq_ignore_ascii_case(hostname))
    }

    /// Membership in `allowed_macs`, independent of case and separator style
    pub fn allows_mac(&self, mac: &str) -> bool {
        let Some(mac) = normalize_mac(mac) else {
            return false;
        };
        self.allowed_macs
            .iter()
            .any(|allowed| normalize_mac(allowed).as_deref() == Some(mac.as_str()))
    }

    /// Whether a device selection of `count` machines may proceed
    ///
    /// An empty selection never proceeds.
    pub fn permits_selection(&self, count: usize, explicit: bool) -> bool {
        if count == 0 {
            return false;
        }
        if self.require_explicit_selection && !explicit {
            return false;
        }
        self.max_device_count == 0 || count <= self.max_device_count
    }
}

/// Canonical `AA:BB:CC:DD:EE:FF` form of a MAC address
///
/// Accepts `:` or `-` separated pairs, Cisco-style `aabb.ccdd.eeff` and bare
/// hex. Returns `None` for anything that is not exactly six octets.
///
/// # Example
/// ```
/// use fleet_script_guard::core::policy::normalize_mac;
///
/// assert_eq!(normalize_mac("aa-bb-cc-dd-ee-0f").as_deref(), Some("AA:BB:CC:DD:EE:0F"));
/// assert_eq!(normalize_mac("not a mac"), None);
/// ```
pub fn normalize_mac(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let hex: String = raw.chars().filter(|c| !matches!(c, ':' | '-' | '.')).collect();
    if hex.len() != 12 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    // Separators, when present, must split the address into pairs or quads
    let groups: Vec<&str> = raw.split([':', '-', '.']).collect();
    if groups.len() > 1 {
        let width = groups[0].len();
        if !matches!((groups.len(), width), (6, 2) | (3, 4)) || groups.iter().any(|g| g.len() != width) {
            return None;
        }
    }

    let upper = hex.to_ascii_uppercase();
    let octets: Vec<&str> = (0..6).map(|i| &upper[i * 2..i * 2 + 2]).collect();
    Some(octets.join(":"))
}

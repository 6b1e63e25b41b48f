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

use crate::core::policy::{normalize_mac, ScopePolicy};

#[test]
fn test_default_policy_is_restrictive() {
    let policy = ScopePolicy::default();
    assert!(policy.block_broadcast_commands);
    assert!(policy.block_subnet_wide_operations);
    assert!(policy.block_registry_writes);
    assert!(policy.block_service_stops);
    assert!(policy.enforce_hostname_whitelist);
    assert!(policy.require_explicit_selection);
    assert_eq!(policy.max_device_count, 0);
    assert!(policy.allowed_hostnames.is_empty());
}

#[test]
fn test_permissive_policy_disables_every_check() {
    let policy = ScopePolicy::permissive();
    assert!(!policy.block_broadcast_commands);
    assert!(!policy.block_subnet_wide_operations);
    assert!(!policy.block_registry_writes);
    assert!(!policy.block_service_stops);
    assert!(!policy.enforce_hostname_whitelist);
    assert!(!policy.require_explicit_selection);
}

#[test]
fn test_hostname_matching_ignores_case() {
    let policy = ScopePolicy::default().with_hostnames(["pc01", " Web02 "]);
    assert!(policy.allowed_hostnames.contains("PC01"));
    assert!(policy.allowed_hostnames.contains("WEB02"));

    assert!(policy.allows_hostname("PC01"));
    assert!(policy.allows_hostname("pc01"));
    assert!(policy.allows_hostname("web02"));
    assert!(!policy.allows_hostname("PC02"));
}

#[test]
fn test_hostname_matching_with_unnormalised_allow_list() {
    let mut policy = ScopePolicy::default();
    policy.allowed_hostnames.insert("fs01".to_string());
    assert!(policy.allows_hostname("FS01"), "Caller-built lists may use any case");
}

#[test]
fn test_mac_normalisation() {
    let test_cases = vec![
        ("AA:BB:CC:DD:EE:FF", Some("AA:BB:CC:DD:EE:FF")),
        ("aa-bb-cc-dd-ee-ff", Some("AA:BB:CC:DD:EE:FF")),
        ("aabb.ccdd.eeff", Some("AA:BB:CC:DD:EE:FF")),
        ("AABBCCDDEEFF", Some("AA:BB:CC:DD:EE:FF")),
        ("  00:11:22:33:44:55  ", Some("00:11:22:33:44:55")),
        ("AA:BB:CC:DD:EE", None),
        ("AA:BB:CC:DD:EE:GG", None),
        ("AAB:BCC:DDE:EFF", None),
        ("", None),
    ];

    for (raw, expected) in test_cases {
        assert_eq!(normalize_mac(raw).as_deref(), expected, "MAC '{}'", raw);
    }
}

#[test]
fn test_mac_matching_ignores_format() {
    let mut policy = ScopePolicy::default();
    policy.allowed_macs.insert("AA:BB:CC:DD:EE:FF".to_string());

    assert!(policy.allows_mac("aa-bb-cc-dd-ee-ff"));
    assert!(policy.allows_mac("aabb.ccdd.eeff"));
    assert!(!policy.allows_mac("AA:BB:CC:DD:EE:00"));
    assert!(!policy.allows_mac("garbage"));
}

#[test]
fn test_selection_gating() {
    let policy = ScopePolicy::default();
    assert!(policy.permits_selection(5, true));
    assert!(!policy.permits_selection(5, false), "Select-all is refused by default");
    assert!(!policy.permits_selection(0, true), "Empty selection never proceeds");

    let capped = ScopePolicy {
        max_device_count: 3,
        require_explicit_selection: false,
        ..ScopePolicy::default()
    };
    assert!(capped.permits_selection(3, false));
    assert!(!capped.permits_selection(4, true), "Selection above the cap is refused");
}

#[test]
fn test_partial_toml_takes_defaults() {
    let policy: ScopePolicy = toml::from_str(
        r#"
        allowed_hostnames = ["PC01", "PC02"]
        block_service_stops = false
        "#,
    )
    .unwrap();

    assert_eq!(policy.allowed_hostnames.len(), 2);
    assert!(!policy.block_service_stops);
    assert!(policy.block_registry_writes, "Missing toggles default to enabled");
    assert!(policy.enforce_hostname_whitelist);
}

#[test]
fn test_policy_round_trips_through_json() {
    let policy = ScopePolicy::default().with_hostnames(["PC01"]);
    let json = serde_json::to_string(&policy).unwrap();
    let back: ScopePolicy = serde_json::from_str(&json).unwrap();
    assert_eq!(back, policy);
}

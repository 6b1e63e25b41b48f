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

//! Hostname reference extraction
//!
//! Pulls every machine name a script points at into a sorted, uppercase set.
//! The extractor never judges danger; it only feeds candidate identities to
//! the scope policy enforcer.
//!
//! Recognised constructs:
//! - Remote paths: `\\HOST\share`, `psexec \\A,B`, `shutdown /m \\HOST`
//! - Remote-execution parameters: `-ComputerName A,B`, `-ComputerName @("A","B")`,
//!   `-Cn`, `-Server`
//! - Management utility targets: `wmic /node:A,B`, `schtasks /s HOST`,
//!   `qwinsta /server:HOST`, `mstsc /v:HOST`, `winrs -r:HOST`
//! - Positional targets of remote-admin cmdlets: `Restart-Computer HOST`,
//!   `Enter-PSSession HOST`
//!
//! Comment lines are skipped with the same rules the line scanner uses.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

use crate::core::catalog::compile_pattern;
use crate::core::scanner::executable_lines;

/// `\\HOST`, only where a remote path can start (not inside `C:\\dir\\sub`)
///
/// psexec takes a comma list after one prefix: `\\PC01,PC02`.
static UNC_PATH: LazyLock<Regex> = LazyLock::new(|| {
    compile_pattern(r#"(?:^|[\s"'=(,;>|@])\\\\([a-z0-9][a-z0-9._-]*(?:,[a-z0-9][a-z0-9._-]*)*)"#)
});

/// `-ComputerName A,B`, also as a quoted array: `@("A","B")` or `("A","B")`
static COMPUTER_PARAMETER: LazyLock<Regex> = LazyLock::new(|| {
    compile_pattern(
        r#"(?:^|\s)-(?:ComputerName|Cn|Server|HostName|TargetHost)\b\s*[:=]?\s*(?:@?\(\s*["']|["']?)([a-z0-9][a-z0-9._-]*(?:["']?\s*,\s*["']?[a-z0-9][a-z0-9._-]*)*)"#,
    )
});

static NODE_SWITCH: LazyLock<Regex> = LazyLock::new(|| {
    compile_pattern(
        r#"/node:\s*["']?([a-z0-9][a-z0-9._-]*(?:["']?\s*,\s*["']?[a-z0-9][a-z0-9._-]*)*)"#,
    )
});

static SYSTEM_SWITCH: LazyLock<Regex> = LazyLock::new(|| {
    compile_pattern(
        r#"\b(?:schtasks|systeminfo|tasklist|taskkill|getmac|driverquery|gpresult|eventcreate|openfiles)(?:\.exe)?\b.*\s/s\s+["']?([a-z0-9][a-z0-9._-]*)"#,
    )
});

static SERVER_SWITCH: LazyLock<Regex> = LazyLock::new(|| {
    compile_pattern(r#"(?:^|\s)/(?:server|v|computer):\s*["']?([a-z0-9][a-z0-9._-]*)"#)
});

static WINRS_REMOTE: LazyLock<Regex> = LazyLock::new(|| {
    compile_pattern(r#"\bwinrs(?:\.exe)?\b.*\s-r(?:emote)?:\s*["']?(?:https?://)?([a-z0-9][a-z0-9._-]*)"#)
});

static POSITIONAL_TARGET: LazyLock<Regex> = LazyLock::new(|| {
    compile_pattern(
        r#"\b(?:Restart-Computer|Stop-Computer|Enter-PSSession|etsn|New-PSSession|nsn|Test-WSMan)\s+["']?([a-z0-9][a-z0-9._-]*)"#,
    )
});

/// Normalises one raw token, or rejects it
fn normalise(token: &str) -> Option<String> {
    let token = token
        .trim_matches(|c: char| c == '"' || c == '\'' || c.is_whitespace())
        .trim_end_matches('.');
    if token == "*" || token.chars().count() < 2 {
        return None;
    }
    Some(token.to_uppercase())
}

/// Adds every token captured by `pattern` on `line`, splitting comma lists
fn collect(pattern: &Regex, line: &str, hosts: &mut BTreeSet<String>) {
    for captures in pattern.captures_iter(line) {
        if let Some(list) = captures.get(1) {
            hosts.extend(list.as_str().split(',').filter_map(normalise));
        }
    }
}

/// Extracts the distinct machine names referenced by executable script lines
///
/// # Example
/// ```
/// use fleet_script_guard::core::hostnames::extract_hostnames;
///
/// let hosts = extract_hostnames(r"copy report.txt \\fs01\share");
/// assert!(hosts.contains("FS01"));
/// ```
pub fn extract_hostnames(script: &str) -> BTreeSet<String> {
    let patterns: [&Regex; 7] = [
        &UNC_PATH,
        &COMPUTER_PARAMETER,
        &NODE_SWITCH,
        &SYSTEM_SWITCH,
        &SERVER_SWITCH,
        &WINRS_REMOTE,
        &POSITIONAL_TARGET,
    ];

    let mut hosts = BTreeSet::new();
    for (_, line) in executable_lines(script) {
        for pattern in patterns {
            collect(pattern, line, &mut hosts);
        }
    }
    hosts
}

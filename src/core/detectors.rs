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

//! Structural targeting detectors
//!
//! Some dangerous targeting is not a fixed command name but a *shape*: an
//! address block, a wildcard octet, a numeric loop wrapped around an IP
//! prefix, or a directory query that selects every computer. These detectors
//! recognise those shapes one line at a time.
//!
//! # Subnet / range targeting
//! | Shape                         | Example                         | Severity |
//! |-------------------------------|---------------------------------|----------|
//! | Wildcard octet                | `10.0.0.*`                      | BLOCKED  |
//! | Broadcast address             | `10.0.0.255`                    | BLOCKED  |
//! | Range sweep (loop + IP)       | `1..254 \| % { ping 10.0.0.$_ }` | BLOCKED  |
//! | CIDR block                    | `10.0.0.0/24`                   | DANGER   |
//! | Explicit range                | `10.0.0.1-10.0.0.50`            | DANGER   |
//!
//! # Bulk directory queries
//! An unconstrained "all computers" query is DANGER on its own (the query
//! does not act yet). Piping its result into anything is an additional
//! WARNING; the catalog rules on the same line judge the piped action itself.
//!
//! The individual probes are public so the scope policy enforcer can reuse
//! exactly the same definitions for its whole-script checks.

use regex::Regex;
use std::sync::LazyLock;

use crate::core::catalog::compile_pattern;
use crate::core::types::{Finding, Severity};

static WILDCARD_OCTET: LazyLock<Regex> =
    LazyLock::new(|| compile_pattern(r"\b\d{1,3}\.(?:\d{1,3}|\*)\.(?:\d{1,3}|\*)\.\*"));

static BROADCAST_ADDRESS: LazyLock<Regex> =
    LazyLock::new(|| compile_pattern(r"\b\d{1,3}\.\d{1,3}\.\d{1,3}\.255\b"));

static CIDR_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| compile_pattern(r"\b\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}/\d{1,2}\b"));

static IP_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    compile_pattern(r"\b\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}\s*-\s*(?:\d{1,3}\.\d{1,3}\.\d{1,3}\.)?\d{1,3}\b")
});

/// Numeric range operators across the supported dialects:
/// PowerShell/bash `1..254`, batch `for /L %%i in (1,1,254)`, `seq 1 254`
static RANGE_OPERATOR: LazyLock<Regex> = LazyLock::new(|| {
    compile_pattern(r"(?:\b\d+\s*\.\.\s*\d+\b|\bfor\s+/l\s+%%?\w+\s+in\s*\(\s*-?\d+\s*,\s*-?\d+\s*,\s*-?\d+\s*\)|\bseq\s+\d+\s+\d+\b)")
});

/// The first three octets of an address, enough to anchor a sweep
static IP_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| compile_pattern(r"\b\d{1,3}\.\d{1,3}\.\d{1,3}\."));

static AD_COMPUTER_ALL: LazyLock<Regex> = LazyLock::new(|| {
    compile_pattern(r#"\bGet-ADComputer\b.*-Filter\s*(?:["'{(]\s*)?(?:\*|Name\s+-like\s+["']\*["'])"#)
});

static DSQUERY_COMPUTER: LazyLock<Regex> =
    LazyLock::new(|| compile_pattern(r"\bdsquery(?:\.exe)?\s+computer\b"));

/// A `-name` argument that starts with something other than `*`
static DSQUERY_NAMED: LazyLock<Regex> =
    LazyLock::new(|| compile_pattern(r#"\s-name\s+["']?[^\s"'*]"#));

static LDAP_COMPUTER_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    compile_pattern(r"\(\s*object(?:class|category)\s*=\s*computer\s*\)")
});

/// A further LDAP clause that narrows a computer-class filter
static LDAP_NAME_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    compile_pattern(r"\(\s*(?:name|cn|dnshostname|samaccountname|distinguishedname|operatingsystem)\s*=")
});

static PIPE_INTO_ACTION: LazyLock<Regex> = LazyLock::new(|| compile_pattern(r"\|\s*[^\s|][^|]*"));

fn find<'a>(pattern: &Regex, line: &'a str) -> Option<&'a str> {
    pattern.find(line).map(|m| m.as_str())
}

/// `a.b.c.*` or wider wildcard octets
pub fn wildcard_octet(line: &str) -> Option<&str> {
    find(&WILDCARD_OCTET, line)
}

/// `a.b.c.255`
pub fn broadcast_address(line: &str) -> Option<&str> {
    find(&BROADCAST_ADDRESS, line)
}

/// `a.b.c.d/nn`
pub fn cidr_block(line: &str) -> Option<&str> {
    find(&CIDR_BLOCK, line)
}

/// `a.b.c.d-a.b.c.e` or the short form `a.b.c.d-e`
pub fn ip_range(line: &str) -> Option<&str> {
    find(&IP_RANGE, line)
}

/// A numeric range operator on a line that also carries an IP prefix
///
/// Returns the range operator text.
pub fn range_sweep(line: &str) -> Option<&str> {
    let operator = find(&RANGE_OPERATOR, line)?;
    IP_PREFIX.is_match(line).then_some(operator)
}

/// A directory query that selects every computer object
///
/// Returns the span of the query that was recognised.
pub fn all_computers_query(line: &str) -> Option<&str> {
    if let Some(query) = find(&AD_COMPUTER_ALL, line) {
        return Some(query);
    }

    if let Some(query) = find(&DSQUERY_COMPUTER, line) {
        if !DSQUERY_NAMED.is_match(line) {
            return Some(query);
        }
    }

    let class_filter = find(&LDAP_COMPUTER_CLASS, line)?;
    (!LDAP_NAME_CLAUSE.is_match(line)).then_some(class_filter)
}

/// Subnet and range targeting findings for one line
///
/// At most one finding per shape, in severity order.
pub fn subnet_targeting(line_number: usize, line: &str) -> Vec<Finding> {
    let mut findings = Vec::new();

    if let Some(matched) = wildcard_octet(line) {
        findings.push(Finding::at_line(
            line_number,
            matched,
            Severity::Blocked,
            "Wildcard octet targets an entire subnet",
            "List the approved machines explicitly instead of a wildcard address.",
        ));
    }

    if let Some(matched) = broadcast_address(line) {
        findings.push(Finding::at_line(
            line_number,
            matched,
            Severity::Blocked,
            "Broadcast address targets every host on the subnet",
            "Address each approved machine individually.",
        ));
    }

    if let Some(matched) = range_sweep(line) {
        findings.push(Finding::at_line(
            line_number,
            matched,
            Severity::Blocked,
            "Numeric loop sweeps an IP address range",
            "Iterate over an approved inventory list rather than generated addresses.",
        ));
    }

    if let Some(matched) = cidr_block(line) {
        findings.push(Finding::at_line(
            line_number,
            matched,
            Severity::Danger,
            "CIDR notation targets an address block",
            "Confirm every address in the block is an approved target.",
        ));
    }

    if let Some(matched) = ip_range(line) {
        findings.push(Finding::at_line(
            line_number,
            matched,
            Severity::Danger,
            "Explicit IP range targets multiple hosts",
            "Confirm every address in the range is an approved target.",
        ));
    }

    findings
}

/// Wildcard and bulk-query targeting findings for one line
pub fn bulk_query_targeting(line_number: usize, line: &str) -> Vec<Finding> {
    let Some(query) = all_computers_query(line) else {
        return Vec::new();
    };

    let mut findings = vec![Finding::at_line(
        line_number,
        query,
        Severity::Danger,
        "Directory query selects all computers without a filter",
        "Constrain the query with -Filter, -SearchBase or an explicit name list.",
    )];

    // Only a pipe after the query counts; a pipe feeding into the query does not
    let tail = line
        .find(query)
        .map_or("", |start| &line[start + query.len()..]);
    if let Some(pipe) = find(&PIPE_INTO_ACTION, tail) {
        findings.push(Finding::at_line(
            line_number,
            pipe.trim(),
            Severity::Warning,
            "All-computers query result is piped into a further action",
            "Review the piped action. It will run against every computer in the directory.",
        ));
    }

    findings
}

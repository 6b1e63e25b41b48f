//! Policy files and analysis reports.
//!
//! Everything here touches the filesystem, so it lives outside `core`:
//!
//! - **Policy loading**: TOML scope policies with `~` expansion and
//!   normalised hostnames and MAC addresses
//! - **Reports**: colored text or JSON audit records, written atomically
//!
//! # Example
//!
//! ```no_run
//! use fleet_script_guard::config::load_policy;
//! use fleet_script_guard::analyze;
//!
//! let policy = load_policy("~/.config/fleet-script-guard/policy.toml")?;
//! let result = analyze("net stop Spooler", Some(&policy));
//! println!("{}", result.summary);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
pub mod report;

pub use error::{PolicyError, ReportError};

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::policy::{normalize_mac, ScopePolicy};

/// Expands a leading `~` to the user's home directory.
///
/// # Errors
///
/// Returns `PolicyError::InvalidPath` if the path is not valid UTF-8.
pub fn expand_path(path: impl AsRef<Path>) -> Result<PathBuf, PolicyError> {
    let path = path.as_ref();
    let raw = path
        .to_str()
        .ok_or_else(|| PolicyError::InvalidPath(path.to_path_buf()))?;
    Ok(PathBuf::from(shellexpand::tilde(raw).as_ref()))
}

/// Reads, parses and normalises a scope policy file.
///
/// # Errors
///
/// Returns `PolicyError::NotFound` if the file doesn't exist,
/// `PolicyError::Parse` for malformed TOML, and `PolicyError::InvalidMac` /
/// `PolicyError::InvalidHostname` for entries that cannot be normalised.
pub fn load_policy(path: impl AsRef<Path>) -> Result<ScopePolicy, PolicyError> {
    let path = expand_path(path)?;
    if !path.exists() {
        return Err(PolicyError::NotFound(path));
    }

    let content = fs::read_to_string(&path)?;
    let policy = parse_policy(&content)?;
    debug!(
        path = %path.display(),
        hostnames = policy.allowed_hostnames.len(),
        macs = policy.allowed_macs.len(),
        "loaded scope policy"
    );
    Ok(policy)
}

/// Parses and normalises a scope policy from TOML text.
///
/// Missing fields take the restrictive defaults of [`ScopePolicy::default`].
pub fn parse_policy(content: &str) -> Result<ScopePolicy, PolicyError> {
    let policy: ScopePolicy = toml::from_str(content)?;
    normalise_policy(policy)
}

/// Uppercases hostnames and rewrites MAC addresses to `AA:BB:CC:DD:EE:FF`.
pub fn normalise_policy(mut policy: ScopePolicy) -> Result<ScopePolicy, PolicyError> {
    policy.allowed_hostnames = policy
        .allowed_hostnames
        .iter()
        .map(|raw| {
            let host = raw.trim();
            if host.is_empty() || host.contains(char::is_whitespace) {
                return Err(PolicyError::InvalidHostname(raw.clone()));
            }
            Ok(host.to_uppercase())
        })
        .collect::<Result<BTreeSet<_>, _>>()?;

    policy.allowed_macs = policy
        .allowed_macs
        .iter()
        .map(|raw| normalize_mac(raw).ok_or_else(|| PolicyError::InvalidMac(raw.clone())))
        .collect::<Result<BTreeSet<_>, _>>()?;

    Ok(policy)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests;

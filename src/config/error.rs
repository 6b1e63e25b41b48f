use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading a scope policy file.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// Policy file does not exist.
    #[error("Policy file not found: {0}")]
    NotFound(PathBuf),
    /// Path could not be expanded (non-UTF-8 path).
    #[error("Invalid policy path: {0}")]
    InvalidPath(PathBuf),
    /// Policy file is not valid TOML or has the wrong shape.
    #[error("Malformed policy file: {0}")]
    Parse(#[from] toml::de::Error),
    /// An allowed MAC address is not six hexadecimal octets.
    #[error("Invalid MAC address in policy: {0}")]
    InvalidMac(String),
    /// An allowed hostname is empty or contains whitespace.
    #[error("Invalid hostname in policy: {0:?}")]
    InvalidHostname(String),
    /// Generic I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while producing an analysis report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Report could not be serialised.
    #[error("Failed to serialise report: {0}")]
    Serialise(#[from] serde_json::Error),
    /// Atomic write operation failed.
    #[error("Atomic write failed: {0}")]
    WriteFailed(String),
}

//! CLI entry point for fleet-script-guard
//!
//! Provides a command-line interface for checking scripts before a fleet
//! deployment and for auditing the rule catalog.
//!
//! Exit codes of `check`:
//! - `0` safe, no DANGER findings
//! - `1` blocked
//! - `2` safe, but DANGER findings require an explicit human override
//! - `3` usage or I/O failure

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use fleet_script_guard::config::report::{render_json, render_text, write_report, AuditRecord};
use fleet_script_guard::config::{expand_path, load_policy};
use fleet_script_guard::core::catalog::{rules, Veto, CATALOG_VERSION};
use fleet_script_guard::{analyze, ScopePolicy, Severity};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, warn};

const EXIT_SAFE: u8 = 0;
const EXIT_BLOCKED: u8 = 1;
const EXIT_OVERRIDE: u8 = 2;
const EXIT_FAILURE: u8 = 3;

#[derive(Parser)]
#[command(name = "fleet-script-guard")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a script and report whether it may be deployed
    Check {
        /// Script to analyze, or `-` for stdin
        script: PathBuf,

        /// Scope policy file (TOML)
        #[arg(short, long)]
        policy: Option<PathBuf>,

        /// Additional approved hostname (repeatable)
        #[arg(long = "allow-host", value_name = "NAME")]
        allow_host: Vec<String>,

        /// Report format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the rule catalog
    Rules {
        /// Only list one tier
        #[arg(short, long, value_enum)]
        tier: Option<Tier>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum Tier {
    Blocked,
    Danger,
    Warning,
}

impl From<Tier> for Severity {
    fn from(tier: Tier) -> Self {
        match tier {
            Tier::Blocked => Severity::Blocked,
            Tier::Danger => Severity::Danger,
            Tier::Warning => Severity::Warning,
        }
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(EXIT_FAILURE)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    init_logging(cli.verbose, cli.log_json);

    let outcome = match cli.command {
        Commands::Check {
            script,
            policy,
            allow_host,
            format,
            output,
        } => check_script(&script, policy.as_deref(), &allow_host, format, output.as_deref()),
        Commands::Rules { tier } => list_rules(tier.map(Severity::from)).map(|()| EXIT_SAFE),
    };

    match outcome {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("{} {:#}", "✗".red().bold(), e);
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

/// Initialise tracing on stderr so stdout stays machine-readable.
fn init_logging(verbose: bool, json: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let registry = tracing_subscriber::registry().with(filter);
    let _ = if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };
}

fn read_script(script: &Path) -> anyhow::Result<String> {
    if script == Path::new("-") {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .context("Failed to read script from stdin")?;
        return Ok(content);
    }

    let path = expand_path(script)?;
    fs::read_to_string(&path).with_context(|| format!("Failed to read script: {}", path.display()))
}

/// Loads the policy, degrading to catalog-only analysis if the file is unusable
fn resolve_policy(policy_path: Option<&Path>, allow_host: &[String]) -> Option<ScopePolicy> {
    let base = match policy_path {
        Some(path) => match load_policy(path) {
            Ok(policy) => policy,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "policy not applied");
                eprintln!(
                    "{} Policy not applied ({}). Falling back to catalog-only analysis.",
                    "⚠".yellow(),
                    e
                );
                return None;
            }
        },
        None if allow_host.is_empty() => return None,
        None => ScopePolicy::default(),
    };

    Some(base.with_hostnames(allow_host))
}

/// Analyze one script and report the verdict
fn check_script(
    script: &Path,
    policy_path: Option<&Path>,
    allow_host: &[String],
    format: OutputFormat,
    output: Option<&Path>,
) -> anyhow::Result<u8> {
    let content = read_script(script)?;
    let policy = resolve_policy(policy_path, allow_host);
    let result = analyze(&content, policy.as_ref());

    let script_name = script.display().to_string();
    let report = match format {
        OutputFormat::Text => render_text(&script_name, &result),
        OutputFormat::Json => {
            let record = AuditRecord::new(&script_name, policy.is_some(), result.clone());
            render_json(&record).context("Failed to render JSON report")?
        }
    };

    match output {
        Some(path) => {
            let path = expand_path(path)?;
            write_report(&path, &report)
                .with_context(|| format!("Failed to write report: {}", path.display()))?;
            eprintln!("{} Report written to {}", "✓".green(), path.display());
        }
        None => print!("{}", report),
    }

    let code = if !result.is_safe {
        EXIT_BLOCKED
    } else if result.requires_override() {
        EXIT_OVERRIDE
    } else {
        EXIT_SAFE
    };
    debug!(code, "check finished");
    Ok(code)
}

/// List the catalog rules, optionally restricted to one tier
fn list_rules(tier: Option<Severity>) -> anyhow::Result<()> {
    let tiers = match tier {
        Some(tier) => vec![tier],
        None => vec![Severity::Blocked, Severity::Danger, Severity::Warning],
    };

    println!("{}", format!("Rule catalog {}\n", CATALOG_VERSION).bold());

    for tier in tiers {
        let tier_rules = rules(tier);
        println!("{} ({} rules)", format!("{}", tier).magenta().bold(), tier_rules.len());

        for rule in tier_rules {
            println!("  {} {}", "•".cyan(), rule.description().bold());
            println!("    {} {}", "fix:".dimmed(), rule.recommendation());
            println!("    {} {}", "pattern:".dimmed(), rule.source());
            if let (Some(unless), Some(scope)) = (rule.unless_source(), rule.veto_scope()) {
                let label = match scope {
                    Veto::Line => "unless (line):",
                    Veto::Command => "unless (command):",
                };
                println!("    {} {}", label.dimmed(), unless);
            }
        }
        println!();
    }

    Ok(())
}

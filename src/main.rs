//! Kafaa PACE - Operational Excellence assessment CLI
//!
//! Loads a template bundle and an assessment session, runs the PACE engine
//! and prints (or writes) the report.
//!
//! # Usage
//!
//! ```bash
//! # Text action plan for a session, embedded templates
//! kafaa-pace run --session client.toml --format text
//!
//! # JSON report with a site-specific bundle
//! kafaa-pace run --session client.toml --config pace_templates.toml --output report.json
//!
//! # Check a bundle before handing it out
//! kafaa-pace validate --config pace_templates.toml
//! ```
//!
//! # Environment Variables
//!
//! - `PACE_CONFIG`: Path to a template bundle (used when `--config` is absent)
//! - `RUST_LOG`: Logging level (default: info). Logs go to stderr.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use kafaa_pace::config::defaults::MAX_PER_STAGE_LIMIT;
use kafaa_pace::{run_assessment, AssessmentSession, PaceConfig, ReportFormat};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "kafaa-pace")]
#[command(about = "Kafaa PACE operational excellence prioritization")]
#[command(version)]
struct CliArgs {
    #[command(subcommand)]
    command: SubCommand,
}

#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// Run an assessment session and produce the report
    Run {
        /// Path to the assessment session TOML file
        #[arg(long)]
        session: PathBuf,

        /// Template bundle (default: $PACE_CONFIG, ./pace_templates.toml, embedded)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Report format: json or text
        #[arg(long, default_value = "json")]
        format: ReportFormat,

        /// Write the report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Override the session's per-stage action cap (1-5)
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=MAX_PER_STAGE_LIMIT as i64))]
        max_per_stage: Option<u8>,

        /// Use only profile-specific countermeasures
        #[arg(long)]
        no_generic: bool,
    },

    /// Load and validate a template bundle
    Validate {
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List the configured value-chain stages
    Stages {
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

// ============================================================================
// Commands
// ============================================================================

/// An explicit path must load cleanly; otherwise use the standard search order.
fn load_config(path: Option<&Path>) -> Result<PaceConfig> {
    match path {
        Some(p) => PaceConfig::load_from_file(p)
            .with_context(|| format!("Failed to load template bundle {}", p.display())),
        None => Ok(PaceConfig::load()),
    }
}

fn run_session(
    session_path: &Path,
    config_path: Option<&Path>,
    format: ReportFormat,
    output: Option<&Path>,
    max_per_stage: Option<u8>,
    no_generic: bool,
) -> Result<()> {
    let config = load_config(config_path)?;
    let mut session = AssessmentSession::load_from_file(session_path, &config)
        .with_context(|| format!("Failed to load session {}", session_path.display()))?;

    if let Some(cap) = max_per_stage {
        session.max_per_stage = usize::from(cap);
    }
    if no_generic {
        session.include_generic = false;
    }

    let report = run_assessment(&config, &session);

    match output {
        Some(path) => {
            report.export(path, format)?;
            info!(path = %path.display(), "Report written");
        }
        None => println!("{}", report.render(format)?),
    }
    Ok(())
}

fn validate_bundle(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let prio = &config.prioritization;
    let generic: usize = config.countermeasures.values().map(Vec::len).sum();
    let specific: usize = config
        .countermeasures_profiles
        .values()
        .flat_map(|lib| lib.values())
        .map(Vec::len)
        .sum();

    println!("Template bundle OK");
    println!("  currency:        {}", config.currency());
    println!("  stages:          {}", config.value_chain.stages.len());
    println!("  objectives:      {}", prio.critical_objectives.len());
    println!("  edge metrics:    {}", prio.edge_metrics.len());
    println!(
        "  profiles:        {}",
        config.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    );
    println!("  countermeasures: {generic} generic, {specific} profile-specific");
    Ok(())
}

fn list_stages(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    for (i, stage) in config.value_chain.stages.iter().enumerate() {
        println!("{:>2}. {stage}", i + 1);
    }
    Ok(())
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() {
    // Initialize logging (stderr, so stdout stays machine readable)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();

    let result = match &args.command {
        SubCommand::Run {
            session,
            config,
            format,
            output,
            max_per_stage,
            no_generic,
        } => run_session(
            session,
            config.as_deref(),
            *format,
            output.as_deref(),
            *max_per_stage,
            *no_generic,
        ),
        SubCommand::Validate { config } => validate_bundle(config.as_deref()),
        SubCommand::Stages { config } => list_stages(config.as_deref()),
    };

    if let Err(e) = result {
        error!("{e:#}");
        std::process::exit(1);
    }
}

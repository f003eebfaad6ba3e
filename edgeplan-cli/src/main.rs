//! edgeplan: plan edge worker deployments without stealing routes.
//!
//! # Usage
//!
//! ```text
//! edgeplan plan <bundle> [--config <file>] [--account-id <id>] [--dry-run]
//! edgeplan diff <bundle> [--config <file>] [--account-id <id>]
//! edgeplan routes <bundle> [--config <file>] [--account-id <id>] [--json]
//! edgeplan check <theirs> <ours>
//! ```
//!
//! Log output goes to stderr; `-v` for info, `-vv` for debug, or `RUST_LOG`.

mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use commands::{check::CheckArgs, diff::DiffArgs, plan::PlanArgs, routes::RoutesArgs};
use edgeplan_sync::RunOptions;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "edgeplan",
    version,
    about = "Resolve route overlaps between new and existing edge workers",
    long_about = None,
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve routes, write deployment plans, and update existing workers.
    Plan(PlanArgs),

    /// Show unified diffs of what `plan` would write.
    Diff(DiffArgs),

    /// Show how every new worker's routes resolve, without writing.
    Routes(RoutesArgs),

    /// Classify how two route patterns relate.
    Check(CheckArgs),
}

// ---------------------------------------------------------------------------
// Shared run inputs
// ---------------------------------------------------------------------------

/// Bundle and config selection shared by `plan`, `diff`, and `routes`.
#[derive(Args, Debug)]
pub struct InputArgs {
    /// Directory of the unpacked edge bundle (contains `journeys.yaml`).
    pub bundle: PathBuf,

    /// Config file (default: ./edgeplan.yaml, then ~/.edgeplan/config.yaml).
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Account id for environments whose config does not set one.
    #[arg(long, short = 'a')]
    pub account_id: Option<String>,
}

impl InputArgs {
    pub fn options(&self, dry_run: bool) -> Result<RunOptions> {
        let config_path = edgeplan_manifest::locate(self.config.as_deref())
            .context("could not find an edgeplan config")?;
        info!("using config {}", config_path.display());
        Ok(RunOptions {
            config_path,
            bundle: self.bundle.clone(),
            account_id: self.account_id.clone(),
            dry_run,
        })
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::Plan(args) => args.run(),
        Commands::Diff(args) => args.run(),
        Commands::Routes(args) => args.run(),
        Commands::Check(args) => args.run(),
    }
}

//! `edgeplan plan <bundle>`: resolve, write plans, update existing workers.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use edgeplan_sync::{run, DeployInstruction, RunReport, WriteResult};

use crate::InputArgs;

/// Arguments for `edgeplan plan`.
#[derive(Args, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Show what would be written without actually writing any files.
    #[arg(long)]
    pub dry_run: bool,
}

impl PlanArgs {
    pub fn run(self) -> Result<()> {
        let options = self.input.options(self.dry_run)?;
        let report = run(&options)
            .with_context(|| format!("plan failed for bundle {}", options.bundle.display()))?;
        print_report(&report, self.dry_run);
        Ok(())
    }
}

fn print_report(report: &RunReport, dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };

    let changed = report
        .plan_writes
        .iter()
        .filter(|r| !matches!(r, WriteResult::Unchanged { .. }))
        .count();
    println!(
        "{prefix}✓ {} worker plan(s) ({} written, {} unchanged)",
        report.plan_writes.len(),
        changed,
        report.plan_writes.len() - changed
    );
    for r in &report.plan_writes {
        match r {
            WriteResult::Written { path } => println!("  ✎  {}", path.display()),
            WriteResult::WouldWrite { path } => println!("  ~  {}", path.display()),
            WriteResult::Unchanged { path } => println!("  ·  {}", path.display()),
        }
    }

    if !report.existing_writes.is_empty() {
        println!("{prefix}existing workers:");
        for w in &report.existing_writes {
            match w {
                WriteResult::Written { path } => println!("  ✎  {}", path.display()),
                WriteResult::WouldWrite { path } => println!("  ~  {}", path.display()),
                WriteResult::Unchanged { path } => println!("  ·  {}", path.display()),
            }
        }
    }

    print_instructions(&report.instructions);
}

fn print_instructions(instructions: &[DeployInstruction]) {
    let mut current = None;
    for instruction in instructions {
        if current != Some(&instruction.environment) {
            println!();
            println!(
                "{}",
                format!("Deployment instructions for environment: {}", instruction.environment)
                    .bold()
                    .underline()
            );
            current = Some(&instruction.environment);
        }
        println!("{}", instruction.command().green());
    }
}

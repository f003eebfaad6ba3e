//! `edgeplan routes <bundle>`: resolution outcomes, nothing written.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use edgeplan_sync::{resolve_run, ResolvedWorker};

use crate::InputArgs;

/// Arguments for `edgeplan routes`.
#[derive(Args, Debug)]
pub struct RoutesArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct RouteRowJson {
    target: String,
    worker: String,
    environment: String,
    routes: Vec<String>,
    upstream: Option<String>,
}

#[derive(Tabled)]
struct RouteTableRow {
    #[tabled(rename = "target")]
    target: String,
    #[tabled(rename = "worker")]
    worker: String,
    #[tabled(rename = "environment")]
    environment: String,
    #[tabled(rename = "routes")]
    routes: String,
    #[tabled(rename = "upstream")]
    upstream: String,
}

impl RoutesArgs {
    pub fn run(self) -> Result<()> {
        let options = self.input.options(true)?;
        let resolved = resolve_run(&options)
            .with_context(|| format!("resolution failed for bundle {}", options.bundle.display()))?;

        let rows = rows(&resolved.workers);
        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&rows).context("failed to serialize routes JSON")?
            );
            return Ok(());
        }

        if rows.is_empty() {
            println!("No workers in bundle.");
            return Ok(());
        }
        let table_rows: Vec<RouteTableRow> = rows
            .into_iter()
            .map(|row| RouteTableRow {
                target: row.target,
                worker: row.worker,
                environment: row.environment,
                routes: row.routes.join("\n"),
                upstream: row.upstream.unwrap_or_else(|| "-".to_string()),
            })
            .collect();
        let mut table = Table::new(table_rows);
        table.with(Style::rounded());
        println!("{table}");
        Ok(())
    }
}

fn rows(workers: &[ResolvedWorker]) -> Vec<RouteRowJson> {
    workers
        .iter()
        .flat_map(|worker| {
            worker.outcomes.iter().map(move |(env, outcome)| RouteRowJson {
                target: worker.target.clone(),
                worker: worker.worker.to_string(),
                environment: env.to_string(),
                routes: outcome.routes().iter().map(ToString::to_string).collect(),
                upstream: outcome.upstream().map(ToString::to_string),
            })
        })
        .collect()
}

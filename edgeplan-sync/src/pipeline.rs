//! End-to-end run: config + bundle + existing workers → plans and writeback.
//!
//! ```text
//! resolve_run   load config, registry, bundle; build claims; resolve all
//! run           resolve_run, then write plans, then write back existing workers
//! ```
//!
//! Nothing is written until every claim has resolved, so a routing conflict
//! leaves the filesystem untouched.

use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::{debug, info};

use edgeplan_core::persist::write_if_changed;
use edgeplan_core::registry;
use edgeplan_core::{resolver, EnvName, Registry, ResolutionOutcome, UnitName, WriteResult};
use edgeplan_manifest::{build_claims, load_bundle, load_config, Environment};

use crate::error::{io_err, SyncError};
use crate::plan::{worker_dir, DeploymentPlan, PLAN_FILE_NAME};

/// Inputs of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Config file, already located.
    pub config_path: PathBuf,
    /// Root of the unpacked bundle.
    pub bundle: PathBuf,
    /// Fallback for environments whose config has no `account_id`.
    pub account_id: Option<String>,
    pub dry_run: bool,
}

/// One new worker after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedWorker {
    pub target: String,
    /// `<bundle>/<target>/<worker>`.
    pub dir: PathBuf,
    pub worker: UnitName,
    pub outcomes: BTreeMap<EnvName, ResolutionOutcome>,
    pub plan: DeploymentPlan,
}

impl ResolvedWorker {
    pub fn plan_path(&self) -> PathBuf {
        self.dir.join(PLAN_FILE_NAME)
    }
}

/// Everything resolved in memory, before any write.
#[derive(Debug, Clone)]
pub struct ResolvedRun {
    /// Directory of the config file; existing worker globs are relative to it.
    pub base_dir: PathBuf,
    pub environments: Vec<Environment>,
    pub registry: Registry,
    pub workers: Vec<ResolvedWorker>,
}

/// A shell command that deploys one worker to one environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployInstruction {
    pub environment: EnvName,
    pub worker: UnitName,
    pub dir: PathBuf,
}

impl DeployInstruction {
    pub fn command(&self) -> String {
        format!(
            "cd {} && wrangler deploy -e {}",
            self.dir.display(),
            self.environment
        )
    }
}

/// Result of [`run`].
#[derive(Debug, Clone)]
pub struct RunReport {
    pub workers: Vec<ResolvedWorker>,
    pub plan_writes: Vec<WriteResult>,
    pub existing_writes: Vec<WriteResult>,
    /// Grouped by environment, in environment order.
    pub instructions: Vec<DeployInstruction>,
}

/// Load inputs and resolve every claim without writing anything.
///
/// Targets, workers and environments are visited in sorted order. The first
/// routing conflict aborts.
pub fn resolve_run(options: &RunOptions) -> Result<ResolvedRun, SyncError> {
    let loaded = load_config(&options.config_path)?;
    let environments = loaded.environments(options.account_id.as_deref())?;
    let mut registry = registry::load_at(loaded.base_dir(), &loaded.config.existing_workers)?;
    info!(
        "loaded {} existing worker(s) from {}",
        registry.units().len(),
        loaded.path.display()
    );

    let bundle = load_bundle(&options.bundle)?;
    let env_names: Vec<EnvName> = environments.iter().map(|e| e.name.clone()).collect();

    let mut workers = Vec::new();
    for target in &bundle.targets {
        for (worker, claim) in build_claims(target, &environments) {
            debug!(target = %target.name, %worker, "resolving");
            let outcomes = resolver::resolve_unit(&claim, &env_names, &mut registry)?;
            let plan = DeploymentPlan::build(target, &worker, &outcomes, &environments);
            workers.push(ResolvedWorker {
                target: target.name.clone(),
                dir: worker_dir(&target.dir, &worker),
                worker,
                outcomes,
                plan,
            });
        }
    }

    Ok(ResolvedRun {
        base_dir: loaded.base_dir().to_path_buf(),
        environments,
        registry,
        workers,
    })
}

/// Resolve, then write every plan file and write back changed existing workers.
pub fn run(options: &RunOptions) -> Result<RunReport, SyncError> {
    let resolved = resolve_run(options)?;

    let mut plan_writes = Vec::with_capacity(resolved.workers.len());
    for worker in &resolved.workers {
        let json = worker.plan.to_json()?;
        let path = worker.plan_path();
        let result =
            write_if_changed(&path, &json, options.dry_run).map_err(|e| io_err(&path, e))?;
        plan_writes.push(result);
    }

    let existing_writes = registry::writeback(&resolved.registry, options.dry_run)?;
    let instructions = deploy_instructions(&resolved.environments, &resolved.workers);

    Ok(RunReport {
        workers: resolved.workers,
        plan_writes,
        existing_writes,
        instructions,
    })
}

/// One instruction per (environment, worker) where the worker has routes.
pub fn deploy_instructions(
    environments: &[Environment],
    workers: &[ResolvedWorker],
) -> Vec<DeployInstruction> {
    let mut out = Vec::new();
    for env in environments {
        for worker in workers {
            let has_routes = worker
                .outcomes
                .get(&env.name)
                .is_some_and(|o| !o.routes().is_empty());
            if has_routes {
                out.push(DeployInstruction {
                    environment: env.name.clone(),
                    worker: worker.worker.clone(),
                    dir: worker.dir.clone(),
                });
            }
        }
    }
    out
}

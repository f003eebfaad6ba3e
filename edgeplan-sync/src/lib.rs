//! # edgeplan-sync
//!
//! Runs a whole deployment: resolve every new worker of a bundle against the
//! existing workers, write one deployment plan per worker, and write back the
//! existing workers that gave routes up.
//!
//! Call [`run`] for a real (or `dry_run`) pass, [`resolve_run`] to inspect
//! outcomes without writing, or [`diff_run`] for unified diffs.

pub mod diff;
pub mod error;
pub mod pipeline;
pub mod plan;

pub use diff::{diff_run, DiffKind, FileDiff};
pub use error::SyncError;
pub use pipeline::{
    deploy_instructions, resolve_run, run, DeployInstruction, ResolvedRun, ResolvedWorker,
    RunOptions, RunReport,
};
pub use plan::{DeploymentPlan, EnvironmentPlan, KvBinding, ServiceBinding, UPSTREAM_BINDING};
pub use edgeplan_core::WriteResult;

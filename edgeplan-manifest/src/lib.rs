//! # edgeplan-manifest
//!
//! Inputs of an edgeplan run: the `edgeplan.yaml` config (environments,
//! host aliases, existing worker globs) and an unpacked edge bundle
//! (`journeys.yaml` plus per-target `workers.json`), turned into one
//! [`NewUnitRouteClaim`](edgeplan_core::NewUnitRouteClaim) per new worker.

pub mod bundle;
pub mod claims;
pub mod config;
pub mod error;

pub use bundle::{load_bundle, Bundle, BundleTarget, WorkerRoute};
pub use claims::{build_claims, expand_aliases};
pub use config::{load_config, locate, locate_at, EdgeplanConfig, Environment, HostAlias, LoadedConfig};
pub use error::ManifestError;

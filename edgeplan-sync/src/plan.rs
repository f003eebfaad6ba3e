//! Per-worker deployment plan: the descriptor a new worker is deployed from.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use edgeplan_core::{EnvName, ResolutionOutcome, RoutePattern, UnitName};
use edgeplan_manifest::{BundleTarget, Environment};

use crate::error::SyncError;

/// Service binding name through which a delegating worker reaches its upstream.
pub const UPSTREAM_BINDING: &str = "UPSTREAM_SERVICE";

/// File name of the plan inside `<target>/<worker>/`.
pub const PLAN_FILE_NAME: &str = "deployment.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KvBinding {
    pub binding: String,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceBinding {
    pub binding: String,
    pub service: UnitName,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentPlan {
    pub account_id: String,
    pub routes: Vec<RoutePattern>,
    pub kv_namespaces: Vec<KvBinding>,
    /// Empty for a direct claim.
    pub services: Vec<ServiceBinding>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentPlan {
    pub worker: UnitName,
    pub target: String,
    pub logpush: bool,
    pub environments: BTreeMap<EnvName, EnvironmentPlan>,
}

impl DeploymentPlan {
    /// Assemble the plan for `worker` from its resolved outcomes.
    ///
    /// Environments without an outcome are left out.
    pub fn build(
        target: &BundleTarget,
        worker: &UnitName,
        outcomes: &BTreeMap<EnvName, ResolutionOutcome>,
        environments: &[Environment],
    ) -> Self {
        let environments = environments
            .iter()
            .filter_map(|env| {
                let outcome = outcomes.get(&env.name)?;
                let services = outcome
                    .upstream()
                    .map(|upstream| ServiceBinding {
                        binding: UPSTREAM_BINDING.to_string(),
                        service: upstream.clone(),
                    })
                    .into_iter()
                    .collect();
                let kv_namespaces = env
                    .kv
                    .iter()
                    .map(|(binding, id)| KvBinding {
                        binding: binding.clone(),
                        id: id.clone(),
                    })
                    .collect();
                Some((
                    env.name.clone(),
                    EnvironmentPlan {
                        account_id: env.account_id.clone(),
                        routes: outcome.routes().to_vec(),
                        kv_namespaces,
                        services,
                    },
                ))
            })
            .collect();

        Self {
            worker: worker.clone(),
            target: target.name.clone(),
            logpush: target.logpush,
            environments,
        }
    }

    /// Pretty JSON with a trailing newline.
    pub fn to_json(&self) -> Result<String, SyncError> {
        let mut out = serde_json::to_string_pretty(self)?;
        out.push('\n');
        Ok(out)
    }
}

/// Directory a worker's outputs live in, and where it is deployed from.
pub fn worker_dir(target_dir: &Path, worker: &UnitName) -> PathBuf {
    target_dir.join(&worker.0)
}

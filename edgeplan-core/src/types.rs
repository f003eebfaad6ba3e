//! Domain types for route overlap resolution.
//!
//! Persisted worker files (`wrangler.toml` style) are modelled by
//! [`WorkerConfig`]; everything this crate does not understand is kept in the
//! flattened `extra` tables so a writeback never drops foreign keys.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A traffic-matching rule, e.g. `api.example.com/*` or `*example.com/v1*`.
///
/// Patterns are only ever compared pairwise; see [`crate::matcher`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoutePattern(pub String);

impl RoutePattern {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for RoutePattern {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RoutePattern {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Name of a deployed (or to-be-deployed) unit; the delegation target.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnitName(pub String);

impl fmt::Display for UnitName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for UnitName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for UnitName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Name of a deployment environment (`staging`, `production`, ...).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EnvName(pub String);

impl EnvName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EnvName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for EnvName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EnvName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Persisted worker configuration
// ---------------------------------------------------------------------------

/// Route state of one existing worker in one environment (`[env.<name>]`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentRouteState {
    /// Routes currently claimed in this environment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routes: Option<Vec<RoutePattern>>,
    /// Full route set before any pruning. Present only once `routes` has
    /// been pruned; always a superset of `routes`.
    #[serde(
        rename = "edgeplan_original_routes",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub preserved_routes: Option<Vec<RoutePattern>>,
    #[serde(flatten)]
    pub extra: toml::Table,
}

/// A previously deployed worker as persisted on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerConfig {
    pub name: UnitName,
    /// Routes not scoped to any environment; used when an environment has
    /// no `routes` of its own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routes: Option<Vec<RoutePattern>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, EnvironmentRouteState>,
    #[serde(flatten)]
    pub extra: toml::Table,
}

impl WorkerConfig {
    /// Move every `preserved_routes` back into `routes`. Returns `true` if
    /// anything was restored.
    ///
    /// Each run starts from the full original route set; resolution prunes
    /// again only what this run proves is claimed elsewhere.
    fn restore(&mut self) -> bool {
        let mut restored = false;
        for state in self.env.values_mut() {
            if let Some(original) = state.preserved_routes.take() {
                state.routes = Some(original);
                restored = true;
            }
        }
        restored
    }
}

// ---------------------------------------------------------------------------
// ExistingUnit
// ---------------------------------------------------------------------------

/// One existing worker: its working state plus the post-restore snapshot
/// used to decide whether writeback is needed.
#[derive(Debug, Clone)]
pub struct ExistingUnit {
    source: PathBuf,
    config: WorkerConfig,
    snapshot: WorkerConfig,
    restored: bool,
}

impl ExistingUnit {
    /// Build a unit from freshly parsed state: restore first, then snapshot.
    pub fn new(source: impl Into<PathBuf>, mut config: WorkerConfig) -> Self {
        let restored = config.restore();
        let snapshot = config.clone();
        Self {
            source: source.into(),
            config,
            snapshot,
            restored,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn name(&self) -> &UnitName {
        &self.config.name
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// `true` when the working state differs from the load snapshot.
    pub fn is_modified(&self) -> bool {
        self.config != self.snapshot
    }

    /// `true` when load moved preserved routes back into `routes`, so the
    /// file on disk still holds a pruned list.
    pub fn was_restored(&self) -> bool {
        self.restored
    }

    /// Whether the file must be considered for writeback: either this run
    /// changed the unit, or it reverted a previous run's pruning.
    pub fn needs_writeback(&self) -> bool {
        self.is_modified() || self.restored
    }

    /// The route list this unit claims in `environment`, for overlap checks.
    ///
    /// Preserved routes win over active ones, which win over the global
    /// list. `None` means the unit says nothing about this environment.
    pub fn effective_routes(&self, environment: &EnvName) -> Option<&[RoutePattern]> {
        let state = self.config.env.get(environment.as_str());
        state
            .and_then(|s| s.preserved_routes.as_deref())
            .or_else(|| state.and_then(|s| s.routes.as_deref()))
            .or(self.config.routes.as_deref())
    }

    /// Stop claiming `route` in `environment`.
    ///
    /// The first mutation per environment copies the active list into
    /// `preserved_routes`; later ones leave that copy alone. A unit that only
    /// had global routes gets an environment table materialised from them.
    /// Removes the first occurrence only.
    pub fn remove_route(&mut self, environment: &EnvName, route: &RoutePattern) {
        let global = self.config.routes.clone();
        let state = self
            .config
            .env
            .entry(environment.0.clone())
            .or_default();
        if state.routes.is_none() {
            state.routes = Some(global.unwrap_or_default());
        }
        if state.preserved_routes.is_none() {
            state.preserved_routes = state.routes.clone();
        }
        if let Some(routes) = state.routes.as_mut() {
            if let Some(index) = routes.iter().position(|r| r == route) {
                routes.remove(index);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Claims and outcomes
// ---------------------------------------------------------------------------

/// The routes a new unit wants to claim, per environment, in manifest order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUnitRouteClaim {
    pub unit: UnitName,
    pub routes: BTreeMap<EnvName, Vec<RoutePattern>>,
}

impl NewUnitRouteClaim {
    pub fn new(unit: impl Into<UnitName>) -> Self {
        Self {
            unit: unit.into(),
            routes: BTreeMap::new(),
        }
    }

    /// Append `route` to the claim for `environment`.
    pub fn push(&mut self, environment: EnvName, route: RoutePattern) {
        self.routes.entry(environment).or_default().push(route);
    }

    /// Routes for `environment`; empty when the unit claims nothing there.
    pub fn routes_for(&self, environment: &EnvName) -> &[RoutePattern] {
        self.routes
            .get(environment)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// How a new unit is served in one environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// The unit claims its routes itself.
    Direct { routes: Vec<RoutePattern> },
    /// The unit claims its routes and binds to `upstream` for traffic the
    /// upstream already serves.
    Delegate {
        routes: Vec<RoutePattern>,
        upstream: UnitName,
    },
}

impl ResolutionOutcome {
    pub fn routes(&self) -> &[RoutePattern] {
        match self {
            ResolutionOutcome::Direct { routes } | ResolutionOutcome::Delegate { routes, .. } => {
                routes
            }
        }
    }

    pub fn upstream(&self) -> Option<&UnitName> {
        match self {
            ResolutionOutcome::Direct { .. } => None,
            ResolutionOutcome::Delegate { upstream, .. } => Some(upstream),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

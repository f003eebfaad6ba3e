//! edgeplan core library: route matching, existing worker registry, and
//! overlap resolution.
//!
//! - [`matcher`]: the edge platform's wildcard route matching
//! - [`types`]: newtypes, persisted worker config, claims and outcomes
//! - [`registry`]: discover / load / restore / writeback
//! - [`persist`]: content-gated atomic file writes
//! - [`resolver`]: decide direct claim vs. upstream delegation
//! - [`error`]: [`RegistryError`], [`ResolveError`]

pub mod error;
pub mod matcher;
pub mod persist;
pub mod registry;
pub mod resolver;
pub mod types;

pub use error::{RegistryError, ResolveError};
pub use persist::WriteResult;
pub use registry::Registry;
pub use types::{
    EnvName, EnvironmentRouteState, ExistingUnit, NewUnitRouteClaim, ResolutionOutcome,
    RoutePattern, UnitName, WorkerConfig,
};

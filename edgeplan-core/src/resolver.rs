//! Overlap resolution between a new unit's routes and existing workers.
//!
//! For every route of a new unit, every existing worker's effective routes
//! in the same environment are classified with [`classify`]:
//!
//! - exact duplicate: the existing worker gives the route up (see
//!   [`ExistingUnit::remove_route`]) and becomes the upstream; the scan for
//!   this route stops there.
//! - existing route covers ours: candidate upstream; the tightest candidate
//!   seen over the whole scan wins.
//! - ours covers the existing route: [`ResolveError::BroaderThanExisting`].
//!
//! All routes of one unit in one environment must agree on the upstream.
//!
//! Resolution mutates the registry in place and must run sequentially: a
//! removal made for one route is visible to every later lookup in the run.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::ResolveError;
use crate::matcher::{classify, covers, Relation};
use crate::registry::Registry;
use crate::types::{EnvName, NewUnitRouteClaim, ResolutionOutcome, RoutePattern, UnitName};

/// Resolve `claim` in one environment.
pub fn resolve(
    claim: &NewUnitRouteClaim,
    environment: &EnvName,
    registry: &mut Registry,
) -> Result<ResolutionOutcome, ResolveError> {
    let routes = claim.routes_for(environment);
    let mut upstreams = Vec::with_capacity(routes.len());
    for route in routes {
        upstreams.push(resolve_route(route, environment, registry)?);
    }

    let Some(first) = upstreams.first() else {
        return Ok(ResolutionOutcome::Direct { routes: vec![] });
    };
    for (route, upstream) in routes.iter().zip(&upstreams).skip(1) {
        if upstream != first {
            return Err(ResolveError::ConflictingUpstreams {
                environment: environment.clone(),
                first_route: routes[0].clone(),
                first_upstream: first.clone(),
                route: route.clone(),
                upstream: upstream.clone(),
            });
        }
    }

    let routes = routes.to_vec();
    Ok(match first {
        Some(upstream) => {
            debug!(unit = %claim.unit, %environment, %upstream, "delegating to upstream");
            ResolutionOutcome::Delegate {
                routes,
                upstream: upstream.clone(),
            }
        }
        None => ResolutionOutcome::Direct { routes },
    })
}

/// Resolve `claim` in every environment of `environments`, in order.
pub fn resolve_unit<'a>(
    claim: &NewUnitRouteClaim,
    environments: impl IntoIterator<Item = &'a EnvName>,
    registry: &mut Registry,
) -> Result<BTreeMap<EnvName, ResolutionOutcome>, ResolveError> {
    let mut outcomes = BTreeMap::new();
    for environment in environments {
        let outcome = resolve(claim, environment, registry)?;
        outcomes.insert(environment.clone(), outcome);
    }
    Ok(outcomes)
}

/// Find the upstream for a single route, removing it from an existing
/// worker on an exact match.
fn resolve_route(
    route: &RoutePattern,
    environment: &EnvName,
    registry: &mut Registry,
) -> Result<Option<UnitName>, ResolveError> {
    let mut exact = None;
    let mut tightest: Option<(UnitName, RoutePattern)> = None;

    'scan: for (index, unit) in registry.units().iter().enumerate() {
        let Some(theirs) = unit.effective_routes(environment) else {
            continue;
        };
        for their_route in theirs {
            match classify(their_route, route) {
                Relation::Exact => {
                    exact = Some(index);
                    break 'scan;
                }
                Relation::Subset => {
                    let tighter = tightest
                        .as_ref()
                        .map_or(true, |(_, held)| covers(held.as_str(), their_route.as_str()));
                    if tighter {
                        debug!(%route, %their_route, unit = %unit.name(), "candidate upstream");
                        tightest = Some((unit.name().clone(), their_route.clone()));
                    }
                }
                Relation::Superset => {
                    return Err(ResolveError::BroaderThanExisting {
                        environment: environment.clone(),
                        ours: route.clone(),
                        theirs: their_route.clone(),
                        unit: unit.name().clone(),
                    });
                }
                Relation::Disjoint => {}
            }
        }
    }

    if let Some(index) = exact {
        let unit = &mut registry.units_mut()[index];
        debug!(%route, unit = %unit.name(), %environment, "exact match; taking route over");
        unit.remove_route(environment, route);
        return Ok(Some(unit.name().clone()));
    }
    Ok(tightest.map(|(name, _)| name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ExistingUnit, WorkerConfig};

    fn unit(name: &str, env: &str, routes: &[&str]) -> ExistingUnit {
        let config: WorkerConfig = toml::from_str(&format!(
            "name = \"{name}\"\n[env.{env}]\nroutes = [{}]\n",
            routes
                .iter()
                .map(|r| format!("\"{r}\""))
                .collect::<Vec<_>>()
                .join(", ")
        ))
        .expect("worker toml");
        ExistingUnit::new(format!("{name}.toml"), config)
    }

    fn claim(env: &str, routes: &[&str]) -> NewUnitRouteClaim {
        let mut claim = NewUnitRouteClaim::new("fresh");
        for r in routes {
            claim.push(EnvName::from(env), RoutePattern::from(*r));
        }
        claim
    }

    #[test]
    fn tightest_candidate_wins_regardless_of_order() {
        let mut registry = Registry::from_units(vec![
            unit("narrow", "staging", &["a.com/api/*"]),
            unit("wide", "staging", &["a.com/*"]),
        ]);
        let outcome = resolve(
            &claim("staging", &["a.com/api/v1"]),
            &EnvName::from("staging"),
            &mut registry,
        )
        .expect("resolve");
        assert_eq!(outcome.upstream(), Some(&UnitName::from("narrow")));
    }

    #[test]
    fn exact_match_short_circuits_earlier_candidates() {
        let mut registry = Registry::from_units(vec![
            unit("wide", "staging", &["a.com/*"]),
            unit("same", "staging", &["a.com/x"]),
        ]);
        let outcome = resolve(
            &claim("staging", &["a.com/x"]),
            &EnvName::from("staging"),
            &mut registry,
        )
        .expect("resolve");
        assert_eq!(outcome.upstream(), Some(&UnitName::from("same")));
        assert!(!registry.units()[0].is_modified());
        assert!(registry.units()[1].is_modified());
    }

    #[test]
    fn empty_claim_is_direct() {
        let mut registry = Registry::from_units(vec![unit("wide", "staging", &["a.com/*"])]);
        let outcome = resolve(
            &NewUnitRouteClaim::new("fresh"),
            &EnvName::from("staging"),
            &mut registry,
        )
        .expect("resolve");
        assert_eq!(outcome, ResolutionOutcome::Direct { routes: vec![] });
    }

    #[test]
    fn other_environments_are_ignored() {
        let mut registry = Registry::from_units(vec![unit("wide", "production", &["a.com/*"])]);
        let outcome = resolve(
            &claim("staging", &["a.com/x"]),
            &EnvName::from("staging"),
            &mut registry,
        )
        .expect("resolve");
        assert!(outcome.upstream().is_none());
    }

    #[test]
    fn direct_and_delegated_routes_conflict() {
        let mut registry = Registry::from_units(vec![unit("wide", "staging", &["a.com/*"])]);
        let err = resolve(
            &claim("staging", &["b.com/x", "a.com/x"]),
            &EnvName::from("staging"),
            &mut registry,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ResolveError::ConflictingUpstreams { first_upstream: None, .. }
        ));
        assert!(err.to_string().contains("<none>"));
    }
}

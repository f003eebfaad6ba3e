//! Host alias substitution and per-worker route claims.

use std::collections::BTreeMap;

use edgeplan_core::{NewUnitRouteClaim, RoutePattern, UnitName};

use crate::bundle::BundleTarget;
use crate::config::{Environment, HostAlias};

/// Expand `pattern` through the first alias whose name equals its host part.
///
/// The host part is everything before the first `/`, or the whole pattern
/// when there is none. Unaliased patterns come back unchanged.
pub fn expand_aliases(pattern: &RoutePattern, aliases: &[HostAlias]) -> Vec<RoutePattern> {
    let raw = pattern.as_str();
    let split = raw.find('/').unwrap_or(raw.len());
    let (host, rest) = raw.split_at(split);

    match aliases.iter().find(|a| a.alias == host) {
        Some(alias) => alias
            .hosts
            .iter()
            .map(|h| RoutePattern::from(format!("{h}{rest}")))
            .collect(),
        None => vec![pattern.clone()],
    }
}

/// Build one claim per worker of `target`, covering every environment.
///
/// Workers with no route in an environment still get an empty entry for it.
pub fn build_claims(
    target: &BundleTarget,
    environments: &[Environment],
) -> BTreeMap<UnitName, NewUnitRouteClaim> {
    let mut claims: BTreeMap<UnitName, NewUnitRouteClaim> = BTreeMap::new();
    for route in &target.worker_routes {
        let claim = claims
            .entry(route.script_name.clone())
            .or_insert_with(|| NewUnitRouteClaim::new(route.script_name.clone()));
        for env in environments {
            claim.routes.entry(env.name.clone()).or_default();
            for pattern in expand_aliases(&route.pattern, &env.aliases) {
                claim.push(env.name.clone(), pattern);
            }
        }
    }
    claims
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use edgeplan_core::EnvName;

    use crate::bundle::WorkerRoute;

    fn env(name: &str, aliases: Vec<HostAlias>) -> Environment {
        Environment {
            name: EnvName::from(name),
            account_id: "acc".to_string(),
            kv: BTreeMap::new(),
            aliases,
        }
    }

    fn shop_alias() -> HostAlias {
        HostAlias {
            alias: "@shop".to_string(),
            hosts: vec!["a.example.com".to_string(), "b.example.com".to_string()],
        }
    }

    #[test]
    fn alias_expands_to_every_host() {
        let out = expand_aliases(&RoutePattern::from("@shop/checkout*"), &[shop_alias()]);
        assert_eq!(
            out,
            vec![
                RoutePattern::from("a.example.com/checkout*"),
                RoutePattern::from("b.example.com/checkout*"),
            ]
        );
    }

    #[test]
    fn alias_must_match_whole_host_part() {
        let out = expand_aliases(&RoutePattern::from("@shopping/x"), &[shop_alias()]);
        assert_eq!(out, vec![RoutePattern::from("@shopping/x")]);
    }

    #[test]
    fn pattern_without_slash_uses_whole_pattern_as_host() {
        let out = expand_aliases(&RoutePattern::from("@shop"), &[shop_alias()]);
        assert_eq!(
            out,
            vec![RoutePattern::from("a.example.com"), RoutePattern::from("b.example.com")]
        );
    }

    #[test]
    fn claims_are_grouped_per_worker_and_environment() {
        let target = BundleTarget {
            name: "t".to_string(),
            logpush: false,
            dir: PathBuf::from("/bundle/t"),
            worker_routes: vec![
                WorkerRoute {
                    pattern: RoutePattern::from("@shop/a"),
                    script_name: UnitName::from("w1"),
                },
                WorkerRoute {
                    pattern: RoutePattern::from("plain.com/b"),
                    script_name: UnitName::from("w1"),
                },
                WorkerRoute {
                    pattern: RoutePattern::from("plain.com/c"),
                    script_name: UnitName::from("w2"),
                },
            ],
        };
        let envs = vec![env("production", vec![]), env("staging", vec![shop_alias()])];

        let claims = build_claims(&target, &envs);
        assert_eq!(claims.len(), 2);

        let w1 = &claims[&UnitName::from("w1")];
        assert_eq!(
            w1.routes_for(&EnvName::from("staging")),
            &[
                RoutePattern::from("a.example.com/a"),
                RoutePattern::from("b.example.com/a"),
                RoutePattern::from("plain.com/b"),
            ]
        );
        assert_eq!(
            w1.routes_for(&EnvName::from("production")),
            &[RoutePattern::from("@shop/a"), RoutePattern::from("plain.com/b")]
        );
        assert_eq!(claims[&UnitName::from("w2")].routes.len(), 2);
    }
}

//! Derivation of ACL, backend and frontend records from rules.

use serde::Serialize;

use crate::observability::metrics;
use crate::rules::model::{RoutingRule, RuleSet};
use crate::synth::canonical;

/// A named boolean match predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Acl {
    pub name: String,
    pub matcher: String,
}

/// A named proxy target plus its server line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Backend {
    pub name: String,
    pub server: String,
}

/// One routing decision: host ACL and path ACL both matching selects the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Frontend {
    pub host_acl: Acl,
    pub path_acl: Acl,
    pub backend: Backend,
}

/// Records derived from a rule set, in rule order then path order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Features {
    pub backends: Vec<Backend>,
    pub host_acls: Vec<Acl>,
    pub frontends: Vec<Frontend>,
}

/// Host ACL for a rule; the name depends only on namespace and host.
pub fn host_acl(rule: &RoutingRule, base_domain: &str) -> Acl {
    Acl {
        name: format!("is_{}_{}", rule.namespace, rule.host),
        matcher: format!("hdr_beg(host) -i {}.{}", rule.host, base_domain),
    }
}

/// Derive every record for `rules`. Invalid hostnames are logged and skipped.
pub fn features_from(rules: &RuleSet, base_domain: &str) -> Features {
    let mut features = Features::default();

    for rule in rules {
        if !canonical::is_valid_host(&rule.host) {
            tracing::warn!(
                namespace = %rule.namespace,
                host = %rule.host,
                "Skipping rule with invalid host"
            );
            metrics::record_invalid_rule();
            continue;
        }

        let host_acl = host_acl(rule, base_domain);
        features.host_acls.push(host_acl.clone());

        for route in &rule.paths {
            let name = canonical::name(&rule.namespace, &rule.host, &route.path);

            let backend = Backend {
                server: format!(
                    "{} {}.{}.svc.cluster.local:{}",
                    rule.host, route.service, rule.namespace, route.port
                ),
                name: name.clone(),
            };
            features.backends.push(backend.clone());

            let path_acl = Acl {
                name: format!("is_{}_path", name),
                matcher: format!("path_beg {}", route.path),
            };

            features.frontends.push(Frontend {
                host_acl: host_acl.clone(),
                path_acl,
                backend,
            });
        }
    }

    features
}

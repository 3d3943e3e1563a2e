//! Routing rule data model.
//!
//! A [`RuleSet`] is the full desired routing state for one poll cycle. It is
//! replaced wholesale every poll and compared structurally, so every type
//! here derives `PartialEq` over all of its fields.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Target port of a path route: either a port number or a named service port.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ServicePort {
    Number(i32),
    Name(String),
}

impl fmt::Display for ServicePort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServicePort::Number(n) => write!(f, "{}", n),
            ServicePort::Name(name) => f.write_str(name),
        }
    }
}

impl From<i32> for ServicePort {
    fn from(n: i32) -> Self {
        ServicePort::Number(n)
    }
}

/// One path-prefix to service mapping inside a rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct PathRoute {
    /// Path prefix to match (e.g. "/api").
    pub path: String,

    /// Target service name in the rule's namespace.
    pub service: String,

    /// Target service port.
    pub port: ServicePort,
}

impl PathRoute {
    pub fn new(path: impl Into<String>, service: impl Into<String>, port: impl Into<ServicePort>) -> Self {
        Self {
            path: path.into(),
            service: service.into(),
            port: port.into(),
        }
    }
}

/// A hostname plus its ordered path mappings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct RoutingRule {
    /// Namespace the rule (and its target services) live in.
    pub namespace: String,

    /// Hostname label, prefixed onto the base domain when matching.
    pub host: String,

    /// Path mappings, in evaluation order.
    #[serde(default)]
    pub paths: Vec<PathRoute>,
}

impl RoutingRule {
    pub fn new(namespace: impl Into<String>, host: impl Into<String>, paths: Vec<PathRoute>) -> Self {
        Self {
            namespace: namespace.into(),
            host: host.into(),
            paths,
        }
    }
}

/// Ordered rules for one poll cycle.
///
/// Equality is deep and order-sensitive: two sets holding the same rules in a
/// different order are different, because they render differently.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct RuleSet {
    #[serde(default)]
    pub rules: Vec<RoutingRule>,
}

impl RuleSet {
    pub fn new(rules: Vec<RoutingRule>) -> Self {
        Self { rules }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RoutingRule> {
        self.rules.iter()
    }
}

impl From<Vec<RoutingRule>> for RuleSet {
    fn from(rules: Vec<RoutingRule>) -> Self {
        Self::new(rules)
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a RoutingRule;
    type IntoIter = std::slice::Iter<'a, RoutingRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

//! Change detection between consecutive rule sets.

use std::collections::HashSet;

use crate::rules::model::RuleSet;

/// True when `next` differs from `previous` in any field or in order.
///
/// Reordering alone counts as a change because it reorders the rendered ACLs.
pub fn changed(previous: &RuleSet, next: &RuleSet) -> bool {
    previous != next
}

/// Host-level summary of a change, for logging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSummary {
    pub added_hosts: Vec<String>,
    pub removed_hosts: Vec<String>,
    pub total_rules: usize,
}

/// Hosts (as `namespace/host`) present only in `next` or only in `previous`.
pub fn summarize(previous: &RuleSet, next: &RuleSet) -> ChangeSummary {
    ChangeSummary {
        added_hosts: hosts_missing_from(next, previous),
        removed_hosts: hosts_missing_from(previous, next),
        total_rules: next.len(),
    }
}

/// Hosts of `from` that `other` lacks, in `from` order, without repeats.
fn hosts_missing_from(from: &RuleSet, other: &RuleSet) -> Vec<String> {
    let key = |ns: &str, host: &str| format!("{}/{}", ns, host);
    let known: HashSet<String> = other.iter().map(|r| key(&r.namespace, &r.host)).collect();
    let mut seen = HashSet::new();

    from.iter()
        .map(|r| key(&r.namespace, &r.host))
        .filter(|k| !known.contains(k) && seen.insert(k.clone()))
        .collect()
}

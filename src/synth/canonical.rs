//! Canonical names for derived proxy records.
//!
//! Names must be stable across runs: backend identity in the proxy and the
//! byte-for-byte comparison of rendered configs both depend on it.

use std::sync::LazyLock;

use regex::Regex;

/// Separator substituted for `-` in hostnames.
const DASH: &str = "_dash_";

static VALID_HOST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(([a-zA-Z]|[a-zA-Z][a-zA-Z0-9\-]*[a-zA-Z0-9])\.)*([A-Za-z]|[A-Za-z][A-Za-z0-9\-]*[A-Za-z0-9])$",
    )
    .expect("hostname pattern is a valid regex")
});

/// Returns true if `host` is a syntactically valid DNS hostname.
pub fn is_valid_host(host: &str) -> bool {
    VALID_HOST.is_match(host)
}

/// `<namespace>_<host>` with `-` → `_dash_` and `.` → `_`, lower-cased.
pub fn namespace_host(namespace: &str, host: &str) -> String {
    let host = host.replace('-', DASH).replace('.', "_");
    format!("{}_{}", namespace, host).to_lowercase()
}

/// Path with `/` → `_`, leading separators trimmed, lower-cased.
pub fn path(path: &str) -> String {
    path.replace('/', "_").trim_start_matches('_').to_lowercase()
}

/// Full canonical name for a (namespace, host, path) triple.
pub fn name(namespace: &str, host: &str, route_path: &str) -> String {
    let joined = format!("{}_{}", namespace_host(namespace, host), path(route_path));
    joined.trim_end_matches('_').to_lowercase()
}

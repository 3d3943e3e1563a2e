//! Routing rules and where they come from.
//!
//! # Data Flow
//! ```text
//! control plane (Ingress objects) ─┐
//!                                  ├─→ RuleSource::list() → RuleSet
//! rules file (TOML)  ──────────────┘
//! ```
//!
//! # Design Decisions
//! - Every list is the full desired state; sources never send diffs
//! - A failed list is a `ListError`, which the controller treats as retryable
//! - Rules are kept in source order; nothing here sorts

pub mod file;
pub mod ingress;
pub mod model;
pub mod source;

pub use model::{PathRoute, RoutingRule, RuleSet, ServicePort};
pub use source::{ListError, RuleSource};

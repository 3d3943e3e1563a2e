//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger()
//!
//! Shutdown (shutdown.rs):
//!     broadcast → controller stops before its next cycle
//! ```
//!
//! # Design Decisions
//! - No mid-cycle cancellation: a reload that has started always finishes
//! - The proxy is left running on shutdown; it keeps serving the last config
//! - Fatal errors bypass this path and exit the process non-zero

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;

//! HAProxy ingress controller library.
//!
//! Keeps an HAProxy configuration in step with routing rules from the
//! cluster control plane, and reloads the proxy without dropping connections.

// Core subsystems
pub mod config;
pub mod controller;
pub mod rules;
pub mod supervisor;
pub mod synth;

// Cross-cutting concerns
pub mod error;
pub mod lifecycle;
pub mod observability;

pub use config::ControllerConfig;
pub use controller::Controller;
pub use error::{Error, Result};
pub use lifecycle::Shutdown;

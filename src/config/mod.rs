//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → command-line / environment overrides (main.rs)
//!     → validation.rs (semantic checks)
//!     → ControllerConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::ConfigError;
pub use schema::ControllerConfig;
pub use schema::ObservabilityConfig;
pub use schema::OutputConfig;
pub use schema::PollConfig;
pub use schema::ProxyConfig;
pub use schema::SourceConfig;
pub use schema::SourceKind;
pub use schema::TemplateConfig;

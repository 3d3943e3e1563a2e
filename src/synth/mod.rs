//! Configuration synthesis.
//!
//! # Data Flow
//! ```text
//! RuleSet
//!     → features.rs (host ACLs, backends, frontends; invalid hosts dropped)
//!     → template.rs (fixed sections + three generated regions)
//!     → Synthesis { text, features }
//! ```
//!
//! # Design Decisions
//! - Pure: same rules, same parameters, byte-identical text
//! - No sorting; input order is output order
//! - A template failure is an internal error and is never retried

pub mod canonical;
pub mod features;
pub mod template;

use serde::Serialize;
use thiserror::Error;

use crate::config::ControllerConfig;
use crate::rules::model::RuleSet;

pub use features::{Acl, Backend, Features, Frontend};
pub use template::{Renderer, TemplateParams};

/// Errors raised while rendering configuration.
#[derive(Debug, Error)]
pub enum SynthError {
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),
}

/// Rendered text plus the records it was rendered from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Synthesis {
    pub text: String,
    #[serde(flatten)]
    pub features: Features,
}

impl Synthesis {
    pub fn backends(&self) -> &[Backend] {
        &self.features.backends
    }

    pub fn host_acls(&self) -> &[Acl] {
        &self.features.host_acls
    }

    pub fn frontends(&self) -> &[Frontend] {
        &self.features.frontends
    }
}

/// Turns rule sets into HAProxy configuration.
pub struct ConfigSynthesizer {
    base_domain: String,
    renderer: Renderer,
}

impl ConfigSynthesizer {
    pub fn new(base_domain: impl Into<String>, params: TemplateParams) -> Result<Self, SynthError> {
        Ok(Self {
            base_domain: base_domain.into(),
            renderer: Renderer::new(params)?,
        })
    }

    pub fn from_config(config: &ControllerConfig) -> Result<Self, SynthError> {
        Self::new(config.template.base_domain.clone(), TemplateParams::from_config(config))
    }

    pub fn synthesize(&self, rules: &RuleSet) -> Result<Synthesis, SynthError> {
        let features = features::features_from(rules, &self.base_domain);
        let text = self.renderer.render(&features)?;
        Ok(Synthesis { text, features })
    }
}

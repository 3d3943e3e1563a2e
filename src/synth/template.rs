//! HAProxy configuration template.

use minijinja::{context, Environment, UndefinedBehavior};
use serde::Serialize;

use crate::config::ControllerConfig;
use crate::synth::features::Features;
use crate::synth::SynthError;

const TEMPLATE_NAME: &str = "haproxy.cfg";
const TEMPLATE: &str = include_str!("haproxy.cfg.j2");

/// Values substituted into the fixed sections of the template.
///
/// These come from process configuration and never change while the
/// controller runs, so identical rules always render identical text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateParams {
    pub pid_file: String,
    pub syslog_target: String,
    pub stats_bind: String,
    pub http_bind: String,
    pub error_file: String,
}

impl TemplateParams {
    pub fn from_config(config: &ControllerConfig) -> Self {
        Self {
            pid_file: config.proxy.pid_file.display().to_string(),
            syslog_target: config.template.syslog_target.clone(),
            stats_bind: config.template.stats_bind.clone(),
            http_bind: config.template.http_bind.clone(),
            error_file: config.template.error_file.clone(),
        }
    }
}

impl Default for TemplateParams {
    fn default() -> Self {
        Self::from_config(&ControllerConfig::default())
    }
}

/// Compiled template plus its fixed parameters.
pub struct Renderer {
    env: Environment<'static>,
    params: TemplateParams,
}

impl Renderer {
    pub fn new(params: TemplateParams) -> Result<Self, SynthError> {
        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.add_template(TEMPLATE_NAME, TEMPLATE)?;
        Ok(Self { env, params })
    }

    /// Render derived records into configuration text.
    pub fn render(&self, features: &Features) -> Result<String, SynthError> {
        let template = self.env.get_template(TEMPLATE_NAME)?;
        let text = template.render(context! {
            pid_file => &self.params.pid_file,
            syslog_target => &self.params.syslog_target,
            stats_bind => &self.params.stats_bind,
            http_bind => &self.params.http_bind,
            error_file => &self.params.error_file,
            host_acls => &features.host_acls,
            frontends => &features.frontends,
            backends => &features.backends,
        })?;
        Ok(text)
    }
}

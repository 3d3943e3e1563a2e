//! HAProxy Ingress Controller
//!
//! Polls the cluster for routing rules, renders them into an HAProxy
//! configuration and gracefully reloads HAProxy whenever they change.
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌──────────────┐   list()   ┌────────────┐  changed?  ┌───────────────────┐
//!   │ control plane│───────────▶│ controller │───────────▶│ config synthesizer│
//!   │  (Ingress)   │            │    loop    │            └─────────┬─────────┘
//!   └──────────────┘            └─────▲──────┘                      │ haproxy.cfg
//!                                     │ rate limiter                ▼
//!                                     │                   ┌───────────────────┐
//!                                     └───────────────────│ process supervisor│──▶ haproxy -sf <old>
//!                                        pid rotated      └───────────────────┘
//! ```
//!
//! Exits non-zero on any fatal error; an outer process manager restarts it.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use haproxy_ingress::config::loader::read_config;
use haproxy_ingress::config::validation::validate_config;
use haproxy_ingress::config::{ConfigError, ControllerConfig, SourceKind};
use haproxy_ingress::lifecycle::signals::spawn_signal_handler;
use haproxy_ingress::observability::{logging, metrics};
use haproxy_ingress::rules::file::FileRuleSource;
use haproxy_ingress::rules::ingress::KubeIngressSource;
use haproxy_ingress::rules::RuleSource;
use haproxy_ingress::{Controller, Shutdown};

#[derive(Parser)]
#[command(name = "haproxy-ingress")]
#[command(about = "Keeps HAProxy in sync with cluster ingress rules", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long, env = "INGRESS_CONFIG")]
    config: Option<PathBuf>,

    /// Domain appended to every ingress host.
    #[arg(long, env = "BASE_HOSTNAME")]
    base_domain: Option<String>,

    /// Rendered HAProxy configuration path.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Read rules from this TOML file instead of the cluster.
    #[arg(long)]
    rules_file: Option<PathBuf>,
}

impl Cli {
    fn apply(self, config: &mut ControllerConfig) {
        if let Some(domain) = self.base_domain {
            config.template.base_domain = domain;
        }
        if let Some(output) = self.output {
            config.output.config_path = output;
        }
        if let Some(rules) = self.rules_file {
            config.source.kind = SourceKind::File;
            config.source.rules_path = Some(rules);
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match cli.config.as_deref() {
        Some(path) => read_config(path)?,
        None => ControllerConfig::default(),
    };
    cli.apply(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init(&config.observability);
    tracing::info!("haproxy-ingress v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        base_domain = %config.template.base_domain,
        output = %config.output.config_path.display(),
        pid_file = %config.proxy.pid_file.display(),
        source = ?config.source.kind,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let source: Box<dyn RuleSource> = match config.source.kind {
        SourceKind::Kube => Box::new(KubeIngressSource::try_default().await?),
        SourceKind::File => {
            let path = config.source.rules_path.clone().ok_or("source.rules_path is not set")?;
            tracing::info!(path = %path.display(), "Reading rules from file");
            Box::new(FileRuleSource::new(path))
        }
    };

    // Subscribed before the handler exists so no signal goes unheard.
    let shutdown = Shutdown::new();
    let shutdown_rx = shutdown.subscribe();
    spawn_signal_handler(shutdown.clone());

    let mut controller = Controller::from_config(source, &config)?;
    controller.bootstrap().await?;

    if let Err(e) = controller.run(shutdown_rx).await {
        tracing::error!(error = %e, "Controller stopped");
        return Err(e.into());
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

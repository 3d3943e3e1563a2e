use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use haproxy_ingress::config::loader::read_config;
use haproxy_ingress::config::ControllerConfig;
use haproxy_ingress::observability::logging;
use haproxy_ingress::rules::file::load_rules;
use haproxy_ingress::synth::ConfigSynthesizer;

#[derive(Parser)]
#[command(name = "ingress-render")]
#[command(about = "Render an HAProxy configuration from a rules file", long_about = None)]
struct Cli {
    /// TOML rules file (`[[rules]]` tables).
    #[arg(short, long)]
    rules: PathBuf,

    /// TOML controller configuration for template parameters.
    #[arg(short, long, env = "INGRESS_CONFIG")]
    config: Option<PathBuf>,

    /// Domain appended to every rule host.
    #[arg(long, env = "BASE_HOSTNAME")]
    base_domain: Option<String>,

    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    /// The rendered configuration file.
    Text,
    /// Derived ACLs, backends and frontends plus the text, as JSON.
    Json,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match cli.config.as_deref() {
        Some(path) => read_config(path)?,
        None => ControllerConfig::default(),
    };
    if let Some(domain) = cli.base_domain {
        config.template.base_domain = domain;
    }
    if config.template.base_domain.is_empty() {
        return Err("base domain not set (use --base-domain or BASE_HOSTNAME)".into());
    }

    logging::init(&config.observability);

    let rules = load_rules(&cli.rules)?;
    let synthesis = ConfigSynthesizer::from_config(&config)?.synthesize(&rules)?;

    match cli.format {
        Format::Text => print!("{}", synthesis.text),
        Format::Json => println!("{}", serde_json::to_string_pretty(&synthesis)?),
    }

    Ok(())
}

use anyhow::{Context, Result};
use integrador_mailbox::IntegradorConfig;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::cli_args::Cli;

pub(crate) fn init_tracing() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

/// Config file (if any), then `INTEGRADOR_*` env vars, then flags.
pub(crate) fn resolve_config(cli: &Cli) -> Result<IntegradorConfig> {
    resolve_config_with(cli, |key| std::env::var(key).ok())
}

fn resolve_config_with(
    cli: &Cli,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<IntegradorConfig> {
    let mut config = match &cli.config {
        Some(path) => IntegradorConfig::load(path)?,
        None => IntegradorConfig::default(),
    };
    config.apply_overrides_from(lookup);
    if let Some(input_dir) = &cli.input_dir {
        config.input_dir = input_dir.clone();
    }
    if let Some(output_dir) = &cli.output_dir {
        config.output_dir = output_dir.clone();
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.timeout_ms = timeout_ms;
    }
    config.validate().context("invalid integrador configuration")?;
    Ok(config)
}

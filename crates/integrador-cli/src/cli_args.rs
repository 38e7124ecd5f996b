use std::path::PathBuf;

use clap::{Parser, Subcommand};

fn parse_parameter(value: &str) -> Result<(String, String), String> {
    let (name, raw) = value
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{value}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err("parameter name cannot be empty".to_string());
    }
    Ok((name.to_string(), raw.to_string()))
}

#[derive(Debug, Parser)]
#[command(
    name = "integrador",
    about = "Exchange commands with the fiscal integrator through its file mailbox",
    version
)]
pub(crate) struct Cli {
    #[arg(
        long,
        env = "INTEGRADOR_CONFIG",
        help = "TOML config file with input_dir, output_dir, timeout_ms, poll_interval_ms and validator_access_key."
    )]
    pub config: Option<PathBuf>,

    #[arg(long = "input-dir", help = "Directory the processor reads commands from.")]
    pub input_dir: Option<PathBuf>,

    #[arg(long = "output-dir", help = "Directory the processor writes responses to.")]
    pub output_dir: Option<PathBuf>,

    #[arg(
        long = "timeout-ms",
        allow_hyphen_values = true,
        help = "Response timeout in milliseconds; 0 or negative waits indefinitely."
    )]
    pub timeout_ms: Option<i64>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub(crate) enum CliCommand {
    /// Send an arbitrary component/method call.
    Send {
        #[arg(long)]
        component: String,
        #[arg(long)]
        method: String,
        #[arg(
            long = "param",
            value_parser = parse_parameter,
            help = "Method parameter as NAME=VALUE; repeat to add more, order is kept."
        )]
        params: Vec<(String, String)>,
        #[arg(long = "include-session-id", help = "Send the session id as the first parameter.")]
        include_session_id: bool,
    },
    /// Query the processor about an earlier session number.
    ConsultSession { session_number: u64 },
    /// Check the validator status for a queue entry.
    ValidatorStatus {
        #[arg(long = "queue-id")]
        queue_id: i64,
        #[arg(long)]
        cnpj: String,
    },
}

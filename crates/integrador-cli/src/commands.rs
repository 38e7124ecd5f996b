use anyhow::Result;
use integrador_mailbox::{
    CommandRequest, Exchange, IntegradorClient, IntegradorConfig, IntegradorResponse,
};

use crate::cli_args::CliCommand;

pub(crate) fn run(command: &CliCommand, config: &IntegradorConfig) -> Result<()> {
    let client = IntegradorClient::from_config(config)?;
    let exchange = match command {
        CliCommand::Send {
            component,
            method,
            params,
            include_session_id,
        } => {
            let request = build_request(component, method, params);
            client.send(&request, *include_session_id)?
        }
        CliCommand::ConsultSession { session_number } => client.consult_session(*session_number)?,
        CliCommand::ValidatorStatus { queue_id, cnpj } => {
            client.check_validator_status(*queue_id, cnpj)?
        }
    };
    println!("{}", render_exchange(&exchange));
    Ok(())
}

fn build_request(component: &str, method: &str, params: &[(String, String)]) -> CommandRequest {
    params
        .iter()
        .fold(CommandRequest::new(component, method), |request, (name, value)| {
            request.param(name.as_str(), value.as_str())
        })
}

fn render_exchange(exchange: &Exchange<IntegradorResponse>) -> String {
    let response = &exchange.response;
    let mut lines = vec![format!(
        "integrador exchange: session_id={} code={} value={}",
        exchange.session_id,
        response.code.as_deref().unwrap_or("-"),
        response.value.as_deref().unwrap_or("-"),
    )];
    if let Some(error) = response.error.as_deref() {
        lines.push(format!("integrador error: {error}"));
    }
    lines.push(exchange.response_text.trim_end().to_string());
    lines.join("\n")
}

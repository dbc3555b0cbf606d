//! CLI command implementations

use std::fs;
use std::path::Path;

use serde_json::{json, Value};

use crate::http_server::{HttpServer, ServerConfig};
use crate::observability::{log_event, log_event_with_fields, Event};
use crate::training::{
    self, ExampleSubmission, LabeledExample, ModelSnapshot, TrainingError, TrainingResult,
    ANONYMOUS,
};

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{read_request, write_error, write_response};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve { config, port } => serve(config.as_deref(), port),
        Command::Evaluate => evaluate(),
    }
}

/// Resolve the server configuration.
///
/// Precedence: defaults < config file < `PORT` environment value < `--port`.
pub fn load_config(
    path: Option<&Path>,
    env_port: Option<&str>,
    flag_port: Option<u16>,
) -> CliResult<ServerConfig> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)
                .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;
            serde_json::from_str(&content)
                .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?
        }
        None => ServerConfig::default(),
    };

    if let Some(port) = env_port {
        config.port = port
            .trim()
            .parse()
            .map_err(|_| CliError::config_error(format!("Invalid PORT value: '{}'", port)))?;
    }
    if let Some(port) = flag_port {
        config.port = port;
    }

    config.validate().map_err(CliError::config_error)?;
    Ok(config)
}

/// Run the collaborative training server
pub fn serve(config_path: Option<&Path>, port: Option<u16>) -> CliResult<()> {
    log_event(Event::ServerStart);

    let env_port = std::env::var("PORT").ok();
    let config = load_config(config_path, env_port.as_deref(), port)?;
    log_event_with_fields(
        Event::ConfigLoaded,
        &[("addr", &config.socket_addr()), ("static_dir", &config.static_dir)],
    );

    let server = HttpServer::with_config(config);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server.start().await.map_err(|e| {
            log_event_with_fields(Event::ServerFailed, &[("reason", &e.to_string())]);
            CliError::boot_failed(format!("HTTP server failed: {}", e))
        })
    })
}

/// Train once over a JSON array read from stdin and print the snapshot
pub fn evaluate() -> CliResult<()> {
    let request = read_request()?;

    match evaluate_examples(&request) {
        Ok((dataset_size, model)) => write_response(json!({
            "dataset_size": dataset_size,
            "model": model,
        })),
        Err(EvaluateError::Training(e)) => write_error(e.code(), &e.to_string()),
        Err(EvaluateError::Cli(e)) => Err(e),
    }
}

/// Failure of an offline evaluation
#[derive(Debug)]
pub enum EvaluateError {
    /// The request itself is not a list of examples
    Cli(CliError),
    /// One of the examples is malformed
    Training(TrainingError),
}

/// Validate every example of a JSON array and train over all of them
pub fn evaluate_examples(
    request: &Value,
) -> Result<(usize, Option<ModelSnapshot>), EvaluateError> {
    let items = request.as_array().ok_or_else(|| {
        EvaluateError::Cli(CliError::io_error("Expected a JSON array of examples"))
    })?;

    let examples = items
        .iter()
        .map(parse_example)
        .collect::<TrainingResult<Vec<_>>>()
        .map_err(EvaluateError::Training)?;

    Ok((examples.len(), training::train(&examples)))
}

fn parse_example(item: &Value) -> TrainingResult<LabeledExample> {
    let submission: ExampleSubmission = serde_json::from_value(item.clone())
        .map_err(|e| TrainingError::malformed("example", e.to_string()))?;
    let (features, label) = submission.validate()?;
    let contributor = item
        .get("contributor")
        .and_then(Value::as_str)
        .unwrap_or(ANONYMOUS);

    Ok(LabeledExample::new(features, label, contributor))
}

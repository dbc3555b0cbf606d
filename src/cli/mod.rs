//! CLI module
//!
//! Provides command-line interface for:
//! - serve: run the collaborative training server
//! - evaluate: one-shot training over examples from stdin

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{evaluate_examples, load_config, run, run_command, EvaluateError};
pub use errors::{CliError, CliErrorCode, CliResult};

//! CLI argument definitions using clap
//!
//! Commands:
//! - teachmachine serve [--config <path>] [--port <port>]
//! - teachmachine evaluate

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// teachmachine - teach a classifier together and watch its fairness
#[derive(Parser, Debug)]
#[command(name = "teachmachine")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the collaborative training server
    Serve {
        /// Path to a JSON configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Port to listen on (overrides config file and PORT)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Train once on a JSON array of examples read from stdin
    Evaluate,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_with_port() {
        let cli = Cli::try_parse_from(["teachmachine", "serve", "--port", "8080"]).unwrap();
        match cli.command {
            Command::Serve { config, port } => {
                assert!(config.is_none());
                assert_eq!(port, Some(8080));
            }
            _ => panic!("Wrong command"),
        }
    }

    #[test]
    fn test_parse_evaluate() {
        let cli = Cli::try_parse_from(["teachmachine", "evaluate"]).unwrap();
        assert!(matches!(cli.command, Command::Evaluate));
    }
}

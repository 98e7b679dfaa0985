//! CLI definitions for the `hogsim` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Streaming narrator backend for the Hogwarts role-play game.
#[derive(Parser)]
#[command(name = "hogsim", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, env = "HOGSIM_CONFIG", default_value = "hogsim.toml")]
    pub config: PathBuf,

    /// Detailed output (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Export spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server.
    Serve {
        /// Port to listen on (overrides the config file).
        #[arg(long, short)]
        port: Option<u16>,

        /// Host to bind to (overrides the config file).
        #[arg(long)]
        host: Option<String>,
    },

    /// Print the effective configuration as TOML.
    Config,
}

impl Cli {
    /// Default log filter for the chosen verbosity.
    pub fn default_filter(&self) -> &'static str {
        match self.verbose {
            0 => "info,sqlx=warn",
            1 => "info,hogwarts_core=debug,hogwarts_infra=debug,hogwarts_api=debug,tower_http=debug",
            _ => "trace",
        }
    }
}

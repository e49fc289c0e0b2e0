//! Boardwalk CLI
//!
//! Starts the board service HTTP server.

use boardwalk_server::{config::ServerConfig, start_server, ServerError};
use clap::Parser;
use std::path::PathBuf;
use std::process;

/// Boardwalk - boards, columns and tasks over HTTP.
#[derive(Debug, Parser)]
#[command(name = "boardwalk")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "BOARDWALK_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on (overrides the config file)
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// SQLite database file (overrides the config file)
    #[arg(short, long, env = "BOARDWALK_DATABASE")]
    database: Option<String>,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run(Cli::parse()).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), ServerError> {
    let mut config = match &cli.config {
        Some(path) => ServerConfig::from_file(path)?,
        None => {
            eprintln!("Warning: No config file specified, using defaults");
            ServerConfig::default()
        }
    };

    if let Some(port) = cli.port {
        config.bind_port = port;
    }
    if let Some(database) = cli.database {
        config.database_path = database;
    }

    start_server(config).await
}

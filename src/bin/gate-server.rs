//! Gate server: answers controller requests over UDP.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::Level;

use gate_protocol::config::GateConfig;
use gate_protocol::protocol::HelloGate;
use gate_protocol::transport::GateServer;
use gate_protocol::utils::logging::init_logging;

/// Gate server - authorizes door and gate controllers
#[derive(Parser, Debug)]
#[command(name = "gate-server")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to configuration file
    #[arg(short, long, default_value = "gate.toml", global = true)]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the server (default)
    Run,

    /// Print an example configuration file
    GenerateConfig,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(Commands::GenerateConfig) = cli.command {
        println!("{}", GateConfig::example_config());
        return ExitCode::SUCCESS;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Fatal error: {e}");
            eprintln!("gate-server: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> gate_protocol::Result<()> {
    let mut config = GateConfig::from_file(&cli.config)?;
    config.apply_env();
    if cli.verbose {
        config.logging.log_level = Level::DEBUG;
    }

    init_logging(&config.logging)?;
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %cli.config.display(),
        "Starting gate server"
    );

    let server = GateServer::from_config(&config, HelloGate).await?;
    server.run().await
}

//! Send one request to the gate server as a controller would.
//!
//! ```text
//! printf '\x05Hello' | gatectl aa:bb:cc:dd:ee:ff open
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tokio::io::AsyncReadExt;

use gate_protocol::config::GateConfig;
use gate_protocol::core::device_id::DeviceId;
use gate_protocol::error::{constants, ProtocolError};
use gate_protocol::protocol::{KeyStore, MsgType};
use gate_protocol::service::GateClient;
use gate_protocol::utils::logging::init_logging;

/// Manual test client for the gate server
#[derive(Parser, Debug)]
#[command(name = "gatectl")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Controller hardware address, e.g. aa:bb:cc:dd:ee:ff
    mac: String,

    /// Message type, e.g. open
    msgtype: String,

    /// Path to configuration file holding the controller keys
    #[arg(short, long, default_value = "gate.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Checked before touching config, stdin or the network
    let msg_type = match cli.msgtype.parse::<MsgType>() {
        Ok(t) => t,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    match run(&cli, msg_type).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("gatectl: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli, msg_type: MsgType) -> gate_protocol::Result<()> {
    let device: DeviceId = cli.mac.parse()?;

    let mut config = GateConfig::from_file(&cli.config)?;
    config.apply_env();
    // Quiet unless RUST_LOG says otherwise
    config.logging.log_level = tracing::Level::WARN;
    init_logging(&config.logging)?;

    let key = config.key_store()?.key_for(&device).ok_or_else(|| {
        ProtocolError::ConfigError(format!("{}: {device}", constants::ERR_UNKNOWN_CONTROLLER))
    })?;

    let mut indata = Vec::new();
    tokio::io::stdin().read_to_end(&mut indata).await?;

    let client = GateClient::from_config(&config.client).await?;
    let response = client.request(device, &key, msg_type, &indata).await?;
    println!("{response}");
    Ok(())
}

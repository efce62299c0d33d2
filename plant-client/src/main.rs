use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use plant_client::capture::{ImageCapture, MAX_IMAGE_BYTES};
use plant_client::display;
use plant_client::{IdentifyClient, IdentifySession, SessionState};

#[derive(Parser)]
#[command(name = "plant-id")]
#[command(about = "Identify a plant from a photo")]
#[command(version)]
struct Cli {
    /// Image file to identify
    image: PathBuf,

    /// Base URL of the plant identification service
    #[arg(short, long, default_value = "http://localhost:8080")]
    endpoint: String,

    /// Largest file to upload, in bytes
    #[arg(long, default_value_t = MAX_IMAGE_BYTES)]
    max_bytes: u64,

    /// Print the record as JSON instead of text
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let client = IdentifyClient::new(cli.endpoint);
    let mut session = IdentifySession::with_capture(client, ImageCapture::with_limit(cli.max_bytes));

    eprintln!("{}", display::LOADING_MESSAGE);

    match session.upload(&cli.image).await {
        SessionState::Identified { info, .. } if cli.json => {
            println!("{}", serde_json::to_string_pretty(info)?);
            Ok(ExitCode::SUCCESS)
        }
        state @ SessionState::Identified { .. } => {
            println!("{}", display::render(state));
            Ok(ExitCode::SUCCESS)
        }
        state => {
            eprintln!("{}", display::render(state));
            Ok(ExitCode::FAILURE)
        }
    }
}

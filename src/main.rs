// src/main.rs

use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use boltun::api;
use boltun::config::BoltunConfig;

#[derive(Parser)]
#[command(name = "boltun")]
#[command(about = "Conversational relay backend with image generation and Telegram delivery", long_about = None)]
struct Cli {
    /// Bind host (overrides BOLTUN_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Bind port (overrides BOLTUN_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable debug logging
    #[arg(short, long, default_value_t = false)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = BoltunConfig::from_env();
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }

    // Initialize tracing
    let level = if cli.debug {
        Level::DEBUG
    } else {
        config.log_level.parse().unwrap_or(Level::INFO)
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting boltun");
    info!("Chat model: {}", config.chat_model);
    info!("Code model: {}", config.code_model);
    info!("Image model: {}", config.image_model);

    api::run(config).await
}

//! bidrelay daemon - relays bid submissions to a workflow webhook

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use bidrelay_server::config::Config;
use bidrelay_server::error::Result;
use bidrelay_server::relay::RelayServer;

/// bidrelay - forwards bid submissions to a workflow webhook
#[derive(Parser)]
#[command(name = "bidrelay")]
#[command(about = "Relays bid submissions to a workflow webhook and streams the reply back")]
#[command(version)]
pub struct Cli {
    /// Path to config file
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Override the listen address from the config file
    #[arg(long, short = 'l', global = true)]
    pub listen: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the relay server (default command)
    #[command(name = "serve")]
    Serve,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    load_env_files();
    init_logging();

    let cli = Cli::parse();

    match cli.command {
        None | Some(Command::Serve) => serve(cli.config, cli.listen).await,
    }
}

/// Pick up `N8N_WEBHOOK_URL` from `.env.local` / `.env` when present
fn load_env_files() {
    dotenv::from_filename(".env.local").ok();
    dotenv::dotenv().ok();
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,bidrelay_server=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn serve(config_path: Option<PathBuf>, listen: Option<String>) -> Result<()> {
    tracing::info!("Starting bidrelay");

    let mut config = Config::load(config_path.as_deref())?;
    if let Some(addr) = listen {
        config.relay.listen_addr = addr;
    }
    tracing::debug!(
        listen_addr = %config.relay.listen_addr,
        route = %config.relay.route,
        "Config loaded"
    );

    RelayServer::new(config.relay).serve().await?;

    tracing::info!("bidrelay stopped");
    Ok(())
}

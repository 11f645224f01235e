use std::fs::File;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Context;
use bidrelay_cli::commands::submit::DEFAULT_RELAY_URL;
use bidrelay_cli::console::{RelayClient, SubmissionForm};
use bidrelay_tui::{App, EventHandler, Tui};
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "bidrelay-tui")]
#[command(about = "Interactive submission console for the bidrelay relay")]
#[command(version)]
struct Args {
    /// Relay endpoint URL
    #[arg(short, long, default_value = DEFAULT_RELAY_URL)]
    relay: String,

    /// Company profile PDF
    #[arg(long)]
    company: Option<PathBuf>,

    /// RFP document PDF
    #[arg(long)]
    rfp: Option<PathBuf>,

    /// Initial prompt
    #[arg(short, long)]
    message: Option<String>,

    /// Start with log streaming off
    #[arg(long)]
    no_logs: bool,

    /// Write diagnostics to this file (the screen is never used for logs)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if let Some(path) = &args.log_file {
        let file = File::create(path)
            .with_context(|| format!("Failed to create log file {}", path.display()))?;
        tracing_subscriber::registry()
            .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .init();
    }

    let transport = RelayClient::new(&args.relay).context("Invalid relay URL")?;
    let form = SubmissionForm {
        company: args.company,
        rfp: args.rfp,
        message: args.message.unwrap_or_default(),
    };

    let mut events = EventHandler::new(Duration::from_millis(100));
    let mut app = App::new(Arc::new(transport), form, !args.no_logs, events.sender());

    let mut tui = Tui::new()?;
    tui.enter()?;

    let result = run(&mut tui, &mut app, &mut events).await;

    tui.exit()?;
    result
}

async fn run(tui: &mut Tui, app: &mut App, events: &mut EventHandler) -> anyhow::Result<()> {
    while !app.should_quit {
        tui.draw(app)?;
        match events.next().await {
            Some(event) => app.handle_event(event),
            None => break,
        }
    }
    Ok(())
}

use clap::{Parser, Subcommand};
use bidrelay_cli::commands::{ClassifyCommand, SubmitCommand};
use bidrelay_cli::error::CliResult;
use bidrelay_cli::output::OutputFormat;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "bidrelay-cli")]
#[command(about = "Bidrelay CLI - Submit RFP documents through the relay and inspect the reply")]
#[command(version)]
pub struct Cli {
    #[clap(long, short, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    #[clap(about = "Submit documents to the relay and show the reply")]
    Submit(SubmitCommand),

    #[clap(about = "Flatten and bucket a saved webhook reply")]
    Classify(ClassifyCommand),
}

#[tokio::main]
async fn main() {
    init_logging();

    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Diagnostics go to stderr so `--json` output stays clean
fn init_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run() -> CliResult<()> {
    let cli = Cli::parse();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Table
    };

    match &cli.command {
        Command::Submit(cmd) => cmd.execute(format).await,
        Command::Classify(cmd) => cmd.execute(format).await,
    }
}

mod chat;
mod config;
mod console;
mod input;
mod wizard;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::QuoteConfig;

#[derive(Parser, Debug)]
#[command(name = "car-quote", version, about = "Car insurance quote chatbot and wizard")]
struct Cli {
    #[command(flatten)]
    config: QuoteConfig,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Answer one question at a time, chat style
    Chat,
    /// Fill in the quote form one screen at a time
    Wizard,
}

/// Initialize tracing on stderr based on environment variables
fn init_tracing() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "car_quote=warn,quote_flow=warn".into());

    match log_format.as_str() {
        "json" => {
            // Structured JSON logging
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_level(true)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            // Human-readable logging
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Chat => chat::run(&cli.config).await,
        Commands::Wizard => wizard::run(&cli.config).await,
    }
}

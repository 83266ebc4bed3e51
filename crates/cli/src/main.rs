//! Protochain CLI — the main entry point.
//!
//! Commands:
//! - `init`   — Scaffold config, pattern documents, and reservoir
//! - `run`    — Execute the protocol chain against user input
//! - `status` — Show configuration, protocols, and working-memory state

use clap::{Parser, Subcommand};

mod commands;
mod input;

#[derive(Parser)]
#[command(
    name = "protochain",
    about = "Protochain — sequential protocol-chaining orchestrator",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Scaffold configuration, pattern documents, and a starter reservoir
    Init,

    /// Run the protocol chain against user input
    Run {
        /// Use this text as the raw user input instead of opening an editor
        #[arg(short, long)]
        input: Option<String>,

        /// Run without a model backend (echoes prompt digests)
        #[arg(long)]
        offline: bool,
    },

    /// Show configuration, protocols, and working-memory state
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Init => commands::init::run()?,
        Commands::Run { input, offline } => commands::run::run(input, offline).await?,
        Commands::Status => commands::status::run()?,
    }

    Ok(())
}

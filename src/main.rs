//! DocArray CLI
//!
//! Command-line interface for the DocArray audio encoders.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use docarray::cli::{commands, Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "docarray=debug" } else { "docarray=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Commands::AudioBytes { input, output } => commands::audio_bytes(&input, &output),
        Commands::Wav {
            input,
            output,
            sample_rate,
        } => commands::wav(&input, &output, sample_rate),
    }
}

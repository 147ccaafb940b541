mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // stdout carries JSON responses, so logs go to stderr
    let default_level = std::env::var("HEADROOM_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Compress { file } => commands::compress::run(file.as_deref()),
        Commands::Retrieve {
            hash,
            query,
            max_results,
        } => commands::retrieve::run(hash, query, max_results),
        Commands::Analyze { query, turn } => commands::analyze::run(query, turn),
        Commands::Health => commands::health::run(),
        Commands::Metrics => commands::metrics::run(),
        Commands::Config => commands::config::run(),
        Commands::Serve => commands::serve::run(),
        Commands::Version => commands::version::run(),
    }
}

//! startup-cache - inspect and maintain the extension startup cache
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use startup_cache::cli::{commands, Cli, Commands};
use startup_cache::config::ConfigManager;
use startup_cache::error::StartupCacheResult;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> StartupCacheResult<()> {
    let cli = Cli::parse();

    let manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let mut config = manager.load().await?;

    init_logging(cli.verbose, &config.general.log_format);

    if let Some(file) = cli.file {
        debug!("Cache file overridden: {}", file.display());
        config.cache.file = Some(file);
    }

    match cli.command {
        Commands::Show(args) => commands::show(args, &config).await,
        Commands::Get(args) => commands::get(args, &config).await,
        Commands::Set(args) => commands::set(args, &config).await,
        Commands::Remove(args) => commands::remove(args, &config).await,
        Commands::Clear(args) => commands::clear(args, &config).await,
        Commands::Invalidate => commands::invalidate(&config).await,
        Commands::Info => commands::info(&config).await,
        Commands::Stats(args) => commands::stats(args, &config).await,
        Commands::Path => {
            commands::path(&config);
            Ok(())
        }
        Commands::Config(args) => commands::config(args, &config, &manager).await,
    }
}

/// 0 = warn, 1 = info (includes telemetry records), 2+ = debug
fn init_logging(verbose: u8, log_format: &str) {
    let filter = match verbose {
        0 => EnvFilter::new("startup_cache=warn"),
        1 => EnvFilter::new("startup_cache=info"),
        _ => EnvFilter::new("startup_cache=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();

    if log_format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// startup-cache - inspect and maintain the extension startup cache
///
/// Reads and writes the single-file cache of precomputed extension data
/// that speeds up process startup.
#[derive(Parser, Debug)]
#[command(name = "startup-cache")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "STARTUP_CACHE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Cache file to operate on (overrides cache.file)
    #[arg(short, long, global = true, env = "STARTUP_CACHE_FILE")]
    pub file: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List cached entries
    Show(ShowArgs),

    /// Print one cached entry as JSON
    Get(GetArgs),

    /// Store an entry and save the cache
    Set(SetArgs),

    /// Remove an entry and save the cache
    Remove(RemoveArgs),

    /// Remove entries and save the cache
    Clear(ClearArgs),

    /// Delete the cache file
    Invalidate,

    /// Show cache file details
    Info,

    /// Load the cache once and print the telemetry it records
    Stats(StatsArgs),

    /// Print the cache file path
    Path,

    /// Show or edit configuration
    Config(ConfigArgs),
}

/// Arguments for the show command
#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Output format
    #[arg(short = 'o', long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the get command
#[derive(Parser, Debug)]
pub struct GetArgs {
    /// Entry key
    pub key: String,
}

/// Arguments for the set command
#[derive(Parser, Debug)]
pub struct SetArgs {
    /// Entry key (e.g. ext@example.org/manifest)
    pub key: String,

    /// Entry value as JSON
    pub value: String,
}

/// Arguments for the remove command
#[derive(Parser, Debug)]
pub struct RemoveArgs {
    /// Entry key
    pub key: String,
}

/// Arguments for the clear command
#[derive(Parser, Debug)]
pub struct ClearArgs {
    /// Only remove entries of this add-on
    #[arg(long)]
    pub addon: Option<String>,
}

/// Arguments for the stats command
#[derive(Parser, Debug)]
pub struct StatsArgs {
    /// Save the loaded cache afterwards to record the write size
    #[arg(long)]
    pub save: bool,

    /// Output format
    #[arg(short = 'o', long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(long)]
        force: bool,
    },
}

/// Output format for listing commands
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}

//! Show command - list cached entries

use super::load_cache;
use crate::cache::{addon_id_of, CacheData};
use crate::cli::args::{OutputFormat, ShowArgs};
use crate::config::Config;
use crate::error::StartupCacheResult;

/// Execute the show command
pub async fn execute(args: ShowArgs, config: &Config) -> StartupCacheResult<()> {
    let cache = load_cache(config).await;
    let data = cache.snapshot();

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&data)?),
        OutputFormat::Plain => {
            for key in data.keys() {
                println!("{}", key);
            }
        }
        OutputFormat::Table if data.is_empty() => println!("No cached entries."),
        OutputFormat::Table => print_table(&data),
    }

    Ok(())
}

fn print_table(data: &CacheData) {
    println!("{:<48} {:<32} {:>10}", "KEY", "ADDON", "SIZE");
    println!("{}", "-".repeat(92));

    for (key, entry) in data {
        // Size of the entry as it appears in the blob payload
        let size = serde_json::to_vec(entry).map(|v| v.len()).unwrap_or(0);
        println!("{:<48} {:<32} {:>10}", key, addon_id_of(key), size);
    }

    println!();
    println!("Total: {} entr{}", data.len(), if data.len() == 1 { "y" } else { "ies" });
}

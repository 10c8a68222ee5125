//! Entry commands - get, set and remove single cache entries

use super::load_cache;
use crate::cli::args::{GetArgs, RemoveArgs, SetArgs};
use crate::config::Config;
use crate::error::{StartupCacheError, StartupCacheResult};
use crate::ui::{self, UiContext};

/// Print one entry as JSON
pub async fn get(args: GetArgs, config: &Config) -> StartupCacheResult<()> {
    let cache = load_cache(config).await;
    let entry = cache
        .get(&args.key)
        .ok_or(StartupCacheError::EntryNotFound(args.key))?;

    println!("{}", serde_json::to_string_pretty(&entry)?);
    Ok(())
}

/// Store an entry and save the cache
pub async fn set(args: SetArgs, config: &Config) -> StartupCacheResult<()> {
    let entry: serde_json::Value =
        serde_json::from_str(&args.value).map_err(|e| StartupCacheError::EntryInvalid {
            key: args.key.clone(),
            reason: e.to_string(),
        })?;

    let cache = load_cache(config).await;
    cache.set(args.key.as_str(), entry);
    let outcome = cache.save().await?;

    ui::step_ok_detail(
        &UiContext::detect(),
        &format!("Set {}", args.key),
        &format!("{} bytes written", outcome.byte_length),
    );
    Ok(())
}

/// Remove an entry and save the cache
pub async fn remove(args: RemoveArgs, config: &Config) -> StartupCacheResult<()> {
    let cache = load_cache(config).await;
    if cache.remove(&args.key).is_none() {
        return Err(StartupCacheError::EntryNotFound(args.key));
    }
    cache.save().await?;

    ui::step_ok(&UiContext::detect(), &format!("Removed {}", args.key));
    Ok(())
}

//! Clear and invalidate commands

use super::load_cache;
use crate::cache::{FileStorage, StartupCache, STALE_TEMP_AGE};
use crate::cli::args::ClearArgs;
use crate::config::Config;
use crate::error::StartupCacheResult;
use crate::ui::{self, UiContext};

/// Remove entries (all, or one add-on's) and save the cache
pub async fn execute(args: ClearArgs, config: &Config) -> StartupCacheResult<()> {
    let ctx = UiContext::detect();
    let cache = load_cache(config).await;

    let removed = match &args.addon {
        Some(addon_id) => cache.clear_addon_data(addon_id),
        None => {
            let count = cache.len();
            cache.clear();
            count
        }
    };

    match cache.flush().await? {
        Some(outcome) => ui::step_ok_detail(
            &ctx,
            &format!("Removed {} entries", removed),
            &format!("{} bytes written", outcome.byte_length),
        ),
        None => ui::step_info(&ctx, "Nothing to remove"),
    }

    Ok(())
}

/// Delete the cache file and temp files orphaned by interrupted writes
pub async fn invalidate(config: &Config) -> StartupCacheResult<()> {
    let ctx = UiContext::detect();
    let cache = StartupCache::from_config(config);
    cache.invalidate().await?;

    ui::step_ok_detail(
        &ctx,
        "Startup cache invalidated",
        &cache.file().display().to_string(),
    );

    let swept = FileStorage::new()
        .sweep_temp_files(&cache.file(), STALE_TEMP_AGE)
        .await?;
    if swept > 0 {
        ui::step_warn(&ctx, &format!("Removed {} orphaned temp file(s)", swept));
    }
    Ok(())
}

//! Info and path commands

use crate::cache::{blob_digest, LoadStatus, StartupCache};
use crate::config::Config;
use crate::error::{StartupCacheError, StartupCacheResult};
use crate::ui::{self, UiContext};
use std::io::ErrorKind;
use tokio::fs;

/// Show cache file details and the outcome of loading it
///
/// Read-only: nothing on disk is changed.
pub async fn execute(config: &Config) -> StartupCacheResult<()> {
    let ctx = UiContext::detect();
    let path = config.cache.file_path();

    ui::section(&ctx, "Startup cache");
    ui::key_value(&ctx, "File", &path.display().to_string());
    ui::key_value(&ctx, "App version", &config.cache.app_version);

    match fs::read(&path).await {
        Ok(bytes) => {
            ui::key_value_status(&ctx, "Status", "present", true);
            ui::key_value(&ctx, "Size", &format!("{} bytes", bytes.len()));
            match blob_digest(&bytes) {
                Some(digest) => ui::key_value(&ctx, "SHA256", &digest),
                None => ui::key_value_status(&ctx, "SHA256", "unrecognized header", false),
            }
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            ui::key_value_status(&ctx, "Status", "missing", false);
        }
        Err(e) => {
            return Err(StartupCacheError::io(
                format!("reading cache file {}", path.display()),
                e,
            ))
        }
    }

    let cache = StartupCache::from_config(config);
    let outcome = cache.load().await;

    ui::section(&ctx, "Load");
    ui::key_value(&ctx, "State", &format!("{:?}", cache.load_state()));
    ui::key_value(&ctx, "Entries", &outcome.entries().to_string());
    ui::key_value(&ctx, "Duration", &format!("{:?}", outcome.duration));
    match outcome.status {
        LoadStatus::Loaded { .. } => {}
        LoadStatus::Failed(failure) if failure.is_expected() => {
            ui::remark(&ctx, "No cache yet; it is created on the first save");
        }
        LoadStatus::Failed(failure) => {
            ui::step_warn_hint(&ctx, &failure.to_string(), "Run: startup-cache invalidate");
        }
    }

    Ok(())
}

/// Print the cache file path
pub fn path(config: &Config) {
    println!("{}", config.cache.file_path().display());
}

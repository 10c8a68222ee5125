//! CLI command implementations

pub mod clear;
pub mod config;
pub mod entry;
pub mod info;
pub mod show;
pub mod stats;

pub use clear::{execute as clear, invalidate};
pub use config::execute as config;
pub use entry::{get, remove, set};
pub use info::{execute as info, path};
pub use show::execute as show;
pub use stats::execute as stats;

use crate::cache::StartupCache;
use crate::config::Config;
use tracing::debug;

/// Open the configured cache and load it from disk
async fn load_cache(config: &Config) -> StartupCache {
    let cache = StartupCache::from_config(config);
    let outcome = cache.load().await;
    debug!(
        "Loaded {} entries in {:?} ({:?})",
        outcome.entries(),
        outcome.duration,
        cache.load_state()
    );
    cache
}

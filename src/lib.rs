//! Startup cache for precomputed extension data
//!
//! Persists manifests, locale tables and derived metadata to a single file
//! so later process starts can skip recomputation, and reports write size,
//! read errors and load time through pluggable telemetry sinks.
//!
//! ```rust,ignore
//! use startup_cache::{StartupCache, CacheKey};
//!
//! let cache = StartupCache::new("/var/lib/app/startupCache.blob");
//! cache.load().await;
//!
//! let key = CacheKey::new("ext@example.org").section("manifest");
//! let manifest = cache
//!     .get_or_insert_with(key.as_str(), || parse_manifest(&ext))
//!     .await?;
//!
//! cache.flush().await?;
//! ```

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod telemetry;
pub mod ui;

pub use cache::{CacheKey, LoadOutcome, LoadStatus, ReadFailure, SaveOutcome, StartupCache};
pub use error::{StartupCacheError, StartupCacheResult};
pub use telemetry::{Telemetry, TelemetrySink};

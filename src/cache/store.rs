//! In-memory startup cache with load/save persistence
//!
//! # Load state machine
//!
//! ```text
//! Idle -> Reading -> Decoding -> Loaded
//!            |           |
//!            +-----------+-----> ReadFailed
//! ```
//!
//! A missing or unreadable file goes straight from `Reading` to
//! `ReadFailed`. Load duration is recorded on entry to either terminal state.

use super::codec::{BlobCodec, CacheData, CacheEntry, JsonBlobCodec};
use super::key::addon_id_of;
use super::persist::{CacheStorage, FileStorage, ReadFailure};
use crate::config::Config;
use crate::error::StartupCacheResult;
use crate::telemetry::Telemetry;
use std::future::Future;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Phase of the most recent load attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Reading,
    Decoding,
    Loaded,
    ReadFailed,
}

impl LoadState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoadState::Loaded | LoadState::ReadFailed)
    }
}

/// How a load attempt ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    /// The file was decoded and installed
    Loaded { entries: usize },
    /// Nothing was installed; the store is empty
    Failed(ReadFailure),
}

/// Result of [`StartupCache::load`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOutcome {
    pub status: LoadStatus,
    /// Wall-clock time from the start of the read to the terminal state
    pub duration: Duration,
}

impl LoadOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self.status, LoadStatus::Loaded { .. })
    }

    pub fn failure(&self) -> Option<&ReadFailure> {
        match &self.status {
            LoadStatus::Failed(failure) => Some(failure),
            LoadStatus::Loaded { .. } => None,
        }
    }

    /// Number of entries installed (zero on failure)
    pub fn entries(&self) -> usize {
        match self.status {
            LoadStatus::Loaded { entries } => entries,
            LoadStatus::Failed(_) => 0,
        }
    }
}

/// Result of a successful [`StartupCache::save`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    pub path: PathBuf,
    /// Exact length of the blob written
    pub byte_length: usize,
    pub entries: usize,
}

/// Process-wide store of precomputed extension data
///
/// `get`/`set` only touch memory. `load`, `save` and `invalidate` are
/// serialized through one async lock, in the order they were issued.
pub struct StartupCache {
    data: RwLock<CacheData>,
    dirty: AtomicBool,
    file: RwLock<PathBuf>,
    state: Mutex<LoadState>,
    io_lock: tokio::sync::Mutex<()>,
    storage: Arc<dyn CacheStorage>,
    codec: Arc<dyn BlobCodec>,
    telemetry: Telemetry,
}

impl StartupCache {
    /// Create an empty cache persisted at `file`
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self {
            data: RwLock::new(CacheData::new()),
            dirty: AtomicBool::new(false),
            file: RwLock::new(file.into()),
            state: Mutex::new(LoadState::Idle),
            io_lock: tokio::sync::Mutex::new(()),
            storage: Arc::new(FileStorage::new()),
            codec: Arc::new(JsonBlobCodec::default()),
            telemetry: Telemetry::noop(),
        }
    }

    /// Create an empty cache from configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.cache.file_path())
            .with_codec(Arc::new(JsonBlobCodec::new(config.cache.app_version.as_str())))
            .with_telemetry(Telemetry::from_config(&config.telemetry))
    }

    /// Replace the storage backend
    pub fn with_storage(mut self, storage: Arc<dyn CacheStorage>) -> Self {
        self.storage = storage;
        self
    }

    /// Replace the blob codec
    pub fn with_codec(mut self, codec: Arc<dyn BlobCodec>) -> Self {
        self.codec = codec;
        self
    }

    /// Replace the telemetry sink
    pub fn with_telemetry(mut self, telemetry: Telemetry) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Cache file used by the next load or save
    pub fn file(&self) -> PathBuf {
        read_lock(&self.file).clone()
    }

    /// Point the cache at another file
    ///
    /// Takes effect for the next load or save; an operation already in
    /// flight keeps the path it started with.
    pub fn set_file(&self, path: impl Into<PathBuf>) {
        *write_lock(&self.file) = path.into();
    }

    pub fn get(&self, key: &str) -> Option<CacheEntry> {
        read_lock(&self.data).get(key).cloned()
    }

    /// Insert or overwrite an entry; persisted by the next save
    pub fn set(&self, key: impl Into<String>, entry: CacheEntry) {
        let mut data = write_lock(&self.data);
        data.insert(key.into(), entry);
        self.dirty.store(true, Ordering::SeqCst);
    }

    /// Cached entry, or the producer's result which is then cached
    ///
    /// A producer error is returned as-is and nothing is stored.
    pub async fn get_or_insert_with<F, Fut, E>(
        &self,
        key: &str,
        produce: F,
    ) -> Result<CacheEntry, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<CacheEntry, E>>,
    {
        if let Some(entry) = self.get(key) {
            return Ok(entry);
        }

        let entry = produce().await?;
        self.set(key, entry.clone());
        Ok(entry)
    }

    pub fn remove(&self, key: &str) -> Option<CacheEntry> {
        let mut data = write_lock(&self.data);
        let removed = data.remove(key);
        if removed.is_some() {
            self.dirty.store(true, Ordering::SeqCst);
        }
        removed
    }

    /// Drop every entry belonging to one add-on. Returns how many were removed.
    pub fn clear_addon_data(&self, addon_id: &str) -> usize {
        let mut data = write_lock(&self.data);
        let before = data.len();
        data.retain(|key, _| addon_id_of(key) != addon_id);
        let removed = before - data.len();
        if removed > 0 {
            self.dirty.store(true, Ordering::SeqCst);
        }
        removed
    }

    /// Empty the in-memory store
    pub fn clear(&self) {
        let mut data = write_lock(&self.data);
        if !data.is_empty() {
            data.clear();
            self.dirty.store(true, Ordering::SeqCst);
        }
    }

    pub fn len(&self) -> usize {
        read_lock(&self.data).len()
    }

    pub fn is_empty(&self) -> bool {
        read_lock(&self.data).is_empty()
    }

    pub fn keys(&self) -> Vec<String> {
        read_lock(&self.data).keys().cloned().collect()
    }

    /// Copy of the full mapping
    pub fn snapshot(&self) -> CacheData {
        read_lock(&self.data).clone()
    }

    /// Whether memory holds changes not yet saved
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    /// Phase of the most recent load attempt
    pub fn load_state(&self) -> LoadState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace memory with the content of the cache file
    ///
    /// Never fails: a missing, unreadable or undecodable file leaves the
    /// store empty and is reported in the outcome. Every call performs a
    /// fresh read.
    pub async fn load(&self) -> LoadOutcome {
        let _io = self.io_lock.lock().await;
        let path = self.file();
        let started = Instant::now();

        self.set_state(LoadState::Reading);
        let decoded = match self.storage.read(&path).await {
            Ok(bytes) => {
                self.set_state(LoadState::Decoding);
                self.codec
                    .decode(&bytes)
                    .map_err(|e| ReadFailure::Decode(decode_reason(e)))
            }
            Err(failure) => Err(failure),
        };

        let status = match decoded {
            Ok(data) => {
                let entries = data.len();
                self.install(data);
                self.set_state(LoadState::Loaded);
                debug!("Loaded {} startup cache entries from {}", entries, path.display());
                LoadStatus::Loaded { entries }
            }
            Err(failure) => {
                self.install(CacheData::new());
                self.set_state(LoadState::ReadFailed);
                if failure.is_expected() {
                    debug!("No startup cache at {}", path.display());
                } else {
                    warn!("Discarding startup cache {}: {}", path.display(), failure);
                }
                LoadStatus::Failed(failure)
            }
        };
        let duration = started.elapsed();

        self.telemetry.record_duration(duration);
        if let LoadStatus::Failed(failure) = &status {
            self.telemetry.record_read_error(failure.telemetry_key());
        }

        LoadOutcome { status, duration }
    }

    /// Write the complete mapping to the cache file
    ///
    /// The mapping is captured after any earlier load or save has finished,
    /// so every `set` issued before this call is included.
    pub async fn save(&self) -> StartupCacheResult<SaveOutcome> {
        let _io = self.io_lock.lock().await;
        let path = self.file();

        let (blob, entries, was_dirty) = {
            let data = read_lock(&self.data);
            let blob = self.codec.encode(&data)?;
            (blob, data.len(), self.dirty.swap(false, Ordering::SeqCst))
        };

        if let Err(e) = self.storage.write(&path, &blob).await {
            if was_dirty {
                self.dirty.store(true, Ordering::SeqCst);
            }
            warn!("Failed to save startup cache: {}", e);
            return Err(e);
        }

        self.telemetry.record_write_size(blob.len() as u64);
        info!(
            "Saved {} startup cache entries ({} bytes) to {}",
            entries,
            blob.len(),
            path.display()
        );

        Ok(SaveOutcome {
            path,
            byte_length: blob.len(),
            entries,
        })
    }

    /// Save only if memory changed since the last load or save
    pub async fn flush(&self) -> StartupCacheResult<Option<SaveOutcome>> {
        if !self.is_dirty() {
            debug!("Startup cache unchanged, skipping save");
            return Ok(None);
        }
        self.save().await.map(Some)
    }

    /// Empty memory and delete the cache file
    pub async fn invalidate(&self) -> StartupCacheResult<()> {
        let _io = self.io_lock.lock().await;
        let path = self.file();

        self.install(CacheData::new());
        self.storage.remove(&path).await?;

        info!("Invalidated startup cache at {}", path.display());
        Ok(())
    }

    /// Replace memory wholesale and mark it clean
    fn install(&self, data: CacheData) {
        let mut current = write_lock(&self.data);
        *current = data;
        self.dirty.store(false, Ordering::SeqCst);
    }

    fn set_state(&self, state: LoadState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }
}

impl std::fmt::Debug for StartupCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StartupCache")
            .field("file", &self.file())
            .field("entries", &self.len())
            .field("dirty", &self.is_dirty())
            .field("load_state", &self.load_state())
            .finish_non_exhaustive()
    }
}

fn decode_reason(err: crate::error::StartupCacheError) -> String {
    match err {
        crate::error::StartupCacheError::CacheDecode(reason) => reason,
        other => other.to_string(),
    }
}

fn read_lock<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write_lock<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

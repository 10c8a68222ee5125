//! Startup cache for precomputed extension data
//!
//! Holds manifests, locale tables and other derived metadata in memory and
//! persists them to a single file, so the next process start can skip
//! recomputation.
//!
//! # Components
//!
//! | Module | Role |
//! |--------|------|
//! | `store` | In-memory mapping, load/save orchestration, telemetry hooks |
//! | `persist` | Atomic file writes, classified reads |
//! | `codec` | Blob framing and version check |
//! | `key` | Per-add-on key construction |
//!
//! # Failure Model
//!
//! | Failure | On load | On save |
//! |---------|---------|---------|
//! | File missing | empty store, `NotFoundError` counted | n/a |
//! | Corrupt / stale blob | empty store, `DecodeError` counted | n/a |
//! | I/O error | empty store, `IOError` counted | error returned, nothing recorded |

pub mod codec;
pub mod key;
pub mod persist;
pub mod store;

pub use codec::{blob_digest, BlobCodec, CacheData, CacheEntry, JsonBlobCodec, BLOB_MAGIC};
pub use key::{addon_id_of, CacheKey};
pub use persist::{CacheStorage, FileStorage, ReadFailure, STALE_TEMP_AGE};
pub use store::{LoadOutcome, LoadState, LoadStatus, SaveOutcome, StartupCache};

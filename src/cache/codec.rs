//! Blob encoding for the startup cache file
//!
//! Blob layout:
//!
//! | Offset | Length | Content |
//! |--------|--------|---------|
//! | 0 | 4 | Magic `SCB1` |
//! | 4 | 32 | SHA256 of the payload |
//! | 36 | n | JSON payload: `{"app_version": .., "entries": {..}}` |
//!
//! A blob written by a different application version decodes as an error,
//! so an upgrade starts from an empty cache instead of serving stale data.

use crate::error::{StartupCacheError, StartupCacheResult};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// A single cached value. Structure is owned by the producer.
pub type CacheEntry = serde_json::Value;

/// The full in-memory mapping persisted by the cache
pub type CacheData = BTreeMap<String, CacheEntry>;

/// Leading bytes of every blob
pub const BLOB_MAGIC: &[u8; 4] = b"SCB1";

const DIGEST_LEN: usize = 32;
const HEADER_LEN: usize = BLOB_MAGIC.len() + DIGEST_LEN;

/// Converts the cache mapping to and from bytes
///
/// Implementations must be deterministic and lossless:
/// `decode(encode(data)) == data`.
pub trait BlobCodec: Send + Sync {
    /// Encode the complete mapping
    fn encode(&self, data: &CacheData) -> StartupCacheResult<Vec<u8>>;

    /// Decode a blob produced by [`BlobCodec::encode`]
    ///
    /// Every failure is reported as [`StartupCacheError::CacheDecode`].
    fn decode(&self, bytes: &[u8]) -> StartupCacheResult<CacheData>;
}

#[derive(Serialize)]
struct PayloadRef<'a> {
    app_version: &'a str,
    entries: &'a CacheData,
}

#[derive(Deserialize)]
struct Payload {
    app_version: String,
    entries: CacheData,
}

/// Default codec: digest-framed JSON tagged with the application version
#[derive(Debug, Clone)]
pub struct JsonBlobCodec {
    app_version: String,
}

impl JsonBlobCodec {
    /// Create a codec bound to an application version
    pub fn new(app_version: impl Into<String>) -> Self {
        Self {
            app_version: app_version.into(),
        }
    }

    /// Application version written into, and required from, every blob
    pub fn app_version(&self) -> &str {
        &self.app_version
    }
}

impl Default for JsonBlobCodec {
    fn default() -> Self {
        Self::new(env!("CARGO_PKG_VERSION"))
    }
}

impl BlobCodec for JsonBlobCodec {
    fn encode(&self, data: &CacheData) -> StartupCacheResult<Vec<u8>> {
        let payload = serde_json::to_vec(&PayloadRef {
            app_version: &self.app_version,
            entries: data,
        })
        .map_err(|e| StartupCacheError::CacheEncode(e.to_string()))?;

        let digest = Sha256::digest(&payload);

        let mut blob = Vec::with_capacity(HEADER_LEN + payload.len());
        blob.extend_from_slice(BLOB_MAGIC);
        blob.extend_from_slice(&digest);
        blob.extend_from_slice(&payload);
        Ok(blob)
    }

    fn decode(&self, bytes: &[u8]) -> StartupCacheResult<CacheData> {
        if bytes.len() < HEADER_LEN {
            return Err(StartupCacheError::CacheDecode(format!(
                "blob too short ({} bytes)",
                bytes.len()
            )));
        }

        let (magic, rest) = bytes.split_at(BLOB_MAGIC.len());
        if magic != BLOB_MAGIC {
            return Err(StartupCacheError::CacheDecode(
                "unrecognized blob header".to_string(),
            ));
        }

        let (expected, payload) = rest.split_at(DIGEST_LEN);
        if Sha256::digest(payload).as_slice() != expected {
            return Err(StartupCacheError::CacheDecode(
                "payload digest mismatch".to_string(),
            ));
        }

        let payload: Payload = serde_json::from_slice(payload)
            .map_err(|e| StartupCacheError::CacheDecode(e.to_string()))?;

        if payload.app_version != self.app_version {
            return Err(StartupCacheError::CacheDecode(format!(
                "written by version {}, expected {}",
                payload.app_version, self.app_version
            )));
        }

        Ok(payload.entries)
    }
}

/// Hex digest stored in a blob header, if the header is well-formed
pub fn blob_digest(bytes: &[u8]) -> Option<String> {
    if bytes.len() < HEADER_LEN || &bytes[..BLOB_MAGIC.len()] != BLOB_MAGIC {
        return None;
    }
    Some(hex::encode(&bytes[BLOB_MAGIC.len()..HEADER_LEN]))
}

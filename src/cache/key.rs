//! Cache key construction
//!
//! Keys are plain strings in the store. Producers that cache several
//! sections per add-on build them with [`CacheKey`] so that all data for one
//! add-on shares the `<addon_id>/` prefix and can be dropped together.

use std::fmt;

const SEPARATOR: char = '/';

/// Hierarchical key: add-on ID followed by section names
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Key for an add-on with no sections
    pub fn new(addon_id: &str) -> Self {
        Self(addon_id.to_string())
    }

    /// Append a section, e.g. `"manifest"` or a locale
    pub fn section(mut self, name: &str) -> Self {
        self.0.push(SEPARATOR);
        self.0.push_str(name);
        self
    }

    /// The add-on this key belongs to
    pub fn addon_id(&self) -> &str {
        addon_id_of(&self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Add-on ID portion of a raw key
pub fn addon_id_of(key: &str) -> &str {
    key.split(SEPARATOR).next().unwrap_or(key)
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<CacheKey> for String {
    fn from(key: CacheKey) -> Self {
        key.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_sectioned_key() {
        let key = CacheKey::new("ext@example.org")
            .section("manifest")
            .section("en-US");

        assert_eq!(key.as_str(), "ext@example.org/manifest/en-US");
        assert_eq!(key.addon_id(), "ext@example.org");
    }

    #[test]
    fn bare_key_is_its_own_addon() {
        assert_eq!(addon_id_of("ext-1"), "ext-1");
        assert_eq!(CacheKey::new("ext-1").to_string(), "ext-1");
    }
}

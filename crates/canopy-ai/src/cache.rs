//! Page-response cache: avoids re-invoking the generator for a target
//! whose source signature hasn't changed since the last build.

use dashmap::DashMap;

struct CacheEntry {
    source_hash: String,
    content: String,
}

#[derive(Default)]
pub struct ResponseCache {
    entries: DashMap<String, CacheEntry>,
}

impl ResponseCache {
    pub fn new() -> Self {
        ResponseCache { entries: DashMap::new() }
    }

    /// Returns the cached page content for `key` if present and its stored
    /// signature matches `source_hash`.
    pub fn get(&self, key: &str, source_hash: &str) -> Option<String> {
        self.entries
            .get(key)
            .filter(|entry| entry.source_hash == source_hash)
            .map(|entry| entry.content.clone())
    }

    pub fn put(&self, key: String, source_hash: String, content: String) {
        self.entries.insert(key, CacheEntry { source_hash, content });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_none_on_signature_mismatch() {
        let cache = ResponseCache::new();
        cache.put("file:a.rs".to_string(), "hash1".to_string(), "stale body".to_string());
        assert!(cache.get("file:a.rs", "hash2").is_none());
        assert_eq!(cache.get("file:a.rs", "hash1").as_deref(), Some("stale body"));
    }

    #[test]
    fn starts_empty() {
        let cache = ResponseCache::new();
        assert!(cache.is_empty());
    }
}

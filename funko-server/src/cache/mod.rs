//! Read-through Response Cache
//!
//! TTL'd cache for hot catalog reads, keyed `resource:key`. Mutating
//! handlers invalidate their resource's prefix; order data is never
//! cached. The payload is the serialized response value, so a hit skips
//! the store entirely.

use dashmap::DashMap;
use shared::util::now_millis;

/// Default entry lifetime (one minute, like the original interceptor)
const DEFAULT_TTL_MS: i64 = 60_000;

#[derive(Debug, Clone)]
struct Entry {
    value: serde_json::Value,
    stored_at: i64,
}

#[derive(Debug)]
pub struct ResponseCache {
    entries: DashMap<String, Entry>,
    ttl_ms: i64,
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL_MS)
    }
}

impl ResponseCache {
    pub fn new(ttl_ms: i64) -> Self {
        Self {
            entries: DashMap::new(),
            ttl_ms,
        }
    }

    fn key(resource: &str, key: &str) -> String {
        format!("{resource}:{key}")
    }

    /// Fresh cached value, if any.
    pub fn get(&self, resource: &str, key: &str) -> Option<serde_json::Value> {
        let full_key = Self::key(resource, key);
        let entry = self.entries.get(&full_key)?;
        if now_millis() - entry.stored_at > self.ttl_ms {
            drop(entry);
            self.entries.remove(&full_key);
            return None;
        }
        Some(entry.value.clone())
    }

    pub fn put(&self, resource: &str, key: &str, value: serde_json::Value) {
        self.entries.insert(
            Self::key(resource, key),
            Entry {
                value,
                stored_at: now_millis(),
            },
        );
    }

    /// Drop every entry of a resource. Called after any mutation of it.
    pub fn invalidate(&self, resource: &str) {
        let prefix = format!("{resource}:");
        self.entries.retain(|key, _| !key.starts_with(&prefix));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_after_put() {
        let cache = ResponseCache::default();
        cache.put("funko", "all", serde_json::json!([1, 2]));
        assert_eq!(cache.get("funko", "all"), Some(serde_json::json!([1, 2])));
    }

    #[test]
    fn invalidate_clears_only_that_resource() {
        let cache = ResponseCache::default();
        cache.put("funko", "all", serde_json::json!(1));
        cache.put("funko", "7", serde_json::json!(2));
        cache.put("category", "all", serde_json::json!(3));

        cache.invalidate("funko");

        assert!(cache.get("funko", "all").is_none());
        assert!(cache.get("funko", "7").is_none());
        assert!(cache.get("category", "all").is_some());
    }

    #[test]
    fn expired_entries_miss() {
        let cache = ResponseCache::new(0);
        cache.put("funko", "all", serde_json::json!(1));
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(cache.get("funko", "all").is_none());
    }
}

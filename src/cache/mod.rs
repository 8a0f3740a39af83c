//! Rendered-result cache
//!
//! Entries are keyed by a resource string (tenant, result kind and
//! representation) plus a SHA-256 digest of the canonical filter. The cache
//! stores rendered bytes; callers decide whether a result is worth keeping.

use std::num::NonZeroUsize;
use std::time::Instant;

use axum::body::Bytes;
use lru::LruCache;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::config::CacheConfig;
use crate::filter::Filter;
use crate::types::Representation;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(resource: &str, filter: &Filter) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(resource.as_bytes());
        hasher.update([0u8]);
        hasher.update(filter.canonical());
        Self(format!("{}:{:x}", resource, hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    payload: Bytes,
    inserted_at: Instant,
}

/// Resource string that keeps tenants and representations apart
pub fn resource_name(tenant_id: &str, kind: &str, representation: Representation) -> String {
    format!("{}/{}/{}", tenant_id, kind, representation.as_str())
}

pub struct ResultCache {
    entries: Option<Mutex<LruCache<CacheKey, CacheEntry>>>,
}

impl ResultCache {
    pub fn new(config: &CacheConfig) -> Self {
        let entries = match (config.enabled, NonZeroUsize::new(config.capacity)) {
            (true, Some(capacity)) => Some(Mutex::new(LruCache::new(capacity))),
            _ => None,
        };
        Self { entries }
    }

    pub fn hit(&self, resource: &str, filter: &Filter) -> Option<Bytes> {
        let entries = self.entries.as_ref()?;
        let key = CacheKey::new(resource, filter);
        let mut entries = entries.lock();
        let entry = entries.get(&key)?;
        debug!("Cache hit for {} ({:?} old)", key.as_str(), entry.inserted_at.elapsed());
        Some(entry.payload.clone())
    }

    /// Last write wins
    pub fn write(&self, resource: &str, filter: &Filter, payload: Bytes) {
        if let Some(entries) = &self.entries {
            let key = CacheKey::new(resource, filter);
            entries.lock().put(key, CacheEntry { payload, inserted_at: Instant::now() });
        }
    }

    pub fn len(&self) -> usize {
        self.entries.as_ref().map(|entries| entries.lock().len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::RawParams;

    fn filter(query: &str) -> Filter {
        Filter::from_params(&RawParams::parse(Some(query))).unwrap()
    }

    fn cache(capacity: usize) -> ResultCache {
        ResultCache::new(&CacheConfig { enabled: true, capacity })
    }

    #[test]
    fn write_then_hit() {
        let cache = cache(4);
        let f = filter("group_name=A");
        assert!(cache.hit("t1/sites/xml", &f).is_none());
        cache.write("t1/sites/xml", &f, Bytes::from_static(b"<root/>"));
        assert_eq!(cache.hit("t1/sites/xml", &f).unwrap(), Bytes::from_static(b"<root/>"));
    }

    #[test]
    fn resources_do_not_share_entries() {
        let cache = cache(4);
        let f = filter("group_name=A");
        cache.write(&resource_name("t1", "sites", Representation::Xml), &f, Bytes::from_static(b"a"));
        assert!(cache.hit(&resource_name("t2", "sites", Representation::Xml), &f).is_none());
        assert!(cache.hit(&resource_name("t1", "sites", Representation::Json), &f).is_none());
    }

    #[test]
    fn disabled_or_zero_capacity_never_stores() {
        let f = filter("group_name=A");
        for config in [CacheConfig { enabled: false, capacity: 8 }, CacheConfig { enabled: true, capacity: 0 }] {
            let cache = ResultCache::new(&config);
            cache.write("r", &f, Bytes::from_static(b"1"));
            assert!(cache.hit("r", &f).is_none());
            assert!(cache.is_empty());
        }
    }

    #[test]
    fn overwrite_replaces_and_capacity_evicts() {
        let cache = cache(1);
        let a = filter("group_name=A");
        let b = filter("group_name=B");
        cache.write("r", &a, Bytes::from_static(b"1"));
        cache.write("r", &a, Bytes::from_static(b"2"));
        assert_eq!(cache.hit("r", &a).unwrap(), Bytes::from_static(b"2"));
        cache.write("r", &b, Bytes::from_static(b"3"));
        assert!(cache.hit("r", &a).is_none());
        assert_eq!(cache.len(), 1);
    }
}

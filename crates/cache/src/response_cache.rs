//! The interface an HTTP client layer uses to consult the cache

use crate::entry::CacheEntry;
use crate::storage::CacheStorage;
use crate::Result;

/// Combinator that merges a revalidation result into the cached entry
pub type Revalidation<'a> = Box<dyn FnOnce(Option<CacheEntry>) -> Result<CacheEntry> + 'a>;

/// Storage backend for an HTTP client cache
///
/// Freshness and validation rules belong to the caller; implementations only
/// store and return whatever entries they are given.
pub trait ResponseCache: Send + Sync {
    /// Cached response for `key`, if any
    fn lookup(&self, key: &str) -> Option<CacheEntry>;

    /// Cache `response` under `key`
    ///
    /// # Errors
    ///
    /// Returns an error if the response could not be persisted.
    fn store(&self, key: &str, response: CacheEntry) -> Result<()>;

    /// Forget `key`
    fn invalidate(&self, key: &str);

    /// Replace the entry for `key` with the combinator's result
    ///
    /// # Errors
    ///
    /// Returns the combinator's error, or an error if the result could not be
    /// persisted.
    fn revalidate(&self, key: &str, combine: Revalidation<'_>) -> Result<()>;
}

impl ResponseCache for CacheStorage {
    fn lookup(&self, key: &str) -> Option<CacheEntry> {
        self.get(key)
    }

    fn store(&self, key: &str, response: CacheEntry) -> Result<()> {
        self.put(key, response)
    }

    fn invalidate(&self, key: &str) {
        self.remove(key);
    }

    fn revalidate(&self, key: &str, combine: Revalidation<'_>) -> Result<()> {
        self.update(key, combine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::entry::Resource;
    use crate::http::{Header, StatusLine};
    use chrono::Utc;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn response(body: &[u8]) -> CacheEntry {
        let now = Utc::now();
        CacheEntry::new(
            now,
            now,
            StatusLine::ok(),
            vec![Header::new("ETag", "\"v1\"")],
            Resource::Memory(body.to_vec()),
        )
    }

    #[test]
    fn test_trait_object_round_trip() {
        let tmp = TempDir::new().unwrap();
        let cache: Arc<dyn ResponseCache> = Arc::new(CacheStorage::open(tmp.path()).unwrap());

        cache.store("http://x/a", response(b"a")).unwrap();
        assert!(cache.lookup("http://x/a").is_some());

        cache.invalidate("http://x/a");
        assert!(cache.lookup("http://x/a").is_none());
    }

    #[test]
    fn test_revalidate_merges_not_modified_headers() {
        let tmp = TempDir::new().unwrap();
        let cache = CacheStorage::open(tmp.path()).unwrap();
        cache.store("http://x/a", response(b"a")).unwrap();

        let not_modified_date = Utc::now();
        cache
            .revalidate(
                "http://x/a",
                Box::new(move |cached: Option<CacheEntry>| -> crate::Result<CacheEntry> {
                    let mut cached = cached.ok_or_else(|| Error::update("nothing cached"))?;
                    cached.response_date = crate::http::truncate_to_seconds(not_modified_date);
                    cached.headers.push(Header::new("Age", "0"));
                    Ok(cached)
                }),
            )
            .unwrap();

        let merged = cache.lookup("http://x/a").unwrap();
        assert!(merged.first_header("Age").is_some());
        assert_eq!(merged.resource.bytes().unwrap(), b"a");
    }

    #[test]
    fn test_revalidate_missing_entry_propagates_error() {
        let tmp = TempDir::new().unwrap();
        let cache = CacheStorage::open(tmp.path()).unwrap();

        let result = cache.revalidate(
            "http://x/missing",
            Box::new(|cached: Option<CacheEntry>| cached.ok_or_else(|| Error::update("nothing cached"))),
        );
        assert!(matches!(result, Err(Error::Update { .. })));
        assert!(cache.is_empty());
    }
}

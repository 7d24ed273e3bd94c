use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// In-memory cache of query embeddings
///
/// Identical descriptions render to identical text, so repeated searches
/// skip the provider round trip.
#[derive(Clone)]
pub struct EmbeddingCache {
    inner: moka::future::Cache<String, Arc<Vec<f32>>>,
}

impl EmbeddingCache {
    pub fn new(max_entries: u64, ttl_secs: u64) -> Self {
        let inner = moka::future::CacheBuilder::new(max_entries)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { inner }
    }

    pub async fn get(&self, key: &str) -> Option<Arc<Vec<f32>>> {
        let hit = self.inner.get(key).await;
        if hit.is_some() {
            tracing::trace!("Embedding cache hit: {}", key);
        }
        hit
    }

    pub async fn insert(&self, key: String, vector: Vec<f32>) {
        self.inner.insert(key, Arc::new(vector)).await;
    }

    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.inner.entry_count(),
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: u64,
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Build a cache key for the embedding of a text under a model
    pub fn embedding(model: &str, text: &str) -> String {
        format!("embedding:{}:{}", model, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cache_insert_get() {
        let cache = EmbeddingCache::new(100, 60);
        let key = CacheKey::embedding("test-model", "A medium dog");

        assert!(cache.get(&key).await.is_none());

        cache.insert(key.clone(), vec![0.1, 0.2]).await;
        assert_eq!(cache.get(&key).await.unwrap().as_slice(), &[0.1, 0.2]);

        cache.invalidate_all();
        assert!(cache.get(&key).await.is_none());
    }

    #[test]
    fn test_cache_key_builder() {
        assert_eq!(
            CacheKey::embedding("text-embedding-3-small", "A small cat"),
            "embedding:text-embedding-3-small:A small cat"
        );
    }
}

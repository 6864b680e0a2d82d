use bytes::Bytes;
use moka::future::Cache;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Redis pool error: {0}")]
    Pool(#[from] deadpool_redis::PoolError),
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Cache store behind every [`crate::entry::CacheEntry`]. Components take
/// an `Arc<CacheBackend>` at construction time; the process owns exactly
/// one for its lifetime.
pub enum CacheBackend {
    /// Redis backend using a deadpool connection pool
    Redis(deadpool_redis::Pool),

    /// In-memory cache backend, used by tests
    Memory(Cache<String, Bytes>),
}

impl CacheBackend {
    pub fn redis(pool: deadpool_redis::Pool) -> Self {
        CacheBackend::Redis(pool)
    }

    pub fn memory() -> Self { Self::memory_with_capacity(10_000) }

    pub fn memory_with_capacity(capacity: u64) -> Self {
        let cache = Cache::builder().max_capacity(capacity).build();
        CacheBackend::Memory(cache)
    }

    pub fn is_redis(&self) -> bool { matches!(self, CacheBackend::Redis(_)) }
}

impl From<deadpool_redis::Pool> for CacheBackend {
    fn from(pool: deadpool_redis::Pool) -> Self { CacheBackend::Redis(pool) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_backend_creation() {
        let backend = CacheBackend::memory();
        assert!(!backend.is_redis());
    }
}

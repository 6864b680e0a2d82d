use std::sync::Arc;

use redis_connection::CacheBackend;
use sql_connection::SqlConnect;

pub use crate::{
    postgres::TestPostgresContainer, redis::TestRedisContainer,
    test_helpers::*,
};

pub mod postgres;
pub mod redis;
pub mod test_helpers;

pub fn create_sql_connect(container: &TestPostgresContainer) -> SqlConnect {
    SqlConnect::new(container.pool.clone())
}

/// In-process cache backend for tests that exercise the cache-aside and
/// invalidation paths without a Redis container.
pub fn memory_backend() -> Arc<CacheBackend> {
    Arc::new(CacheBackend::memory())
}

/// Cache backend bound to a test Redis container.
pub fn redis_backend(container: &TestRedisContainer) -> Arc<CacheBackend> {
    Arc::new(CacheBackend::redis(container.pool.clone()))
}

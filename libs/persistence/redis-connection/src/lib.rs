use deadpool_redis::{Config, CreatePoolError, Pool, Runtime};
pub use deadpool_redis::{PoolError, redis::FromRedisValue};
pub use redis::{AsyncCommands, RedisError};
use tracing::{info, instrument};
use url::Url;

pub use backend::{CacheBackend, CacheError};
pub use entry::CacheEntry;
pub use key::{CacheKey, CacheTypeBind};
pub use value::Json;

pub mod backend;
pub mod config;
pub mod entry;
pub mod key;
pub mod macros;
pub mod value;

#[instrument(skip_all, name = "connect-redis")]
pub async fn connect_redis_db(
    config: &config::RedisDbConfig,
) -> Result<Pool, CreatePoolError> {
    let mut url = Url::parse("redis://").unwrap();

    url.set_host(Some(&config.host)).unwrap();
    url.set_port(Some(config.port)).unwrap();
    url.path_segments_mut()
        .unwrap()
        .extend(&[config.db.to_string()]);

    info!(redis.url = %url, redis.connect = true);

    let cfg = Config {
        url: Some(url.to_string()),
        pool: Some(deadpool_redis::PoolConfig::default()),
        connection: None,
    };

    let pool = cfg.create_pool(Some(Runtime::Tokio1))?;
    Ok(pool)
}

use anyhow::{Context, Result};
use deadpool_redis::{Config, Pool, Runtime};
use testcontainers_modules::{
    redis::Redis, testcontainers::runners::AsyncRunner,
};

/// Redis test container with a fresh database.
pub struct TestRedisContainer {
    pub pool: Pool,
    pub connection_string: String,
    // Keep the container alive for the lifetime of this struct
    _container:
        testcontainers_modules::testcontainers::ContainerAsync<Redis>,
}

impl TestRedisContainer {
    pub async fn new() -> Result<Self> {
        let container = Redis::default()
            .start()
            .await
            .context("Failed to start Redis container")?;

        let host = container.get_host().await?;
        let port = container.get_host_port_ipv4(6379).await?;
        let connection_string = format!("redis://{host}:{port}");

        let mut cfg = Config::from_url(&connection_string);
        cfg.pool = Some(deadpool_redis::PoolConfig::new(10));
        let pool = cfg.create_pool(Some(Runtime::Tokio1))?;

        // Wait for the server to answer PING
        let mut attempts = 0;
        loop {
            match pool.get().await {
                Ok(mut conn) => {
                    match deadpool_redis::redis::cmd("PING")
                        .query_async::<()>(&mut conn)
                        .await
                    {
                        Ok(_) => break,
                        Err(_) if attempts < 10 => {
                            attempts += 1;
                            tokio::time::sleep(
                                std::time::Duration::from_millis(
                                    500 * attempts,
                                ),
                            )
                            .await;
                            continue;
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
                Err(_) if attempts < 10 => {
                    attempts += 1;
                    tokio::time::sleep(std::time::Duration::from_millis(
                        500 * attempts,
                    ))
                    .await;
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(Self {
            pool,
            connection_string,
            _container: container,
        })
    }

    pub async fn flush_db(&self) -> Result<()> {
        let mut conn = self.pool.get().await?;
        deadpool_redis::redis::cmd("FLUSHDB")
            .query_async::<()>(&mut conn)
            .await?;
        Ok(())
    }
}

use std::time::Duration;

use deadpool_postgres::{
    Manager, ManagerConfig, Object, Pool, PoolError, RecyclingMethod,
};
use tokio_postgres::NoTls;
use tracing::{debug, info, instrument};

use crate::config::PostgresDbConfig;

/// Pre-warms a connection pool by creating connections up front.
async fn prewarm_pool(pool: &Pool, count: u32) {
    debug!("Pre-warming pool with {} connections", count);
    let mut handles = vec![];

    for i in 0..count {
        let pool = pool.clone();
        handles.push(tokio::spawn(async move {
            match pool.get().await {
                Ok(_conn) => {
                    debug!("Pre-warmed connection {}/{}", i + 1, count);
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to pre-warm connection {}: {}",
                        i + 1,
                        e
                    );
                }
            }
        }));
    }

    for handle in handles {
        let _ = handle.await;
    }

    // Give connections time to settle in the pool
    tokio::time::sleep(Duration::from_millis(100)).await;

    let status = pool.status();
    info!(
        "Pool pre-warming complete: {} connections available",
        status.available
    );
}

/// Builds the PostgreSQL connection pool. The returned pool is owned by the
/// caller and handed to each component at construction time; nothing here
/// is stored in process-wide state.
#[instrument(skip_all, name = "connect-pgsql")]
pub async fn connect_postgres_db(
    config: &PostgresDbConfig,
) -> Result<Pool, anyhow::Error> {
    let db_url = &config.uri;

    info!(
        postgres.url = db_url,
        postgres.max_conn = ?config.max_conn,
        postgres.min_conn = ?config.min_conn,
        postgres.sql_logger = config.logger
    );

    let pg_config = db_url.parse::<tokio_postgres::Config>()?;

    let mgr_config = ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    };
    let mgr = Manager::from_config(pg_config, NoTls, mgr_config);

    let mut pool_builder = Pool::builder(mgr);

    pool_builder = pool_builder
        .runtime(deadpool_postgres::Runtime::Tokio1)
        .wait_timeout(Some(Duration::from_millis(2000)))
        .create_timeout(Some(Duration::from_millis(5000)))
        .recycle_timeout(Some(Duration::from_millis(100)));

    if let Some(max_conn) = config.max_conn {
        pool_builder = pool_builder.max_size(max_conn as usize);
    }

    let pool = pool_builder.build()?;

    if let Some(min_conn) = config.min_conn {
        info!("Pre-warming pool with {} connections", min_conn);
        prewarm_pool(&pool, min_conn).await;
    }

    Ok(pool)
}

/// Shared handle to the PostgreSQL pool, cloned into every DAO.
#[derive(Debug, Clone)]
pub struct SqlConnect {
    pool: Pool,
}

impl SqlConnect {
    pub fn new(pool: Pool) -> Self { Self { pool } }

    /// Get a connection for write operations.
    pub async fn get_client(&self) -> Result<Object, PoolError> {
        self.pool.get().await
    }

    /// Get a connection for read operations.
    pub async fn get_read_client(&self) -> Result<Object, PoolError> {
        self.pool.get().await
    }

    /// Get pool statistics for monitoring.
    pub fn get_pool_status(&self) -> (usize, usize) {
        let status = self.pool.status();
        (status.available, status.size)
    }
}

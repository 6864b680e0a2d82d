use std::time::Duration;

use anyhow::{Context, Result};
use deadpool_postgres::{
    Manager, ManagerConfig, Pool as PostgresPool, RecyclingMethod,
};
use testcontainers_modules::{
    postgres::Postgres,
    testcontainers::{ImageExt, runners::AsyncRunner},
};
use tokio_postgres::NoTls;

/// Schema files applied to every fresh container, in dependency order.
const MIGRATIONS: &[(&str, &str)] = &[
    (
        "001_create_media",
        include_str!(
            "../../../domains/media/migrations/sql/001_create_media.sql"
        ),
    ),
    (
        "002_create_identity",
        include_str!(
            "../../../domains/identities/migrations/sql/\
             002_create_identity.sql"
        ),
    ),
    (
        "003_create_category",
        include_str!(
            "../../../domains/categories/migrations/sql/\
             003_create_category.sql"
        ),
    ),
    (
        "004_create_property",
        include_str!(
            "../../../domains/properties/migrations/sql/\
             004_create_property.sql"
        ),
    ),
    (
        "005_create_advertisement",
        include_str!(
            "../../../domains/advertisements/migrations/sql/\
             005_create_advertisement.sql"
        ),
    ),
];

/// PostgreSQL test container with the full schema applied.
pub struct TestPostgresContainer {
    pub pool: PostgresPool,
    pub connection_string: String,
    // Keep the container alive for the lifetime of this struct
    _container:
        testcontainers_modules::testcontainers::ContainerAsync<Postgres>,
}

impl TestPostgresContainer {
    pub async fn new() -> Result<Self> {
        let container = Postgres::default()
            .with_env_var("POSTGRES_DB", "testdb")
            .with_env_var("POSTGRES_USER", "testuser")
            .with_env_var("POSTGRES_PASSWORD", "testpass")
            .start()
            .await
            .context("Failed to start PostgreSQL container")?;

        let host = container.get_host().await?;
        let port = container.get_host_port_ipv4(5432).await?;
        let connection_string =
            format!("postgresql://testuser:testpass@{host}:{port}/testdb");

        let pool = Self::create_pool(&connection_string).await?;

        let instance = Self {
            pool,
            connection_string,
            _container: container,
        };

        instance.apply_migrations().await?;

        Ok(instance)
    }

    async fn create_pool(connection_string: &str) -> Result<PostgresPool> {
        let pg_config =
            connection_string.parse::<tokio_postgres::Config>()?;

        let mgr_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };
        let mgr = Manager::from_config(pg_config, NoTls, mgr_config);

        let pool = PostgresPool::builder(mgr)
            .max_size(10)
            .build()
            .context("Failed to build PostgreSQL connection pool")?;

        // Wait for the server to accept queries
        let mut attempts = 0;
        loop {
            match pool.get().await {
                Ok(client) => {
                    match client.query_one("SELECT 1", &[]).await {
                        Ok(_) => break,
                        Err(_) if attempts < 20 => {
                            attempts += 1;
                            tokio::time::sleep(Duration::from_millis(500))
                                .await;
                            continue;
                        }
                        Err(e) => {
                            return Err(e).context("PostgreSQL not ready");
                        }
                    }
                }
                Err(_) if attempts < 20 => {
                    attempts += 1;
                    tokio::time::sleep(Duration::from_millis(500)).await;
                    continue;
                }
                Err(e) => {
                    return Err(e)
                        .context("Failed to get PostgreSQL connection");
                }
            }
        }

        Ok(pool)
    }

    async fn apply_migrations(&self) -> Result<()> {
        let client = self.pool.get().await?;
        for (name, sql) in MIGRATIONS {
            client
                .batch_execute(sql)
                .await
                .with_context(|| format!("Failed to run migration {name}"))?;
        }
        Ok(())
    }

    pub async fn execute_sql(&self, sql: &str) -> Result<()> {
        let client = self.pool.get().await?;
        client.batch_execute(sql).await?;
        Ok(())
    }
}

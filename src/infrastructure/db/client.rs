use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};
use sqlx::MySqlPool;
use tracing::debug;

use crate::domain::ports::SchemaConnection;
use crate::domain::row::RowMap;
use crate::infrastructure::config::DbConfig;
use crate::infrastructure::db::row_mapper::row_to_map;

/// Connection Provider over a single-connection MySQL pool.
///
/// Statements run one at a time; the pool is closed when this value is
/// dropped.
pub struct MysqlConnection {
    pool: MySqlPool,
    schema: String,
}

/// Connect to the database described in `cfg` and return a `MysqlConnection`.
pub async fn connect(cfg: &DbConfig) -> Result<MysqlConnection> {
    let options = MySqlConnectOptions::new()
        .host(&cfg.server)
        .port(cfg.port)
        .username(&cfg.user)
        .password(&cfg.pwd)
        .database(&cfg.schema)
        .charset("utf8mb4");

    let pool = MySqlPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(cfg.acquire_timeout())
        .connect_with(options)
        .await
        .with_context(|| {
            format!(
                "Failed to connect to {}:{}/{} (driver: {})",
                cfg.server, cfg.port, cfg.schema, cfg.driver
            )
        })?;

    debug!(
        "Connected to {}/{} via {} driver",
        cfg.server, cfg.schema, cfg.driver
    );

    Ok(MysqlConnection {
        pool,
        schema: cfg.schema.clone(),
    })
}

#[async_trait]
impl SchemaConnection for MysqlConnection {
    async fn execute(&self, sql: &str) -> Result<Vec<RowMap>> {
        debug!("Executing: {}", sql);

        // Text protocol: MySQL cannot prepare every SHOW/DESCRIBE form.
        let rows = sqlx::raw_sql(sql)
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("Failed to execute `{}` on {}", sql, self.schema))?;

        rows.iter().map(row_to_map).collect()
    }

    fn schema_name(&self) -> &str {
        &self.schema
    }
}

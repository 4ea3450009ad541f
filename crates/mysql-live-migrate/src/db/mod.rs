//! MySQL execution layer.
//!
//! [`SqlExecutor`] is the narrow capability the copy engine consumes: a
//! single-value query and a DML statement returning its affected row count.
//! [`MysqlExecutor`] implements it on a `mysql_async` connection pool and
//! additionally provides the schema probes the CLI uses to assemble a
//! [`Migration`](crate::migration::Migration).

use std::time::Duration;

use async_trait::async_trait;
use mysql_async::prelude::*;
use mysql_async::{Opts, OptsBuilder, Pool, PoolConstraints, PoolOpts, SslOpts};
use tracing::{info, warn};

use crate::config::DatabaseConfig;
use crate::error::{MigrateError, Result};
use crate::throttler::LagProbe;

/// SQL capability consumed by the copy engine.
///
/// During a copy run the engine is the only caller issuing statements through
/// this handle; no other work may interleave on it.
#[async_trait]
pub trait SqlExecutor: Send + Sync {
    /// Run a query expected to produce at most one row with one value.
    ///
    /// Returns `None` when no row matched or the value was NULL.
    async fn select_value(&self, sql: &str) -> Result<Option<i64>>;

    /// Execute a DML statement and return the affected row count.
    async fn update(&self, sql: &str) -> Result<u64>;
}

/// [`SqlExecutor`] implementation backed by a `mysql_async` pool.
pub struct MysqlExecutor {
    pool: Pool,
}

impl MysqlExecutor {
    /// Open a connection pool and verify it with a test query.
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let ssl_opts = match config.ssl_mode.to_lowercase().as_str() {
            "disable" => {
                warn!("MySQL TLS is disabled. Credentials will be transmitted in plaintext.");
                None
            }
            "prefer" | "require" => Some(SslOpts::default().with_danger_accept_invalid_certs(true)),
            "verify-ca" | "verify_ca" | "verify-full" | "verify_identity" => {
                Some(SslOpts::default())
            }
            _ => {
                warn!(
                    "Unknown ssl_mode '{}', defaulting to Preferred",
                    config.ssl_mode
                );
                Some(SslOpts::default().with_danger_accept_invalid_certs(true))
            }
        };

        let mut builder = OptsBuilder::default()
            .ip_or_hostname(&config.host)
            .tcp_port(config.port)
            .db_name(Some(&config.database))
            .user(Some(&config.user))
            .pass(Some(&config.password))
            // Use utf8mb4 for full Unicode support
            .init(vec!["SET NAMES utf8mb4"]);

        if let Some(ssl) = ssl_opts {
            builder = builder.ssl_opts(ssl);
        }

        let pool_opts = PoolOpts::new()
            .with_constraints(PoolConstraints::new(1, config.max_connections).unwrap());

        let opts: Opts = builder.pool_opts(pool_opts).into();
        let pool = Pool::new(opts);

        // Test connection
        let mut conn = pool
            .get_conn()
            .await
            .map_err(|e| MigrateError::pool(e, "creating MySQL pool"))?;

        conn.query_drop("SELECT 1")
            .await
            .map_err(|e| MigrateError::pool(e, "testing MySQL connection"))?;

        drop(conn);

        info!(
            "Connected to MySQL: {}:{}/{}",
            config.host, config.port, config.database
        );

        Ok(Self { pool })
    }

    /// Test the database connection.
    pub async fn ping(&self) -> Result<()> {
        let mut conn = self
            .pool
            .get_conn()
            .await
            .map_err(|e| MigrateError::pool(e, "testing MySQL connection"))?;
        conn.query_drop("SELECT 1").await?;
        Ok(())
    }

    /// Column names of `table` in ordinal order, from `information_schema`.
    ///
    /// Returns an empty list when the table does not exist in the connected
    /// database.
    pub async fn column_names(&self, table: &str) -> Result<Vec<String>> {
        let mut conn = self.pool.get_conn().await?;
        let names: Vec<String> = conn
            .exec(
                "SELECT column_name FROM information_schema.columns \
                 WHERE table_schema = DATABASE() AND table_name = ? \
                 ORDER BY ordinal_position",
                (table,),
            )
            .await?;
        Ok(names)
    }

    /// Current replication delay as reported by this server's replica
    /// thread, or `None` when the server is not a replica or the delay is
    /// unknown.
    pub async fn replication_lag(&self) -> Result<Option<Duration>> {
        let mut conn = self.pool.get_conn().await?;

        // MySQL 8.0.22 renamed the statement and its columns; fall back for
        // older servers.
        let row: Option<mysql_async::Row> = match conn.query_first("SHOW REPLICA STATUS").await {
            Ok(row) => row,
            Err(_) => conn.query_first("SHOW SLAVE STATUS").await?,
        };

        let Some(row) = row else {
            return Ok(None);
        };

        let seconds = row
            .get::<Option<u64>, _>("Seconds_Behind_Source")
            .or_else(|| row.get::<Option<u64>, _>("Seconds_Behind_Master"))
            .flatten();

        Ok(seconds.map(Duration::from_secs))
    }

    /// Close the connection pool.
    pub async fn disconnect(self) -> Result<()> {
        self.pool.disconnect().await?;
        Ok(())
    }
}

#[async_trait]
impl SqlExecutor for MysqlExecutor {
    async fn select_value(&self, sql: &str) -> Result<Option<i64>> {
        let mut conn = self.pool.get_conn().await?;
        let value: Option<Option<i64>> = conn.query_first(sql).await?;
        Ok(value.flatten())
    }

    async fn update(&self, sql: &str) -> Result<u64> {
        let mut conn = self.pool.get_conn().await?;
        conn.query_drop(sql).await?;
        Ok(conn.affected_rows())
    }
}

#[async_trait]
impl LagProbe for MysqlExecutor {
    async fn replication_lag(&self) -> Result<Option<Duration>> {
        MysqlExecutor::replication_lag(self).await
    }
}

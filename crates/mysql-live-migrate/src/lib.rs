//! # mysql-live-migrate
//!
//! Chunked copy engine for live (zero-downtime) MySQL table migrations.
//!
//! Moves all rows from a live "origin" table into a structurally different
//! "destination" table while the origin stays under production read/write
//! traffic, with support for:
//!
//! - **Bounded chunks** over the primary key space, one short statement at a
//!   time, so no long-held lock and no single giant transaction
//! - **Idempotent copy statements** (`INSERT IGNORE ... SELECT`) making any
//!   chunk safe to re-issue after a partial failure
//! - **Bounded retry** of chunks hitting lock-wait timeouts or deadlocks
//! - **Pluggable throttling** between chunks: fixed-interval pacing or
//!   dynamic pacing driven by replication lag
//! - **Pluggable progress reporting** (in-place percentage line, or one dot
//!   per chunk)
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use mysql_live_migrate::{
//!     Chunker, ChunkerOptions, ColumnIntersection, Config, Migration, MysqlExecutor,
//! };
//!
//! #[tokio::main]
//! async fn main() -> mysql_live_migrate::Result<()> {
//!     let config = Config::load("config.yaml")?;
//!     let executor = Arc::new(MysqlExecutor::new(&config.database).await?);
//!
//!     let columns = ColumnIntersection::new(vec!["id".into(), "name".into()])?;
//!     let migration = Migration::new("users", "users_new", columns);
//!
//!     let chunker = Chunker::new(migration, executor, ChunkerOptions::default()).await?;
//!     let stats = chunker.execute().await?;
//!     println!("copied {} rows in {} chunks", stats.rows_copied, stats.chunks);
//!     Ok(())
//! }
//! ```

pub mod chunker;
pub mod config;
pub mod db;
pub mod error;
pub mod migration;
pub mod printer;
pub mod throttler;

// Re-exports for convenient access
pub use chunker::{Chunker, ChunkerOptions, CopyStats};
pub use config::{Config, CopyConfig, DatabaseConfig, MigrationConfig};
pub use db::{MysqlExecutor, SqlExecutor};
pub use error::{MigrateError, Result};
pub use migration::{ColumnIntersection, Filter, Migration};
pub use printer::{DotPrinter, PercentagePrinter, Printer};
pub use throttler::{
    create_throttler, LagProbe, ReplicaLagThrottler, Throttler, ThrottlerConfig, ThrottlerSpec,
    TimeThrottler,
};

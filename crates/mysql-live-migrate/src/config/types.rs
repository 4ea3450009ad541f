//! Configuration type definitions.

use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// MySQL connection configuration.
    pub database: DatabaseConfig,

    /// What to migrate.
    pub migration: MigrationConfig,

    /// Copy pacing and retry tuning.
    #[serde(default)]
    pub copy: CopyConfig,
}

/// MySQL connection configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database host.
    pub host: String,

    /// Database port (default: 3306).
    #[serde(default = "default_mysql_port")]
    pub port: u16,

    /// Database name.
    pub database: String,

    /// Username.
    pub user: String,

    /// Password.
    pub password: String,

    /// SSL mode (default: "prefer").
    #[serde(default = "default_prefer")]
    pub ssl_mode: String,

    /// Maximum pooled connections (default: 4).
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("ssl_mode", &self.ssl_mode)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

/// Which table is copied where, and which rows travel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// Origin table name (the live table).
    pub origin: String,

    /// Destination table name (the new-schema table).
    pub destination: String,

    /// Explicit column list. Empty means: use the intersection of origin and
    /// destination columns, probed from information_schema.
    #[serde(default)]
    pub columns: Vec<String>,

    /// Predicate clauses restricting eligible origin rows, AND-ed together.
    #[serde(default)]
    pub filter: Vec<String>,

    /// Explicit lower id bound, bypassing the min(id) probe.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<i64>,

    /// Explicit upper id bound, bypassing the max(id) probe.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

/// Copy pacing and retry tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopyConfig {
    /// Throttle strategy name: "time" or "replica-lag".
    #[serde(default = "default_throttler")]
    pub throttler: String,

    /// Requested chunk stride in ids (default: 40000).
    #[serde(default = "default_stride")]
    pub stride: u64,

    /// Pause between chunks in milliseconds (default: 100).
    #[serde(default = "default_pause_ms")]
    pub pause_ms: u64,

    /// Replication delay in seconds above which the replica-lag strategy
    /// backs off (default: 10).
    #[serde(default = "default_max_replica_lag_secs")]
    pub max_replica_lag_secs: u64,

    /// Maximum re-attempts for a chunk failing with lock contention
    /// (default: 10).
    #[serde(default = "default_lock_wait_retries")]
    pub lock_wait_retries: u32,

    /// Sleep between re-attempts in seconds (default: 5).
    #[serde(default = "default_retry_wait_secs")]
    pub retry_wait_secs: u64,

    /// Progress reporter name: "percentage" or "dot".
    #[serde(default = "default_printer")]
    pub printer: String,
}

impl Default for CopyConfig {
    fn default() -> Self {
        Self {
            throttler: default_throttler(),
            stride: default_stride(),
            pause_ms: default_pause_ms(),
            max_replica_lag_secs: default_max_replica_lag_secs(),
            lock_wait_retries: default_lock_wait_retries(),
            retry_wait_secs: default_retry_wait_secs(),
            printer: default_printer(),
        }
    }
}

// Default value functions for serde
fn default_mysql_port() -> u16 {
    3306
}

fn default_prefer() -> String {
    "prefer".to_string()
}

fn default_max_connections() -> usize {
    4
}

fn default_throttler() -> String {
    "time".to_string()
}

fn default_stride() -> u64 {
    40_000
}

fn default_pause_ms() -> u64 {
    100
}

fn default_max_replica_lag_secs() -> u64 {
    10
}

fn default_lock_wait_retries() -> u32 {
    10
}

fn default_retry_wait_secs() -> u64 {
    5
}

fn default_printer() -> String {
    "percentage".to_string()
}

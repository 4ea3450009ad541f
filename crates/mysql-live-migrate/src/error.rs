//! Error types for the migration library.

use thiserror::Error;

/// MySQL server error code for `Lock wait timeout exceeded`.
const ER_LOCK_WAIT_TIMEOUT: u16 = 1205;

/// MySQL server error code for `Deadlock found when trying to get lock`.
const ER_LOCK_DEADLOCK: u16 = 1213;

/// Main error type for migration operations.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Configuration error (invalid YAML, missing fields, impossible chunk options, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database connection or statement error, surfaced unmodified so
    /// operators can diagnose the root cause.
    #[error("Database error: {0}")]
    Database(#[from] mysql_async::Error),

    /// Connection pool error with context
    #[error("Pool error: {message}\n  Context: {context}")]
    Pool { message: String, context: String },

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MigrateError {
    /// Create a Pool error with context about where it occurred
    pub fn pool(message: impl ToString, context: impl Into<String>) -> Self {
        MigrateError::Pool {
            message: message.to_string(),
            context: context.into(),
        }
    }

    /// Whether this error is transient lock contention (lock wait timeout or
    /// deadlock) and therefore eligible for bounded retry of the same
    /// statement. Any other error is fatal on first occurrence.
    pub fn is_lock_contention(&self) -> bool {
        match self {
            MigrateError::Database(mysql_async::Error::Server(e)) => {
                matches!(e.code, ER_LOCK_WAIT_TIMEOUT | ER_LOCK_DEADLOCK)
            }
            _ => false,
        }
    }

    /// Process exit code for this error category.
    pub fn exit_code(&self) -> u8 {
        match self {
            MigrateError::Config(_) => 2,
            MigrateError::Database(_) | MigrateError::Pool { .. } => 3,
            _ => 1,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for migration operations.
pub type Result<T> = std::result::Result<T, MigrateError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn server_error(code: u16, message: &str) -> MigrateError {
        MigrateError::Database(mysql_async::Error::Server(mysql_async::ServerError {
            code,
            message: message.into(),
            state: "HY000".into(),
        }))
    }

    #[test]
    fn test_lock_wait_timeout_is_lock_contention() {
        let err = server_error(1205, "Lock wait timeout exceeded; try restarting transaction");
        assert!(err.is_lock_contention());
    }

    #[test]
    fn test_deadlock_is_lock_contention() {
        let err = server_error(1213, "Deadlock found when trying to get lock");
        assert!(err.is_lock_contention());
    }

    #[test]
    fn test_syntax_error_is_not_lock_contention() {
        let err = server_error(1064, "You have an error in your SQL syntax");
        assert!(!err.is_lock_contention());
    }

    #[test]
    fn test_config_error_is_not_lock_contention() {
        let err = MigrateError::Config("bad option".into());
        assert!(!err.is_lock_contention());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(MigrateError::Config("x".into()).exit_code(), 2);
        assert_eq!(server_error(1064, "syntax").exit_code(), 3);
    }
}

//! Configuration validation.

use super::Config;
use crate::error::{MigrateError, Result};

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    // Database validation
    if config.database.host.is_empty() {
        return Err(MigrateError::Config("database.host is required".into()));
    }
    if config.database.database.is_empty() {
        return Err(MigrateError::Config("database.database is required".into()));
    }
    if config.database.user.is_empty() {
        return Err(MigrateError::Config("database.user is required".into()));
    }
    if config.database.max_connections == 0 {
        return Err(MigrateError::Config(
            "database.max_connections must be at least 1".into(),
        ));
    }

    // Migration validation
    if config.migration.origin.is_empty() {
        return Err(MigrateError::Config("migration.origin is required".into()));
    }
    if config.migration.destination.is_empty() {
        return Err(MigrateError::Config(
            "migration.destination is required".into(),
        ));
    }
    if config.migration.origin == config.migration.destination {
        return Err(MigrateError::Config(
            "migration.origin and migration.destination cannot be the same table".into(),
        ));
    }
    if config.migration.filter.iter().any(|c| c.trim().is_empty()) {
        return Err(MigrateError::Config(
            "migration.filter clauses cannot be empty".into(),
        ));
    }
    if let (Some(start), Some(limit)) = (config.migration.start, config.migration.limit) {
        if start > limit {
            return Err(MigrateError::Config(
                "migration.start cannot exceed migration.limit".into(),
            ));
        }
    }

    // Copy validation
    if config.copy.stride == 0 {
        return Err(MigrateError::Config("copy.stride must be at least 1".into()));
    }
    if !matches!(config.copy.throttler.as_str(), "time" | "replica-lag") {
        return Err(MigrateError::Config(format!(
            "copy.throttler must be 'time' or 'replica-lag', got '{}'",
            config.copy.throttler
        )));
    }
    if !matches!(config.copy.printer.as_str(), "percentage" | "dot") {
        return Err(MigrateError::Config(format!(
            "copy.printer must be 'percentage' or 'dot', got '{}'",
            config.copy.printer
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CopyConfig, DatabaseConfig, MigrationConfig};

    fn valid_config() -> Config {
        Config {
            database: DatabaseConfig {
                host: "localhost".to_string(),
                port: 3306,
                database: "app".to_string(),
                user: "root".to_string(),
                password: "password".to_string(),
                ssl_mode: "prefer".to_string(),
                max_connections: 4,
            },
            migration: MigrationConfig {
                origin: "users".to_string(),
                destination: "users_new".to_string(),
                columns: vec![],
                filter: vec![],
                start: None,
                limit: None,
            },
            copy: CopyConfig::default(),
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_missing_host() {
        let mut config = valid_config();
        config.database.host = "".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_missing_origin() {
        let mut config = valid_config();
        config.migration.origin = "".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_origin_equals_destination() {
        let mut config = valid_config();
        config.migration.destination = "users".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_blank_filter_clause() {
        let mut config = valid_config();
        config.migration.filter = vec!["status = 'active'".to_string(), "  ".to_string()];
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_inverted_bounds() {
        let mut config = valid_config();
        config.migration.start = Some(10);
        config.migration.limit = Some(5);
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_stride() {
        let mut config = valid_config();
        config.copy.stride = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_unknown_throttler() {
        let mut config = valid_config();
        config.copy.throttler = "tempo".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_unknown_printer() {
        let mut config = valid_config();
        config.copy.printer = "spinner".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_database_config_debug_redacts_password() {
        let mut config = valid_config();
        config.database.password = "super_secret_password_123".to_string();
        let debug_output = format!("{:?}", config.database);
        assert!(
            debug_output.contains("[REDACTED]"),
            "Debug output should contain [REDACTED]"
        );
        assert!(
            !debug_output.contains("super_secret_password_123"),
            "Debug output should not contain actual password value"
        );
    }
}

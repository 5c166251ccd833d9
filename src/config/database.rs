use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Document store configuration.
///
/// The store holds two collections: users (keyed by email) and loads
/// (keyed by a generated UUID).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
#[serde(deny_unknown_fields)]
pub enum DatabaseConfig {
    /// Process-local store. Data is lost on restart; intended for local
    /// development and tests.
    #[default]
    Memory,

    /// SQLite database. Good for single-node deployments.
    #[cfg(feature = "database-sqlite")]
    Sqlite(SqliteConfig),
}

impl DatabaseConfig {
    pub fn is_memory(&self) -> bool {
        matches!(self, DatabaseConfig::Memory)
    }

    /// Whether migrations run when the server starts.
    pub fn run_migrations(&self) -> bool {
        match self {
            DatabaseConfig::Memory => false,
            #[cfg(feature = "database-sqlite")]
            DatabaseConfig::Sqlite(c) => c.run_migrations,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            DatabaseConfig::Memory => Ok(()),
            #[cfg(feature = "database-sqlite")]
            DatabaseConfig::Sqlite(c) => c.validate(),
        }
    }
}

/// SQLite configuration.
#[cfg(feature = "database-sqlite")]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SqliteConfig {
    /// Path to the SQLite database file.
    /// Use `:memory:` for an in-memory database (testing only).
    pub path: String,

    /// Create the database file if it doesn't exist.
    #[serde(default = "crate::config::default_true")]
    pub create_if_missing: bool,

    /// Run migrations on startup.
    #[serde(default = "crate::config::default_true")]
    pub run_migrations: bool,

    /// Enable WAL mode for better concurrency.
    #[serde(default = "crate::config::default_true")]
    pub wal_mode: bool,

    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_ms: u64,

    /// Maximum number of connections in the pool.
    #[serde(default = "default_sqlite_max_connections")]
    pub max_connections: u32,
}

#[cfg(feature = "database-sqlite")]
impl SqliteConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.path.is_empty() {
            return Err(ConfigError::Validation(
                "SQLite path cannot be empty".into(),
            ));
        }
        if self.max_connections == 0 {
            return Err(ConfigError::Validation(
                "SQLite max_connections must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(feature = "database-sqlite")]
fn default_busy_timeout() -> u64 {
    5000 // 5 seconds
}

#[cfg(feature = "database-sqlite")]
fn default_sqlite_max_connections() -> u32 {
    5
}

#[cfg(all(test, feature = "database-sqlite"))]
mod tests {
    use crate::config::{ConfigError, DatabaseConfig, LoadboardConfig};

    #[test]
    fn test_sqlite_config_defaults() {
        let config = LoadboardConfig::from_str(
            r#"
            [database]
            type = "sqlite"
            path = "loads.db"
        "#,
        )
        .unwrap();

        let DatabaseConfig::Sqlite(sqlite) = config.database else {
            panic!("expected sqlite config");
        };
        assert_eq!(sqlite.path, "loads.db");
        assert!(sqlite.create_if_missing);
        assert!(sqlite.run_migrations);
        assert!(sqlite.wal_mode);
        assert_eq!(sqlite.busy_timeout_ms, 5000);
        assert_eq!(sqlite.max_connections, 5);
    }

    #[test]
    fn test_sqlite_empty_path_rejected() {
        let result = LoadboardConfig::from_str(
            r#"
            [database]
            type = "sqlite"
            path = ""
        "#,
        );
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }
}

use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
}

/// Where the HTTP listener binds.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Connection pool settings for PostgreSQL.
#[derive(Clone, Deserialize)]
pub struct DatabaseConfig {
    pub user: String,
    pub database: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    /// Upper bound on open connections held by the pool.
    pub max_connections: u32,
    /// How long an unused connection may sit idle before the pool closes it.
    pub idle_timeout_ms: u64,
    /// How long a caller waits for a connection before giving up.
    pub connect_timeout_ms: u64,
    /// Directory holding `caregiver.sql`, `patient.sql` and `visit.sql`.
    pub schema_dir: PathBuf,
}

impl DatabaseConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

// Keep the password out of logs.
impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("user", &self.user)
            .field("database", &self.database)
            .field("password", &"<redacted>")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("max_connections", &self.max_connections)
            .field("idle_timeout_ms", &self.idle_timeout_ms)
            .field("connect_timeout_ms", &self.connect_timeout_ms)
            .field("schema_dir", &self.schema_dir)
            .finish()
    }
}

impl Config {
    /// Rejects settings that would leave the service unable to run.
    pub fn validate(&self) -> Result<(), String> {
        if self.database.max_connections == 0 {
            return Err("database.max_connections must be at least 1".to_string());
        }
        if self.database.port == 0 {
            return Err("database.port must not be 0".to_string());
        }
        if self.server.port == 0 {
            return Err("server.port must not be 0".to_string());
        }
        if self.database.connect_timeout_ms == 0 {
            return Err("database.connect_timeout_ms must be positive".to_string());
        }
        Ok(())
    }
}

use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{Config, DatabaseConfig, ServerConfig};

/// Prefix for environment overrides, e.g. `VISIT_REPORT__DATABASE__PASSWORD`.
pub const ENV_PREFIX: &str = "VISIT_REPORT";

/// Loads the application configuration.
///
/// Sources are layered lowest to highest: built-in defaults, the TOML file at
/// `path` (optional), then `VISIT_REPORT__*` environment variables. A `.env`
/// file in the working directory is loaded first when present; a `.env` that
/// exists but cannot be read or parsed is an error.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    check_dotenv(dotenvy::dotenv())?;
    build(path, None)
}

/// A missing `.env` is fine. Anything else dotenvy reports is not.
fn check_dotenv<T>(result: Result<T, dotenvy::Error>) -> Result<(), ConfigError> {
    match result {
        Ok(_) => Ok(()),
        Err(dotenvy::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No .env file found.");
            Ok(())
        }
        Err(e) => Err(ConfigError::ValidationError(format!("invalid .env file: {e}"))),
    }
}

/// Same as [`load_config`] but reads overrides from `env` instead of the
/// process environment.
pub fn load_config_with_env(
    path: &Path,
    env: config::Map<String, String>,
) -> Result<Config, ConfigError> {
    build(path, Some(env))
}

fn build(path: &Path, env: Option<config::Map<String, String>>) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 3000)?
        .set_default("database.user", "postgres")?
        .set_default("database.database", "visits")?
        .set_default("database.password", "")?
        .set_default("database.host", "localhost")?
        .set_default("database.port", 5432)?
        .set_default("database.max_connections", 10)?
        .set_default("database.idle_timeout_ms", 30_000)?
        .set_default("database.connect_timeout_ms", 2_000)?
        .set_default("database.schema_dir", "sql")?
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true)
                .source(env),
        )
        .build()?;

    let config = builder.try_deserialize::<Config>()?;
    config.validate().map_err(ConfigError::ValidationError)?;

    tracing::debug!(config = ?config, "Configuration loaded.");
    Ok(config)
}

use thiserror::Error;

/// Failure kinds surfaced by the database layer.
///
/// Driver errors are folded into a small closed set so callers can decide
/// whether to retry, report a client mistake, or give up.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Invalid database connection settings: {0}")]
    Config(String),

    #[error("Database is unreachable: {0}")]
    Connectivity(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Invalid request: {0}")]
    CallerMisuse(String),

    #[error("The requested data was not found in the database.")]
    NotFound,

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Schema bootstrap failed for: {}", .0.join(", "))]
    SchemaBootstrap(Vec<String>),
}

impl DbError {
    /// True when the same call may succeed if retried later.
    pub fn is_transient(&self) -> bool {
        matches!(self, DbError::Connectivity(_))
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        use sqlx::error::ErrorKind;

        match err {
            sqlx::Error::RowNotFound => DbError::NotFound,
            sqlx::Error::Configuration(e) => DbError::Config(e.to_string()),
            sqlx::Error::Io(e) => DbError::Connectivity(e.to_string()),
            sqlx::Error::Tls(e) => DbError::Connectivity(e.to_string()),
            sqlx::Error::Protocol(msg) => DbError::Connectivity(msg),
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => DbError::Connectivity(err.to_string()),
            sqlx::Error::Database(db_err) => {
                let message = db_err.message().to_string();
                match db_err.kind() {
                    ErrorKind::UniqueViolation
                    | ErrorKind::ForeignKeyViolation
                    | ErrorKind::NotNullViolation
                    | ErrorKind::CheckViolation => DbError::ConstraintViolation(message),
                    _ => {
                        // SQLSTATE class 08 is "connection exception", 57P0x is server shutdown.
                        let code = db_err.code().unwrap_or_default();
                        if code.starts_with("08") || code.starts_with("57P0") {
                            DbError::Connectivity(message)
                        } else {
                            DbError::Query(message)
                        }
                    }
                }
            }
            other => DbError::Query(other.to_string()),
        }
    }
}

impl From<core_types::CoreError> for DbError {
    fn from(err: core_types::CoreError) -> Self {
        DbError::CallerMisuse(err.to_string())
    }
}

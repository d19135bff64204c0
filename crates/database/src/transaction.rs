//! Manual transaction control over a dedicated pooled connection.
//!
//! A [`TxHandle`] owns one checked-out connection with an open transaction.
//! [`commit`] and [`rollback`] consume it, so the connection goes back to the
//! pool exactly once whichever way the call ends. A handle dropped without
//! either call is rolled back by the driver and its connection released.

use crate::error::DbError;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};

/// A transaction on a connection checked out from the pool.
pub struct TxHandle {
    tx: Option<Transaction<'static, Postgres>>,
}

impl TxHandle {
    /// The connection statements inside this transaction should run on.
    pub(crate) fn connection(&mut self) -> Result<&mut PgConnection, DbError> {
        self.tx
            .as_deref_mut()
            .ok_or_else(|| DbError::CallerMisuse("transaction already finished".to_string()))
    }

    fn take(mut self) -> Option<Transaction<'static, Postgres>> {
        self.tx.take()
    }
}

impl Drop for TxHandle {
    fn drop(&mut self) {
        if self.tx.is_some() {
            tracing::warn!("Transaction dropped without commit or rollback; rolling back.");
        }
    }
}

/// Checks out a connection and issues `BEGIN` on it.
///
/// If `BEGIN` fails the connection is returned to the pool before the error
/// is reported.
pub async fn begin(pool: &PgPool) -> Result<TxHandle, DbError> {
    tracing::debug!("begin transaction");
    let tx = pool.begin().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to begin transaction.");
        DbError::from(e)
    })?;
    Ok(TxHandle { tx: Some(tx) })
}

/// Issues `COMMIT` and releases the connection.
pub async fn commit(handle: TxHandle) -> Result<(), DbError> {
    tracing::debug!("sql transaction committed");
    let Some(tx) = handle.take() else {
        return Err(DbError::CallerMisuse("transaction already finished".to_string()));
    };
    // `commit` consumes the transaction; its connection is released however it returns.
    tx.commit().await.map_err(|e| {
        tracing::error!(error = %e, "Commit failed.");
        DbError::from(e)
    })
}

/// Issues `ROLLBACK` and releases the connection.
///
/// Accepts `None` so callers can clean up after a failed [`begin`] without
/// checking; that case logs a warning and does nothing else.
pub async fn rollback(handle: Option<TxHandle>) -> Result<(), DbError> {
    let Some(tx) = handle.and_then(TxHandle::take) else {
        tracing::warn!("rollback() not executed. No transaction handle given.");
        return Ok(());
    };

    tracing::info!("sql transaction rollback");
    tx.rollback().await.map_err(|e| {
        tracing::error!(error = %e, "Rollback failed.");
        DbError::from(e)
    })
}

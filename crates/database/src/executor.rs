use crate::error::DbError;
use crate::transaction::TxHandle;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{Column, Executor, PgPool, Postgres, Statement, TypeInfo};
use std::fmt;

/// A positional statement parameter (`$1`, `$2`, ...).
///
/// Values are always sent as bound parameters, never spliced into SQL text.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    Int(i32),
    BigInt(i64),
    Date(NaiveDate),
    Bool(bool),
}

impl fmt::Display for SqlParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlParam::Text(v) => write!(f, "{v:?}"),
            SqlParam::Int(v) => write!(f, "{v}"),
            SqlParam::BigInt(v) => write!(f, "{v}"),
            SqlParam::Date(v) => write!(f, "{v}"),
            SqlParam::Bool(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for SqlParam {
    fn from(v: &str) -> Self {
        SqlParam::Text(v.to_string())
    }
}

impl From<String> for SqlParam {
    fn from(v: String) -> Self {
        SqlParam::Text(v)
    }
}

impl From<i32> for SqlParam {
    fn from(v: i32) -> Self {
        SqlParam::Int(v)
    }
}

impl From<i64> for SqlParam {
    fn from(v: i64) -> Self {
        SqlParam::BigInt(v)
    }
}

impl From<NaiveDate> for SqlParam {
    fn from(v: NaiveDate) -> Self {
        SqlParam::Date(v)
    }
}

impl From<bool> for SqlParam {
    fn from(v: bool) -> Self {
        SqlParam::Bool(v)
    }
}

/// Binds every parameter, in order, onto `query`.
pub(crate) fn bind_params<'q>(
    query: Query<'q, Postgres, PgArguments>,
    params: &'q [SqlParam],
) -> Query<'q, Postgres, PgArguments> {
    params
        .iter()
        .fold(query, |query, param| match param {
            SqlParam::Text(v) => query.bind(v.as_str()),
            SqlParam::Int(v) => query.bind(*v),
            SqlParam::BigInt(v) => query.bind(*v),
            SqlParam::Date(v) => query.bind(*v),
            SqlParam::Bool(v) => query.bind(*v),
        })
}

fn display_params(params: &[SqlParam]) -> String {
    params
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Name and database type of one result column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub type_name: String,
}

/// Everything the driver reports back for one statement.
///
/// `columns` is filled from the prepared statement, so an empty `SELECT` still
/// describes its shape. For statements without a result set `rows` is empty
/// and `rows_affected` comes from the command tag; otherwise it is the number
/// of rows returned.
pub struct QueryOutput {
    pub columns: Vec<ColumnInfo>,
    pub rows: Vec<PgRow>,
    pub rows_affected: u64,
}

/// Runs one parameterized statement against the shared pool.
pub async fn run_query(
    pool: &PgPool,
    sql: &str,
    params: &[SqlParam],
) -> Result<QueryOutput, DbError> {
    tracing::debug!(sql, params = %display_params(params), "run_query");
    let mut conn = pool.acquire().await?;
    let statement = (&mut *conn).prepare(sql).await?;

    let columns: Vec<ColumnInfo> = statement
        .columns()
        .iter()
        .map(|column| ColumnInfo {
            name: column.name().to_string(),
            type_name: column.type_info().name().to_string(),
        })
        .collect();

    let query = bind_params(statement.query(), params);
    let output = if columns.is_empty() {
        let result = query.execute(&mut *conn).await?;
        QueryOutput {
            columns,
            rows: Vec::new(),
            rows_affected: result.rows_affected(),
        }
    } else {
        let rows = query.fetch_all(&mut *conn).await?;
        QueryOutput {
            columns,
            rows_affected: rows.len() as u64,
            rows,
        }
    };

    tracing::debug!(rows_affected = output.rows_affected, "run_query done");
    Ok(output)
}

/// Runs one parameterized write inside an open transaction.
///
/// Returns the number of rows affected.
pub async fn exec_on_transaction(
    tx: &mut TxHandle,
    sql: &str,
    params: &[SqlParam],
) -> Result<u64, DbError> {
    tracing::debug!(sql, params = %display_params(params), "exec_on_transaction");
    let conn = tx.connection()?;
    match bind_params(sqlx::query(sql), params).execute(conn).await {
        Ok(result) => {
            tracing::debug!(rows_affected = result.rows_affected(), "exec_on_transaction done");
            Ok(result.rows_affected())
        }
        Err(e) => {
            tracing::error!(error = %e, sql, params = %display_params(params), "exec_on_transaction failed");
            Err(e.into())
        }
    }
}

/// Something that can run a single parameterized statement.
///
/// `TxHandle` is the production implementation; the multi-row helper only
/// needs this much.
#[async_trait]
pub trait StatementExecutor: Send {
    async fn execute_statement(&mut self, sql: &str, params: &[SqlParam]) -> Result<u64, DbError>;
}

#[async_trait]
impl StatementExecutor for TxHandle {
    async fn execute_statement(&mut self, sql: &str, params: &[SqlParam]) -> Result<u64, DbError> {
        exec_on_transaction(self, sql, params).await
    }
}

/// Runs `sql` once per parameter row, in order, stopping at the first failure.
///
/// An empty `rows` slice is rejected before anything is executed. Returns the
/// total number of rows affected.
pub async fn exec_many_on_transaction<E>(
    executor: &mut E,
    sql: &str,
    rows: &[Vec<SqlParam>],
) -> Result<u64, DbError>
where
    E: StatementExecutor + ?Sized,
{
    if rows.is_empty() {
        tracing::error!(sql, "exec_many_on_transaction: no data available");
        return Err(DbError::CallerMisuse(
            "exec_many_on_transaction called with no parameter rows".to_string(),
        ));
    }

    let mut affected = 0;
    for (index, params) in rows.iter().enumerate() {
        match executor.execute_statement(sql, params).await {
            Ok(n) => affected += n,
            Err(e) => {
                tracing::error!(row = index, error = %e, "exec_many_on_transaction failed");
                return Err(e);
            }
        }
    }
    Ok(affected)
}

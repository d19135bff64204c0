//! # Visit Report Database Crate
//!
//! This crate is the application's only point of contact with PostgreSQL.
//!
//! ## Architectural Principles
//!
//! - **Injected Pool:** `connect` hands back a `PgPool` that the caller owns and
//!   passes on. There is no process-global handle.
//! - **Bound Parameters Only:** every value that reaches SQL goes through
//!   `SqlParam` and is sent as a bound parameter.
//! - **Closed Error Set:** driver failures are classified into `DbError` kinds
//!   (connectivity, constraint violation, caller misuse, not found, query).
//!
//! ## Public API
//!
//! - `connect` / `bootstrap_schema`: pool construction and the awaited schema setup.
//! - `run_query`, `exec_on_transaction`, `exec_many_on_transaction`: the query executor.
//! - `begin`, `commit`, `rollback`: the transaction controller.
//! - `DbRepository` / `VisitStore`: visit reads used by the report.
//! - `report_for_year`: the caregiver report for one year.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod executor;
pub mod report;
pub mod repository;
pub mod transaction;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{BootstrapReport, bootstrap_schema, connect};
pub use error::DbError;
pub use executor::{
    ColumnInfo, QueryOutput, SqlParam, StatementExecutor, exec_many_on_transaction,
    exec_on_transaction, run_query,
};
pub use report::report_for_year;
pub use repository::{DbRepository, PoolStatus, VisitStore};
pub use transaction::{TxHandle, begin, commit, rollback};

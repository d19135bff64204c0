use crate::DbError;
use crate::executor::{run_query, SqlParam};
use async_trait::async_trait;
use chrono::NaiveDate;
use core_types::VisitRow;
use serde::Serialize;
use sqlx::postgres::PgPool;
use sqlx::FromRow;

/// Flat caregiver/patient rows for visits in `[$1, $2)`.
///
/// Bounds are bound parameters; nothing from the request is spliced into the text.
const VISITS_BETWEEN_SQL: &str = r#"
    SELECT
        caregiver.id      AS caregiver_id,
        caregiver.name    AS caregiver_name,
        patient.id        AS patient_id,
        patient.name      AS patient_name,
        visit.date        AS visit_date
    FROM caregiver
    JOIN visit ON visit.caregiver = caregiver.id
    JOIN patient ON patient.id = visit.patient
    WHERE visit.date >= $1 AND visit.date < $2
"#;

/// Connection pool occupancy, as reported by the health endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolStatus {
    pub size: u32,
    pub idle: usize,
}

/// Read access to visit data.
///
/// The web layer and the CLI depend on this trait rather than on a pool, so
/// they can be exercised against an in-memory fake.
#[async_trait]
pub trait VisitStore: Send + Sync {
    /// Visit rows whose date falls in `[start, end)`, in the order the store returns them.
    async fn visits_between(&self, start: NaiveDate, end: NaiveDate)
    -> Result<Vec<VisitRow>, DbError>;

    /// Round-trips to the store and reports pool occupancy.
    async fn health(&self) -> Result<PoolStatus, DbError>;
}

/// The `DbRepository` provides the application's data access over a shared pool.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: PgPool,
}

impl DbRepository {
    /// Creates a new `DbRepository` with a shared database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VisitStore for DbRepository {
    async fn visits_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<VisitRow>, DbError> {
        let params = [SqlParam::Date(start), SqlParam::Date(end)];
        let output = run_query(&self.pool, VISITS_BETWEEN_SQL, &params).await?;

        let visits = output
            .rows
            .iter()
            .map(VisitRow::from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(visits)
    }

    async fn health(&self) -> Result<PoolStatus, DbError> {
        run_query(&self.pool, "SELECT 1", &[]).await?;
        Ok(PoolStatus {
            size: self.pool.size(),
            idle: self.pool.num_idle(),
        })
    }
}

use crate::DbError;
use crate::repository::VisitStore;
use core_types::{Report, year_bounds};

/// Builds the caregiver report for one calendar year.
///
/// The year is validated before the store is touched; rows are folded in the
/// order the store returns them.
pub async fn report_for_year<S>(store: &S, year: i32) -> Result<Report, DbError>
where
    S: VisitStore + ?Sized,
{
    let (start, end) = year_bounds(year)?;
    let rows = store.visits_between(start, end).await?;
    tracing::debug!(year, rows = rows.len(), "Fetched visit rows for report.");
    Ok(Report::from_rows(year, rows))
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One flat row of the caregiver/visit/patient join.
///
/// The ids and `visit_date` are selected alongside the names but only the
/// names end up in a `Report`.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct VisitRow {
    pub caregiver_id: i32,
    pub caregiver_name: String,
    pub patient_id: i32,
    pub patient_name: String,
    pub visit_date: NaiveDate,
}

/// A caregiver and the patients they visited, one entry per visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaregiverGroup {
    pub name: String,
    pub patients: Vec<String>,
}

impl CaregiverGroup {
    pub fn new(name: impl Into<String>, first_patient: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            patients: vec![first_patient.into()],
        }
    }
}

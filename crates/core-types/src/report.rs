use crate::error::CoreError;
use crate::structs::{CaregiverGroup, VisitRow};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Smallest year accepted for a report.
pub const MIN_YEAR: i32 = 1;

/// The year-scoped, caregiver-grouped view of visit data.
///
/// This is the JSON body returned by `GET /api/report/:year`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub year: i32,
    pub caregivers: Vec<CaregiverGroup>,
}

impl Report {
    /// Creates an empty report for `year`.
    pub fn new(year: i32) -> Self {
        Self {
            year,
            caregivers: Vec::new(),
        }
    }

    /// Folds flat visit rows into per-caregiver groups.
    ///
    /// Rows are consumed in the order given. Groups appear in the order their
    /// caregiver name is first seen, and every row appends one patient name,
    /// so repeated visits to the same patient show up repeatedly.
    pub fn from_rows<I>(year: i32, rows: I) -> Self
    where
        I: IntoIterator<Item = VisitRow>,
    {
        let mut report = Self::new(year);
        for row in rows {
            report.push_visit(row.caregiver_name, row.patient_name);
        }
        report
    }

    /// Appends one visit, creating the caregiver's group on first sight.
    pub fn push_visit(&mut self, caregiver_name: String, patient_name: String) {
        // Linear scan: a single year's result set is small.
        match self
            .caregivers
            .iter_mut()
            .find(|group| group.name == caregiver_name)
        {
            Some(group) => group.patients.push(patient_name),
            None => self
                .caregivers
                .push(CaregiverGroup::new(caregiver_name, patient_name)),
        }
    }

    /// Total number of patient entries across all groups.
    pub fn visit_count(&self) -> usize {
        self.caregivers.iter().map(|g| g.patients.len()).sum()
    }
}

/// Returns the half-open date range `[year-01-01, (year+1)-01-01)` for a report.
///
/// Any year from 1 up to the last one whose following January 1st chrono can
/// represent is accepted.
pub fn year_bounds(year: i32) -> Result<(NaiveDate, NaiveDate), CoreError> {
    if year < MIN_YEAR {
        return Err(CoreError::InvalidYear(year));
    }
    let start = NaiveDate::from_ymd_opt(year, 1, 1).ok_or(CoreError::InvalidYear(year))?;
    let end = year
        .checked_add(1)
        .and_then(|next| NaiveDate::from_ymd_opt(next, 1, 1))
        .ok_or(CoreError::InvalidYear(year))?;
    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn row(caregiver: &str, patient: &str) -> VisitRow {
        VisitRow {
            caregiver_id: 0,
            caregiver_name: caregiver.to_string(),
            patient_id: 0,
            patient_name: patient.to_string(),
            visit_date: NaiveDate::from_ymd_opt(2023, 5, 1).unwrap(),
        }
    }

    #[test]
    fn groups_in_first_appearance_order() {
        let rows = vec![row("A", "P1"), row("B", "P2"), row("A", "P3")];
        let report = Report::from_rows(2023, rows);

        assert_eq!(
            report.caregivers,
            vec![
                CaregiverGroup {
                    name: "A".into(),
                    patients: vec!["P1".into(), "P3".into()],
                },
                CaregiverGroup {
                    name: "B".into(),
                    patients: vec!["P2".into()],
                },
            ]
        );
    }

    #[test]
    fn empty_rows_give_empty_report() {
        let report = Report::from_rows(2019, Vec::new());
        assert_eq!(report, Report::new(2019));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json, serde_json::json!({ "year": 2019, "caregivers": [] }));
    }

    #[test]
    fn repeated_visits_are_not_collapsed() {
        let rows = vec![row("A", "P1"), row("A", "P1")];
        let report = Report::from_rows(2023, rows);

        assert_eq!(report.caregivers.len(), 1);
        assert_eq!(report.caregivers[0].patients, vec!["P1", "P1"]);
    }

    #[test]
    fn serializes_to_nested_json() {
        let report = Report::from_rows(2023, vec![row("Ann", "Bob")]);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "year": 2023,
                "caregivers": [{ "name": "Ann", "patients": ["Bob"] }]
            })
        );
    }

    #[test]
    fn year_bounds_are_half_open_calendar_year() {
        let (start, end) = year_bounds(2023).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }

    #[test]
    fn year_bounds_rejects_out_of_range() {
        assert_eq!(year_bounds(0), Err(CoreError::InvalidYear(0)));
        assert_eq!(year_bounds(-5), Err(CoreError::InvalidYear(-5)));
        assert_eq!(year_bounds(i32::MAX), Err(CoreError::InvalidYear(i32::MAX)));
        // chrono tops out well below i32::MAX; the year whose successor it can't build is rejected.
        let last = NaiveDate::MAX.year();
        assert_eq!(year_bounds(last), Err(CoreError::InvalidYear(last)));
    }

    #[test]
    fn year_bounds_accepts_four_digit_edge() {
        let (start, end) = year_bounds(9999).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(9999, 1, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(10000, 1, 1).unwrap());
        assert!(year_bounds(MIN_YEAR).is_ok());
    }

    fn arb_rows() -> impl Strategy<Value = Vec<VisitRow>> {
        prop::collection::vec(("[A-E]", "[P-T][0-3]"), 0..60).prop_map(|pairs| {
            pairs
                .into_iter()
                .map(|(c, p)| row(&c, &p))
                .collect()
        })
    }

    proptest! {
        /// Property: every row contributes exactly one patient entry
        #[test]
        fn prop_patient_count_matches_rows(rows in arb_rows()) {
            let n = rows.len();
            let report = Report::from_rows(2023, rows);
            prop_assert_eq!(report.visit_count(), n);
        }

        /// Property: one group per distinct caregiver, and only caregivers from the input
        #[test]
        fn prop_one_group_per_caregiver(rows in arb_rows()) {
            let input_names: HashSet<String> =
                rows.iter().map(|r| r.caregiver_name.clone()).collect();
            let report = Report::from_rows(2023, rows);

            let group_names: Vec<&String> = report.caregivers.iter().map(|g| &g.name).collect();
            let unique: HashSet<&String> = group_names.iter().copied().collect();
            prop_assert_eq!(unique.len(), group_names.len());
            prop_assert_eq!(unique.len(), input_names.len());
            for name in &group_names {
                prop_assert!(input_names.contains(*name));
            }
        }

        /// Property: group order is first-appearance order of caregiver names
        #[test]
        fn prop_group_order_is_first_appearance(rows in arb_rows()) {
            let mut expected: Vec<String> = Vec::new();
            for r in &rows {
                if !expected.contains(&r.caregiver_name) {
                    expected.push(r.caregiver_name.clone());
                }
            }
            let report = Report::from_rows(2023, rows);
            let actual: Vec<String> = report.caregivers.into_iter().map(|g| g.name).collect();
            prop_assert_eq!(actual, expected);
        }

        /// Property: each group's patients are that caregiver's rows, in row order
        #[test]
        fn prop_patients_keep_row_order(rows in arb_rows()) {
            let report = Report::from_rows(2023, rows.clone());
            for group in &report.caregivers {
                let expected: Vec<String> = rows
                    .iter()
                    .filter(|r| r.caregiver_name == group.name)
                    .map(|r| r.patient_name.clone())
                    .collect();
                prop_assert_eq!(&group.patients, &expected);
            }
        }
    }
}

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Append-only ledger of salary-parameter changes. A row with a future
/// `effective_from` is pending until the bulk apply marks it applied; the
/// "latest" row for a user orders by (effective_from desc, created_at desc).
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct SalaryHistoryEntry {
    pub id: u64,
    pub user_id: u64,

    /// Null fields leave the corresponding user parameter untouched.
    pub base_salary: Option<f64>,
    pub working_days: Option<String>,
    pub daily_hours: Option<f64>,

    #[schema(example = "2024-04-01", value_type = String, format = "date")]
    pub effective_from: NaiveDate,

    pub applied: bool,

    #[schema(value_type = Option<String>, format = "date-time")]
    pub created_at: Option<DateTime<Utc>>,
}

impl SalaryHistoryEntry {
    pub fn is_pending(&self, today: NaiveDate) -> bool {
        !self.applied && self.effective_from > today
    }

    /// Due: unapplied and effective today or earlier.
    pub fn is_due(&self, today: NaiveDate) -> bool {
        !self.applied && self.effective_from <= today
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(effective_from: NaiveDate, applied: bool) -> SalaryHistoryEntry {
        SalaryHistoryEntry {
            id: 1,
            user_id: 7,
            base_salary: Some(60_000.0),
            working_days: None,
            daily_hours: None,
            effective_from,
            applied,
            created_at: None,
        }
    }

    #[test]
    fn future_entry_is_pending_not_due() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let e = entry(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(), false);
        assert!(e.is_pending(today));
        assert!(!e.is_due(today));
    }

    #[test]
    fn past_entry_is_due_until_applied() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let e = entry(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), false);
        assert!(e.is_due(today));
        assert!(!e.is_pending(today));

        let applied = entry(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), true);
        assert!(!applied.is_due(today));
        assert!(!applied.is_pending(today));
    }

    #[test]
    fn entry_effective_today_is_due() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let e = entry(today, false);
        assert!(e.is_due(today));
    }
}

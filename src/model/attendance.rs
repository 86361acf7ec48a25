use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::hours::{AttendanceStatus, attendance_status};

/// One row per (user, calendar date). Uniqueness is maintained by the
/// find-existing-then-update-else-insert path in the API layer, not by a
/// database constraint.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct AttendanceRecord {
    pub id: u64,
    pub user_id: u64,

    #[schema(example = "2024-02-05", value_type = String, format = "date")]
    pub date: NaiveDate,

    #[schema(value_type = Option<String>, format = "date-time")]
    pub check_in: Option<DateTime<Utc>>,

    #[schema(value_type = Option<String>, format = "date-time")]
    pub check_out: Option<DateTime<Utc>>,

    /// Who wrote the record (the user themself, or an HR actor).
    pub marked_by: Option<u64>,

    /// "self" | "hr"
    pub marked_by_role: String,

    /// "self" | "manual"
    pub check_in_method: String,

    pub notes: Option<String>,

    /// Worked hours met the per-day minimum. Set at check-out or HR mark.
    pub is_valid: bool,

    /// The check-in happened while connected to a registered office
    /// network, when verification was required.
    pub wifi_verified: bool,
}

impl AttendanceRecord {
    pub fn status(&self) -> AttendanceStatus {
        attendance_status(self.check_in, self.check_out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(check_in: Option<DateTime<Utc>>, check_out: Option<DateTime<Utc>>) -> AttendanceRecord {
        AttendanceRecord {
            id: 1,
            user_id: 7,
            date: NaiveDate::from_ymd_opt(2024, 2, 5).unwrap(),
            check_in,
            check_out,
            marked_by: Some(7),
            marked_by_role: "self".into(),
            check_in_method: "self".into(),
            notes: None,
            is_valid: false,
            wifi_verified: false,
        }
    }

    #[test]
    fn status_follows_timestamps() {
        let t_in = Utc.with_ymd_and_hms(2024, 2, 5, 9, 0, 0).unwrap();
        let t_out = Utc.with_ymd_and_hms(2024, 2, 5, 17, 0, 0).unwrap();
        assert_eq!(record(None, None).status(), AttendanceStatus::Absent);
        assert_eq!(
            record(Some(t_in), None).status(),
            AttendanceStatus::Incomplete
        );
        assert_eq!(
            record(Some(t_in), Some(t_out)).status(),
            AttendanceStatus::Present
        );
    }
}

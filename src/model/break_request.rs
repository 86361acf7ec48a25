use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BreakStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

/// A requested break inside an attendance record. Approved times stay null
/// until HR acts; at most one pending request per (user, attendance record)
/// is allowed at creation time (checked in the API layer, not enforced by
/// the schema).
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct BreakRequest {
    pub id: u64,
    pub user_id: u64,
    pub attendance_record_id: u64,

    #[schema(example = "2024-02-05", value_type = String, format = "date")]
    pub date: NaiveDate,

    #[schema(value_type = String, format = "date-time")]
    pub requested_start: DateTime<Utc>,

    #[schema(value_type = String, format = "date-time")]
    pub requested_end: DateTime<Utc>,

    #[schema(value_type = Option<String>, format = "date-time")]
    pub approved_start: Option<DateTime<Utc>>,

    #[schema(value_type = Option<String>, format = "date-time")]
    pub approved_end: Option<DateTime<Utc>>,

    pub status: String,
    pub reviewed_by: Option<u64>,
    pub reviewer_notes: Option<String>,
}

impl BreakRequest {
    /// Active: now falls within the approved window.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        match (self.approved_start, self.approved_end) {
            (Some(start), Some(end)) => now >= start && now <= end,
            _ => false,
        }
    }

    /// Upcoming: the approved window has not started yet.
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        match self.approved_start {
            Some(start) => start > now,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 5, h, m, 0).unwrap()
    }

    fn approved(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> BreakRequest {
        BreakRequest {
            id: 1,
            user_id: 7,
            attendance_record_id: 3,
            date: NaiveDate::from_ymd_opt(2024, 2, 5).unwrap(),
            requested_start: at(12, 0),
            requested_end: at(12, 30),
            approved_start: start,
            approved_end: end,
            status: BreakStatus::Approved.to_string(),
            reviewed_by: Some(2),
            reviewer_notes: None,
        }
    }

    #[test]
    fn active_inside_approved_window() {
        let b = approved(Some(at(12, 0)), Some(at(12, 30)));
        assert!(b.is_active(at(12, 15)));
        assert!(b.is_active(at(12, 0)));
        assert!(b.is_active(at(12, 30)));
        assert!(!b.is_active(at(12, 31)));
        assert!(!b.is_active(at(11, 59)));
    }

    #[test]
    fn upcoming_before_approved_start() {
        let b = approved(Some(at(15, 0)), Some(at(15, 30)));
        assert!(b.is_upcoming(at(12, 0)));
        assert!(!b.is_upcoming(at(15, 0)));
        assert!(!b.is_upcoming(at(16, 0)));
    }

    #[test]
    fn unapproved_break_is_neither_active_nor_upcoming() {
        let b = approved(None, None);
        assert!(!b.is_active(at(12, 0)));
        assert!(!b.is_upcoming(at(12, 0)));
    }

    #[test]
    fn status_round_trips_through_strings() {
        let parsed: BreakStatus = "pending".parse().unwrap();
        assert_eq!(parsed, BreakStatus::Pending);
        assert_eq!(BreakStatus::Cancelled.to_string(), "cancelled");
    }
}

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl LeaveStatus {
    /// Update and cancel are only allowed while pending; a reviewed
    /// request is terminal.
    pub fn is_mutable(self) -> bool {
        self == LeaveStatus::Pending
    }
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct LeaveRequest {
    pub id: u64,
    pub user_id: u64,
    pub leave_type: String,

    #[schema(example = "2024-03-01", value_type = String, format = "date")]
    pub start_date: NaiveDate,

    #[schema(example = "2024-03-03", value_type = String, format = "date")]
    pub end_date: NaiveDate,

    pub reason: Option<String>,
    pub status: String,
    pub reviewed_by: Option<u64>,
    pub reviewer_notes: Option<String>,

    #[schema(value_type = Option<String>, format = "date-time")]
    pub reviewed_at: Option<DateTime<Utc>>,

    #[schema(value_type = Option<String>, format = "date-time")]
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_pending_is_mutable() {
        assert!(LeaveStatus::Pending.is_mutable());
        assert!(!LeaveStatus::Approved.is_mutable());
        assert!(!LeaveStatus::Rejected.is_mutable());
        assert!(!LeaveStatus::Cancelled.is_mutable());
    }
}

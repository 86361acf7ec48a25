use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SalaryStatus {
    Draft,
    Pending,
    Approved,
    Paid,
}

impl SalaryStatus {
    fn rank(self) -> u8 {
        match self {
            SalaryStatus::Draft => 0,
            SalaryStatus::Pending => 1,
            SalaryStatus::Approved => 2,
            SalaryStatus::Paid => 3,
        }
    }

    /// Forward-only transitions; an explicit HR override may move in any
    /// direction (but never to the same status).
    pub fn can_transition_to(self, next: SalaryStatus, hr_override: bool) -> bool {
        if next == self {
            return false;
        }
        hr_override || next.rank() > self.rank()
    }
}

/// One per (user, month, year). `total_salary` is always recomputed as
/// base + allowances + bonus - deductions on write, never trusted from
/// the client.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct SalaryRecord {
    pub id: u64,
    pub user_id: u64,

    #[schema(example = 2, minimum = 1, maximum = 12)]
    pub month: u32,

    #[schema(example = 2024)]
    pub year: i32,

    pub base_salary: f64,
    pub allowances: f64,
    pub deductions: f64,
    pub bonus: f64,
    pub working_days: u32,
    pub present_days: u32,
    pub leaves_taken: u32,
    pub total_salary: f64,
    pub status: String,
    pub approved_by: Option<u64>,

    #[schema(example = "2024-03-01", value_type = Option<String>, format = "date")]
    pub payment_date: Option<NaiveDate>,
}

pub fn compute_total_salary(base: f64, allowances: f64, bonus: f64, deductions: f64) -> f64 {
    base + allowances + bonus - deductions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_transitions_allowed() {
        assert!(SalaryStatus::Draft.can_transition_to(SalaryStatus::Pending, false));
        assert!(SalaryStatus::Pending.can_transition_to(SalaryStatus::Approved, false));
        assert!(SalaryStatus::Approved.can_transition_to(SalaryStatus::Paid, false));
        // skipping forward is still forward
        assert!(SalaryStatus::Draft.can_transition_to(SalaryStatus::Paid, false));
    }

    #[test]
    fn backward_requires_override() {
        assert!(!SalaryStatus::Paid.can_transition_to(SalaryStatus::Draft, false));
        assert!(!SalaryStatus::Approved.can_transition_to(SalaryStatus::Pending, false));
        assert!(SalaryStatus::Paid.can_transition_to(SalaryStatus::Draft, true));
    }

    #[test]
    fn self_transition_is_never_allowed() {
        assert!(!SalaryStatus::Pending.can_transition_to(SalaryStatus::Pending, false));
        assert!(!SalaryStatus::Pending.can_transition_to(SalaryStatus::Pending, true));
    }

    #[test]
    fn total_salary_formula() {
        assert_eq!(compute_total_salary(50_000.0, 5_000.0, 2_000.0, 3_000.0), 54_000.0);
        assert_eq!(compute_total_salary(0.0, 0.0, 0.0, 0.0), 0.0);
    }
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

/// Employee/HR/admin account. Salary parameters (`base_salary`,
/// `working_days`, `daily_hours`) hold the currently effective values;
/// staged changes live in `salary_history` until applied.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "username": "jdoe",
        "email": "jane.doe@company.com",
        "full_name": "Jane Doe",
        "role_id": 3,
        "organization_id": 10,
        "is_active": true,
        "working_days": "monday,tuesday,wednesday,thursday,friday",
        "daily_hours": 8.0,
        "base_salary": 50000.0,
        "wifi_verification_required": true,
        "hire_date": "2024-01-01"
    })
)]
pub struct User {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "jdoe")]
    pub username: String,

    #[schema(example = "jane.doe@company.com")]
    pub email: String,

    #[schema(example = "Jane Doe")]
    pub full_name: String,

    #[schema(example = 3)]
    pub role_id: u8,

    #[schema(example = 10, nullable = true)]
    pub organization_id: Option<u64>,

    #[schema(example = true)]
    pub is_active: bool,

    /// Comma-separated weekday names; empty means unrestricted for the
    /// attendance validator.
    #[schema(example = "monday,tuesday,wednesday,thursday,friday")]
    pub working_days: String,

    #[schema(example = 8.0)]
    pub daily_hours: f64,

    #[schema(example = 50000.0)]
    pub base_salary: f64,

    #[schema(example = true)]
    pub wifi_verification_required: bool,

    #[schema(example = "2024-01-01", value_type = String, format = "date")]
    pub hire_date: NaiveDate,
}

use crate::auth::auth::AuthUser;
use crate::domain::hours::{
    AttendanceStatus, MIN_VALID_HOURS, attendance_percentage, format_hours, is_valid_attendance,
    total_hours,
};
use crate::domain::validation::validate_attendance;
use crate::domain::wifi::{NetworkVerification, verify_presence};
use crate::domain::workdays::{WorkingDays, hourly_rate, monthly_total_hours, working_days_in_month};
use crate::model::attendance::AttendanceRecord;
use crate::utils::network_cache;
use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

#[derive(sqlx::FromRow)]
struct UserParams {
    working_days: String,
    daily_hours: f64,
    base_salary: f64,
    wifi_verification_required: bool,
    organization_id: Option<u64>,
}

async fn fetch_user_params(
    pool: &MySqlPool,
    user_id: u64,
) -> Result<Option<UserParams>, sqlx::Error> {
    sqlx::query_as::<_, UserParams>(
        r#"
        SELECT working_days, daily_hours, base_salary,
               wifi_verification_required, organization_id
        FROM users
        WHERE id = ? AND is_active = TRUE
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

fn parse_working_days(raw: &str, user_id: u64) -> actix_web::Result<WorkingDays> {
    raw.parse::<WorkingDays>().map_err(|e| {
        tracing::error!(error = %e, user_id, "Corrupt working_days configuration");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })
}

/// Evaluates the office-network policy for a check-in. A cache/DB failure
/// degrades instead of erroring: pass when verification is not required,
/// fail when it is.
async fn network_verification(
    pool: &MySqlPool,
    params: &UserParams,
    ssid: Option<&str>,
    permission_granted: bool,
) -> NetworkVerification {
    if !params.wifi_verification_required {
        return NetworkVerification::NotRequired;
    }

    let office = match params.organization_id {
        Some(org_id) => match network_cache::office_networks(pool, org_id).await {
            Ok(ssids) => ssids,
            Err(e) => {
                tracing::error!(error = %e, org_id, "Failed to load office networks");
                return NetworkVerification::UnknownNetwork;
            }
        },
        None => return NetworkVerification::UnknownNetwork,
    };

    verify_presence(true, permission_granted, ssid, &office)
}

#[derive(Deserialize, ToSchema)]
pub struct CheckInReq {
    /// SSID the device reports being connected to, if any
    #[schema(example = "HQ-Floor1")]
    pub ssid: Option<String>,

    /// Whether the device granted the location permission needed to read
    /// the SSID
    #[schema(example = true, default = false)]
    #[serde(default)]
    pub location_permission_granted: bool,
}

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/v1/attendance/check-in",
    request_body = CheckInReq,
    responses(
        (status = 200, description = "Checked in successfully", body = Object, example = json!({
            "message": "Checked in successfully",
            "wifi_verified": true
        })),
        (status = 400, description = "Already checked in today, or not a working day"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_in(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CheckInReq>,
) -> actix_web::Result<impl Responder> {
    let now = Utc::now();
    let today = now.date_naive();

    let params = fetch_user_params(pool.get_ref(), auth.user_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id = auth.user_id, "Check-in: user lookup failed");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?
        .ok_or_else(|| actix_web::error::ErrorForbidden("No active user profile"))?;

    let working_days = parse_working_days(&params.working_days, auth.user_id)?;

    if let Err(rule) = validate_attendance(today, &working_days, Some(now), None, now) {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": rule.to_string()
        })));
    }

    // One row per (user, date); a second check-in the same day is rejected.
    let existing = sqlx::query_as::<_, (u64, Option<DateTime<Utc>>)>(
        r#"
        SELECT id, check_in
        FROM attendance_records
        WHERE user_id = ? AND date = ?
        "#,
    )
    .bind(auth.user_id)
    .bind(today)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, user_id = auth.user_id, "Check-in: record lookup failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let verification = network_verification(
        pool.get_ref(),
        &params,
        payload.ssid.as_deref(),
        payload.location_permission_granted,
    )
    .await;

    match existing {
        Some((_, Some(_))) => {
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "message": "Already checked in today"
            })));
        }
        Some((record_id, None)) => {
            // HR pre-created the row (e.g. notes only); fill in the check-in.
            sqlx::query(
                r#"
                UPDATE attendance_records
                SET check_in = ?, marked_by = ?, marked_by_role = 'self',
                    check_in_method = 'self', wifi_verified = ?
                WHERE id = ?
                "#,
            )
            .bind(now)
            .bind(auth.user_id)
            .bind(verification.verified())
            .bind(record_id)
            .execute(pool.get_ref())
            .await
            .map_err(|e| {
                tracing::error!(error = %e, record_id, "Check-in update failed");
                actix_web::error::ErrorInternalServerError("Internal Server Error")
            })?;
        }
        None => {
            sqlx::query(
                r#"
                INSERT INTO attendance_records
                    (user_id, date, check_in, marked_by, marked_by_role,
                     check_in_method, wifi_verified)
                VALUES (?, ?, ?, ?, 'self', 'self', ?)
                "#,
            )
            .bind(auth.user_id)
            .bind(today)
            .bind(now)
            .bind(auth.user_id)
            .bind(verification.verified())
            .execute(pool.get_ref())
            .await
            .map_err(|e| {
                tracing::error!(error = %e, user_id = auth.user_id, "Check-in insert failed");
                actix_web::error::ErrorInternalServerError("Internal Server Error")
            })?;
        }
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Checked in successfully",
        "wifi_verified": verification.verified(),
        "network_check": verification
    })))
}

/// Check-out endpoint
#[utoipa::path(
    put,
    path = "/api/v1/attendance/check-out",
    responses(
        (status = 200, description = "Checked out successfully", body = Object, example = json!({
            "message": "Checked out successfully",
            "total_hours": 8.75,
            "formatted": "8h 45m",
            "is_valid": true
        })),
        (status = 400, description = "No active check-in found for today"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_out(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let now = Utc::now();
    let today = now.date_naive();

    let record = sqlx::query_as::<_, (u64, DateTime<Utc>)>(
        r#"
        SELECT id, check_in
        FROM attendance_records
        WHERE user_id = ? AND date = ?
        AND check_in IS NOT NULL AND check_out IS NULL
        "#,
    )
    .bind(auth.user_id)
    .bind(today)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, user_id = auth.user_id, "Check-out lookup failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let (record_id, check_in) = match record {
        Some(r) => r,
        None => {
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "message": "No active check-in found for today"
            })));
        }
    };

    // Same rules as every other attendance write. The working-day check is
    // skipped here: the record already passed it at check-in.
    if let Err(rule) =
        validate_attendance(today, &WorkingDays::default(), Some(check_in), Some(now), now)
    {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": rule.to_string()
        })));
    }

    let hours = total_hours(check_in, now);
    let is_valid = is_valid_attendance(hours, MIN_VALID_HOURS);

    sqlx::query(
        r#"
        UPDATE attendance_records
        SET check_out = ?, is_valid = ?
        WHERE id = ?
        "#,
    )
    .bind(now)
    .bind(is_valid)
    .bind(record_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, record_id, "Check-out failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Checked out successfully",
        "total_hours": hours,
        "formatted": format_hours(hours),
        "is_valid": is_valid
    })))
}

#[derive(Deserialize, ToSchema)]
pub struct ManualMarkReq {
    #[schema(example = 1001)]
    pub user_id: u64,

    #[schema(example = "2024-02-05", value_type = String, format = "date")]
    pub date: NaiveDate,

    #[schema(value_type = Option<String>, format = "date-time")]
    pub check_in: Option<DateTime<Utc>>,

    #[schema(value_type = Option<String>, format = "date-time")]
    pub check_out: Option<DateTime<Utc>>,

    pub notes: Option<String>,
}

/// HR manual mark: validate, then update the (user, date) row in place or
/// insert a new one. Sequential single-writer use never produces two rows
/// for the same day; simultaneous HR edits are last-write-wins.
#[utoipa::path(
    post,
    path = "/api/v1/attendance/manual",
    request_body = ManualMarkReq,
    responses(
        (status = 200, description = "Attendance updated"),
        (status = 201, description = "Attendance created"),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn manual_mark(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<ManualMarkReq>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let now = Utc::now();

    let params = fetch_user_params(pool.get_ref(), payload.user_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id = payload.user_id, "Manual mark: user lookup failed");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let params = match params {
        Some(p) => p,
        None => {
            return Ok(HttpResponse::NotFound().json(serde_json::json!({
                "message": "User not found"
            })));
        }
    };

    let working_days = parse_working_days(&params.working_days, payload.user_id)?;

    if let Err(rule) = validate_attendance(
        payload.date,
        &working_days,
        payload.check_in,
        payload.check_out,
        now,
    ) {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": rule.to_string()
        })));
    }

    let is_valid = match (payload.check_in, payload.check_out) {
        (Some(i), Some(o)) => is_valid_attendance(total_hours(i, o), MIN_VALID_HOURS),
        _ => false,
    };

    let existing = sqlx::query_scalar::<_, u64>(
        r#"
        SELECT id
        FROM attendance_records
        WHERE user_id = ? AND date = ?
        "#,
    )
    .bind(payload.user_id)
    .bind(payload.date)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, user_id = payload.user_id, "Manual mark: record lookup failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    match existing {
        Some(record_id) => {
            sqlx::query(
                r#"
                UPDATE attendance_records
                SET check_in = ?, check_out = ?, notes = ?, is_valid = ?,
                    marked_by = ?, marked_by_role = 'hr'
                WHERE id = ?
                "#,
            )
            .bind(payload.check_in)
            .bind(payload.check_out)
            .bind(&payload.notes)
            .bind(is_valid)
            .bind(auth.user_id)
            .bind(record_id)
            .execute(pool.get_ref())
            .await
            .map_err(|e| {
                tracing::error!(error = %e, record_id, "Manual mark update failed");
                actix_web::error::ErrorInternalServerError("Internal Server Error")
            })?;

            Ok(HttpResponse::Ok().json(serde_json::json!({
                "message": "Attendance updated"
            })))
        }
        None => {
            sqlx::query(
                r#"
                INSERT INTO attendance_records
                    (user_id, date, check_in, check_out, notes, is_valid,
                     marked_by, marked_by_role, check_in_method, wifi_verified)
                VALUES (?, ?, ?, ?, ?, ?, ?, 'hr', 'manual', FALSE)
                "#,
            )
            .bind(payload.user_id)
            .bind(payload.date)
            .bind(payload.check_in)
            .bind(payload.check_out)
            .bind(&payload.notes)
            .bind(is_valid)
            .bind(auth.user_id)
            .execute(pool.get_ref())
            .await
            .map_err(|e| {
                tracing::error!(error = %e, user_id = payload.user_id, "Manual mark insert failed");
                actix_web::error::ErrorInternalServerError("Internal Server Error")
            })?;

            Ok(HttpResponse::Created().json(serde_json::json!({
                "message": "Attendance created"
            })))
        }
    }
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct AttendanceFilter {
    /// Filter by user (HR/Admin only; employees always see their own)
    pub user_id: Option<u64>,
    #[schema(value_type = Option<String>, format = "date")]
    pub from: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = "date")]
    pub to: Option<NaiveDate>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

// Helper enum for typed SQLx binding
enum FilterValue {
    U64(u64),
    Date(NaiveDate),
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceListResponse {
    pub data: Vec<AttendanceRecord>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

/// Paginated attendance list
#[utoipa::path(
    get,
    path = "/api/v1/attendance",
    params(AttendanceFilter),
    responses(
        (status = 200, description = "Paginated attendance list", body = AttendanceListResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn list_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<AttendanceFilter>,
) -> actix_web::Result<impl Responder> {
    let per_page = query.per_page.unwrap_or(10).clamp(1, 100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    // Employees may only read their own records.
    let user_filter = if auth.is_employee() {
        Some(auth.user_id)
    } else {
        query.user_id
    };

    if let Some(user_id) = user_filter {
        where_sql.push_str(" AND user_id = ?");
        args.push(FilterValue::U64(user_id));
    }

    if let Some(from) = query.from {
        where_sql.push_str(" AND date >= ?");
        args.push(FilterValue::Date(from));
    }

    if let Some(to) = query.to {
        where_sql.push_str(" AND date <= ?");
        args.push(FilterValue::Date(to));
    }

    let count_sql = format!("SELECT COUNT(*) FROM attendance_records{}", where_sql);

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::U64(v) => count_q.bind(*v),
            FilterValue::Date(d) => count_q.bind(*d),
        };
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to count attendance records");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let data_sql = format!(
        r#"
        SELECT id, user_id, date, check_in, check_out, marked_by,
               marked_by_role, check_in_method, notes, is_valid, wifi_verified
        FROM attendance_records
        {}
        ORDER BY date DESC
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, AttendanceRecord>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(v),
            FilterValue::Date(d) => data_q.bind(d),
        };
    }

    let records = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch attendance list");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(AttendanceListResponse {
        data: records,
        page,
        per_page,
        total,
    }))
}

/// Delete a record (HR only)
#[utoipa::path(
    delete,
    path = "/api/v1/attendance/{record_id}",
    params(("record_id", description = "Attendance record ID")),
    responses(
        (status = 200, description = "Record deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Record not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn delete_record(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let record_id = path.into_inner();

    let result = sqlx::query("DELETE FROM attendance_records WHERE id = ?")
        .bind(record_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, record_id, "Failed to delete attendance record");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Record not found"
        })));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Record deleted"
    })))
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct SummaryQuery {
    /// Defaults to the caller; HR/Admin may query anyone
    pub user_id: Option<u64>,
    #[schema(example = 2, minimum = 1, maximum = 12)]
    pub month: u32,
    #[schema(example = 2024)]
    pub year: i32,
}

#[derive(Serialize, ToSchema)]
pub struct MonthlySummary {
    pub user_id: u64,
    pub month: u32,
    pub year: i32,
    pub working_days: u32,
    pub present_days: u32,
    pub incomplete_days: u32,
    pub valid_days: u32,
    pub attendance_percentage: u32,
    pub total_hours: f64,
    pub formatted_hours: String,
    pub expected_hours: f64,
    pub hourly_rate: f64,
}

/// Month-level attendance and earnings summary, derived on the fly from
/// the user's records and configured working days.
#[utoipa::path(
    get,
    path = "/api/v1/attendance/summary",
    params(SummaryQuery),
    responses(
        (status = 200, description = "Monthly summary", body = MonthlySummary),
        (status = 400, description = "Invalid month"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn monthly_summary(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<SummaryQuery>,
) -> actix_web::Result<impl Responder> {
    if !(1..=12).contains(&query.month) {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "month must be between 1 and 12"
        })));
    }

    let target_user = match query.user_id {
        Some(id) if id != auth.user_id => {
            auth.require_hr_or_admin()?;
            id
        }
        _ => auth.user_id,
    };

    let params = fetch_user_params(pool.get_ref(), target_user)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id = target_user, "Summary: user lookup failed");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let params = match params {
        Some(p) => p,
        None => {
            return Ok(HttpResponse::NotFound().json(serde_json::json!({
                "message": "User not found"
            })));
        }
    };

    let working_days = parse_working_days(&params.working_days, target_user)?;

    let records = sqlx::query_as::<_, AttendanceRecord>(
        r#"
        SELECT id, user_id, date, check_in, check_out, marked_by,
               marked_by_role, check_in_method, notes, is_valid, wifi_verified
        FROM attendance_records
        WHERE user_id = ? AND YEAR(date) = ? AND MONTH(date) = ?
        ORDER BY date
        "#,
    )
    .bind(target_user)
    .bind(query.year)
    .bind(query.month)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, user_id = target_user, "Summary: record fetch failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let mut present = 0u32;
    let mut incomplete = 0u32;
    let mut valid = 0u32;
    let mut hours_sum = 0.0f64;

    for record in &records {
        match record.status() {
            AttendanceStatus::Present => {
                present += 1;
                if let (Some(i), Some(o)) = (record.check_in, record.check_out) {
                    hours_sum += total_hours(i, o);
                }
            }
            AttendanceStatus::Incomplete => incomplete += 1,
            AttendanceStatus::Absent => {}
        }
        if record.is_valid {
            valid += 1;
        }
    }

    let month_working_days = working_days_in_month(&working_days, query.month, query.year);
    let expected =
        monthly_total_hours(&working_days, params.daily_hours, query.month, query.year);

    Ok(HttpResponse::Ok().json(MonthlySummary {
        user_id: target_user,
        month: query.month,
        year: query.year,
        working_days: month_working_days,
        present_days: present,
        incomplete_days: incomplete,
        valid_days: valid,
        attendance_percentage: attendance_percentage(present, month_working_days),
        total_hours: (hours_sum * 100.0).round() / 100.0,
        formatted_hours: format_hours(hours_sum),
        expected_hours: expected,
        hourly_rate: hourly_rate(params.base_salary, expected),
    }))
}

#[derive(Deserialize, ToSchema)]
pub struct VerifyNetworkReq {
    #[schema(example = "HQ-Floor1")]
    pub ssid: Option<String>,
    #[schema(example = true, default = false)]
    #[serde(default)]
    pub location_permission_granted: bool,
}

/// Evaluate the office-network presence policy for the caller without
/// writing anything.
#[utoipa::path(
    post,
    path = "/api/v1/attendance/verify-network",
    request_body = VerifyNetworkReq,
    responses(
        (status = 200, description = "Verification outcome", body = Object, example = json!({
            "verified": true,
            "outcome": "office_network"
        }))
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn verify_network(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<VerifyNetworkReq>,
) -> actix_web::Result<impl Responder> {
    let params = fetch_user_params(pool.get_ref(), auth.user_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id = auth.user_id, "Verify-network: user lookup failed");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?
        .ok_or_else(|| actix_web::error::ErrorForbidden("No active user profile"))?;

    let outcome = network_verification(
        pool.get_ref(),
        &params,
        payload.ssid.as_deref(),
        payload.location_permission_granted,
    )
    .await;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "verified": outcome.verified(),
        "outcome": outcome
    })))
}

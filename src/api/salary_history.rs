use actix_web::{HttpResponse, Responder, web};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::domain::workdays::WorkingDays;
use crate::model::salary_history::SalaryHistoryEntry;

const HISTORY_COLUMNS: &str = "id, user_id, base_salary, working_days, daily_hours, \
                               effective_from, applied, created_at";

#[derive(Deserialize, ToSchema)]
pub struct CreateSalaryChange {
    #[schema(example = 1001)]
    pub user_id: u64,

    /// Omitted fields leave the corresponding user parameter unchanged
    #[schema(example = 60000.0)]
    pub base_salary: Option<f64>,

    #[schema(example = "monday,tuesday,wednesday,thursday,friday")]
    pub working_days: Option<String>,

    #[schema(example = 7.5)]
    pub daily_hours: Option<f64>,

    #[schema(example = "2024-04-01", value_type = String, format = "date")]
    pub effective_from: NaiveDate,
}

/// Stage a salary-parameter change. The ledger is append-only; the change
/// reaches the user row when the bulk apply runs on or after the
/// effective date.
#[utoipa::path(
    post,
    path = "/api/v1/salary-history",
    request_body = CreateSalaryChange,
    responses(
        (status = 201, description = "Change recorded"),
        (status = 400, description = "Empty change or bad working-day set"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "SalaryHistory"
)]
pub async fn create_change(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateSalaryChange>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    if payload.base_salary.is_none()
        && payload.working_days.is_none()
        && payload.daily_hours.is_none()
    {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "At least one of base_salary, working_days, daily_hours is required"
        })));
    }

    if let Some(raw) = payload.working_days.as_deref() {
        if raw.parse::<WorkingDays>().is_err() {
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "message": "working_days must be a comma-separated list of weekday names"
            })));
        }
    }

    sqlx::query(
        r#"
        INSERT INTO salary_history
            (user_id, base_salary, working_days, daily_hours, effective_from, applied)
        VALUES (?, ?, ?, ?, ?, FALSE)
        "#,
    )
    .bind(payload.user_id)
    .bind(payload.base_salary)
    .bind(&payload.working_days)
    .bind(payload.daily_hours)
    .bind(payload.effective_from)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, user_id = payload.user_id, "Failed to record salary change");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Change recorded",
        "effective_from": payload.effective_from
    })))
}

/// Full ledger for a user, newest effective date first
#[utoipa::path(
    get,
    path = "/api/v1/salary-history/{user_id}",
    params(("user_id", description = "User whose ledger to read")),
    responses(
        (status = 200, body = Vec<SalaryHistoryEntry>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "SalaryHistory"
)]
pub async fn list_history(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let user_id = path.into_inner();

    if auth.is_employee() && user_id != auth.user_id {
        return Err(actix_web::error::ErrorForbidden("Not your salary history"));
    }

    let sql = format!(
        r#"
        SELECT {HISTORY_COLUMNS}
        FROM salary_history
        WHERE user_id = ?
        ORDER BY effective_from DESC, created_at DESC
        "#
    );

    let entries = sqlx::query_as::<_, SalaryHistoryEntry>(&sql)
        .bind(user_id)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id, "Failed to fetch salary history");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(entries))
}

/// The single latest ledger row for a user, by (effective_from desc,
/// created_at desc)
#[utoipa::path(
    get,
    path = "/api/v1/salary-history/{user_id}/latest",
    params(("user_id", description = "User whose latest change to read")),
    responses(
        (status = 200, body = SalaryHistoryEntry),
        (status = 404, description = "No history for this user")
    ),
    security(("bearer_auth" = [])),
    tag = "SalaryHistory"
)]
pub async fn latest_entry(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let user_id = path.into_inner();

    if auth.is_employee() && user_id != auth.user_id {
        return Err(actix_web::error::ErrorForbidden("Not your salary history"));
    }

    let sql = format!(
        r#"
        SELECT {HISTORY_COLUMNS}
        FROM salary_history
        WHERE user_id = ?
        ORDER BY effective_from DESC, created_at DESC
        LIMIT 1
        "#
    );

    let entry = sqlx::query_as::<_, SalaryHistoryEntry>(&sql)
        .bind(user_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id, "Failed to fetch latest salary change");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    match entry {
        Some(e) => Ok(HttpResponse::Ok().json(e)),
        None => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "No history for this user"
        }))),
    }
}

/// Apply every due change (effective today or earlier, not yet applied) to
/// the owning users, oldest first so stacked changes land in order. Each
/// entry takes two writes with no cross-table transaction; a failure
/// between them leaves that entry unapplied and the next run retries it.
#[utoipa::path(
    post,
    path = "/api/v1/salary-history/apply-pending",
    responses(
        (status = 200, description = "Due changes applied", body = Object, example = json!({
            "message": "Applied 3 salary changes",
            "applied": 3
        })),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "SalaryHistory"
)]
pub async fn apply_pending(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let today = Utc::now().date_naive();

    let sql = format!(
        r#"
        SELECT {HISTORY_COLUMNS}
        FROM salary_history
        WHERE applied = FALSE AND effective_from <= ?
        ORDER BY effective_from ASC, created_at ASC
        "#
    );

    let due = sqlx::query_as::<_, SalaryHistoryEntry>(&sql)
        .bind(today)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch due salary changes");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let mut applied = 0u32;

    for entry in due {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET base_salary = COALESCE(?, base_salary),
                working_days = COALESCE(?, working_days),
                daily_hours = COALESCE(?, daily_hours)
            WHERE id = ?
            "#,
        )
        .bind(entry.base_salary)
        .bind(&entry.working_days)
        .bind(entry.daily_hours)
        .bind(entry.user_id)
        .execute(pool.get_ref())
        .await;

        if let Err(e) = result {
            tracing::error!(error = %e, entry_id = entry.id, "Failed to apply salary change");
            continue;
        }

        if let Err(e) = sqlx::query("UPDATE salary_history SET applied = TRUE WHERE id = ?")
            .bind(entry.id)
            .execute(pool.get_ref())
            .await
        {
            // User row already updated; the entry stays due and will be
            // re-applied idempotently on the next run.
            tracing::error!(error = %e, entry_id = entry.id, "Failed to mark change applied");
            continue;
        }

        applied += 1;
    }

    tracing::info!(applied, "Salary change apply run complete");

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": format!("Applied {applied} salary changes"),
        "applied": applied
    })))
}

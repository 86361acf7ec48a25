use actix_web::{HttpResponse, Responder, web};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::model::salary::{SalaryRecord, SalaryStatus, compute_total_salary};

const SALARY_COLUMNS: &str = "id, user_id, month, year, base_salary, allowances, deductions, \
                              bonus, working_days, present_days, leaves_taken, total_salary, \
                              status, approved_by, payment_date";

#[derive(Deserialize, ToSchema)]
pub struct CreateSalary {
    #[schema(example = 1001)]
    pub user_id: u64,

    #[schema(example = 2, minimum = 1, maximum = 12)]
    pub month: u32,

    #[schema(example = 2024)]
    pub year: i32,

    #[schema(example = 50000.0)]
    pub base_salary: f64,

    #[schema(example = 5000.0, default = 0.0)]
    #[serde(default)]
    pub allowances: f64,

    #[schema(example = 2000.0, default = 0.0)]
    #[serde(default)]
    pub deductions: f64,

    #[schema(example = 3000.0, default = 0.0)]
    #[serde(default)]
    pub bonus: f64,

    #[schema(example = 21)]
    pub working_days: u32,

    #[schema(example = 20)]
    pub present_days: u32,

    #[schema(example = 1, default = 0)]
    #[serde(default)]
    pub leaves_taken: u32,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateSalary {
    pub base_salary: Option<f64>,
    pub allowances: Option<f64>,
    pub deductions: Option<f64>,
    pub bonus: Option<f64>,
    pub working_days: Option<u32>,
    pub present_days: Option<u32>,
    pub leaves_taken: Option<u32>,
}

#[derive(Deserialize, ToSchema)]
pub struct TransitionSalary {
    #[schema(example = "pending")]
    pub status: SalaryStatus,

    /// Explicit HR override: permits a backward move
    #[schema(example = false, default = false)]
    #[serde(default)]
    pub hr_override: bool,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct SalaryQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub user_id: Option<u64>,
    pub year: Option<i32>,
}

#[derive(Serialize, ToSchema)]
pub struct SalaryListResponse {
    pub data: Vec<SalaryRecord>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

/// Create the salary record for a (user, month, year)
#[utoipa::path(
    post,
    path = "/api/v1/salary",
    request_body = CreateSalary,
    responses(
        (status = 201, description = "Salary record created"),
        (status = 400, description = "Invalid month or record already exists"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Salary"
)]
pub async fn create_salary(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateSalary>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    if !(1..=12).contains(&payload.month) {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "month must be between 1 and 12"
        })));
    }

    let exists = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM salary_records
            WHERE user_id = ? AND month = ? AND year = ?
            LIMIT 1
        )
        "#,
    )
    .bind(payload.user_id)
    .bind(payload.month)
    .bind(payload.year)
    .fetch_one(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Salary create: existence check failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if exists {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Salary record already exists for this month"
        })));
    }

    let total = compute_total_salary(
        payload.base_salary,
        payload.allowances,
        payload.bonus,
        payload.deductions,
    );

    sqlx::query(
        r#"
        INSERT INTO salary_records
            (user_id, month, year, base_salary, allowances, deductions, bonus,
             working_days, present_days, leaves_taken, total_salary, status)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 'draft')
        "#,
    )
    .bind(payload.user_id)
    .bind(payload.month)
    .bind(payload.year)
    .bind(payload.base_salary)
    .bind(payload.allowances)
    .bind(payload.deductions)
    .bind(payload.bonus)
    .bind(payload.working_days)
    .bind(payload.present_days)
    .bind(payload.leaves_taken)
    .bind(total)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, user_id = payload.user_id, "Failed to create salary record");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Salary record created",
        "total_salary": total
    })))
}

/// Amend salary components; the total is recomputed server-side
#[utoipa::path(
    put,
    path = "/api/v1/salary/{salary_id}",
    request_body = UpdateSalary,
    params(("salary_id", description = "Salary record ID")),
    responses(
        (status = 200, description = "Salary updated"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Salary record not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Salary"
)]
pub async fn update_salary(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<UpdateSalary>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let salary_id = path.into_inner();

    let current = sqlx::query_as::<_, (f64, f64, f64, f64, u32, u32, u32)>(
        r#"
        SELECT base_salary, allowances, deductions, bonus,
               working_days, present_days, leaves_taken
        FROM salary_records
        WHERE id = ?
        "#,
    )
    .bind(salary_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, salary_id, "Failed to fetch salary record");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let (base, allowances, deductions, bonus, working_days, present_days, leaves_taken) =
        match current {
            Some(c) => c,
            None => {
                return Ok(HttpResponse::NotFound().json(serde_json::json!({
                    "message": "Salary record not found"
                })));
            }
        };

    let base_salary = body.base_salary.unwrap_or(base);
    let allowances = body.allowances.unwrap_or(allowances);
    let deductions = body.deductions.unwrap_or(deductions);
    let bonus = body.bonus.unwrap_or(bonus);
    let working_days = body.working_days.unwrap_or(working_days);
    let present_days = body.present_days.unwrap_or(present_days);
    let leaves_taken = body.leaves_taken.unwrap_or(leaves_taken);
    let total = compute_total_salary(base_salary, allowances, bonus, deductions);

    sqlx::query(
        r#"
        UPDATE salary_records
        SET base_salary = ?, allowances = ?, deductions = ?, bonus = ?,
            working_days = ?, present_days = ?, leaves_taken = ?, total_salary = ?
        WHERE id = ?
        "#,
    )
    .bind(base_salary)
    .bind(allowances)
    .bind(deductions)
    .bind(bonus)
    .bind(working_days)
    .bind(present_days)
    .bind(leaves_taken)
    .bind(total)
    .bind(salary_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, salary_id, "Failed to update salary record");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Salary updated",
        "total_salary": total
    })))
}

/// Move a salary record through its status lifecycle
#[utoipa::path(
    put,
    path = "/api/v1/salary/{salary_id}/status",
    request_body = TransitionSalary,
    params(("salary_id", description = "Salary record ID")),
    responses(
        (status = 200, description = "Status changed"),
        (status = 400, description = "Transition not allowed"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Salary record not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Salary"
)]
pub async fn transition_salary(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<TransitionSalary>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let salary_id = path.into_inner();

    let current = sqlx::query_scalar::<_, String>(
        "SELECT status FROM salary_records WHERE id = ?",
    )
    .bind(salary_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, salary_id, "Failed to fetch salary status");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let current = match current {
        Some(s) => s,
        None => {
            return Ok(HttpResponse::NotFound().json(serde_json::json!({
                "message": "Salary record not found"
            })));
        }
    };

    let current: SalaryStatus = current.parse().map_err(|_| {
        tracing::error!(salary_id, status = %current, "Unknown salary status in database");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if !current.can_transition_to(body.status, body.hr_override) {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": format!("Cannot move salary from {current} to {}", body.status)
        })));
    }

    let payment_date = if body.status == SalaryStatus::Paid {
        Some(Utc::now().date_naive())
    } else {
        None
    };

    sqlx::query(
        r#"
        UPDATE salary_records
        SET status = ?, approved_by = ?, payment_date = ?
        WHERE id = ?
        "#,
    )
    .bind(body.status.to_string())
    .bind(auth.user_id)
    .bind(payment_date)
    .bind(salary_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, salary_id, "Failed to change salary status");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Status changed",
        "status": body.status
    })))
}

/// Fetch a single salary record
#[utoipa::path(
    get,
    path = "/api/v1/salary/{salary_id}",
    params(("salary_id", description = "Salary record ID")),
    responses(
        (status = 200, body = SalaryRecord),
        (status = 404)
    ),
    security(("bearer_auth" = [])),
    tag = "Salary"
)]
pub async fn get_salary(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let salary_id = path.into_inner();

    let sql = format!("SELECT {SALARY_COLUMNS} FROM salary_records WHERE id = ?");
    let record = sqlx::query_as::<_, SalaryRecord>(&sql)
        .bind(salary_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, salary_id, "Failed to fetch salary record");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    match record {
        Some(r) => {
            if auth.is_employee() && r.user_id != auth.user_id {
                return Err(actix_web::error::ErrorForbidden("Not your salary record"));
            }
            Ok(HttpResponse::Ok().json(r))
        }
        None => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Salary record not found"
        }))),
    }
}

/// Paginated salary list
#[utoipa::path(
    get,
    path = "/api/v1/salary",
    params(SalaryQuery),
    responses(
        (status = 200, body = SalaryListResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Salary"
)]
pub async fn list_salaries(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<SalaryQuery>,
) -> actix_web::Result<impl Responder> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(10).clamp(1, 100);
    let offset = (page - 1) * per_page;

    let mut where_sql = String::from(" WHERE 1=1");
    let mut user_args: Vec<u64> = Vec::new();
    let mut year_arg: Option<i32> = None;

    let user_filter = if auth.is_employee() {
        Some(auth.user_id)
    } else {
        query.user_id
    };

    if let Some(user_id) = user_filter {
        where_sql.push_str(" AND user_id = ?");
        user_args.push(user_id);
    }

    if let Some(year) = query.year {
        where_sql.push_str(" AND year = ?");
        year_arg = Some(year);
    }

    let count_sql = format!("SELECT COUNT(*) FROM salary_records{}", where_sql);
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &user_args {
        count_q = count_q.bind(*arg);
    }
    if let Some(year) = year_arg {
        count_q = count_q.bind(year);
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to count salary records");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let data_sql = format!(
        r#"
        SELECT {SALARY_COLUMNS}
        FROM salary_records
        {}
        ORDER BY year DESC, month DESC
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, SalaryRecord>(&data_sql);
    for arg in user_args {
        data_q = data_q.bind(arg);
    }
    if let Some(year) = year_arg {
        data_q = data_q.bind(year);
    }

    let data = data_q
        .bind(per_page as i64)
        .bind(offset as i64)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch salary list");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(SalaryListResponse {
        data,
        page,
        per_page,
        total,
    }))
}

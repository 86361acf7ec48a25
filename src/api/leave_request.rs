use crate::auth::auth::AuthUser;
use crate::model::leave_request::{LeaveRequest, LeaveStatus};
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LeaveType {
    Annual,
    Sick,
    Unpaid,
}

impl LeaveType {
    fn as_str(&self) -> &str {
        match self {
            LeaveType::Annual => "annual",
            LeaveType::Sick => "sick",
            LeaveType::Unpaid => "unpaid",
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct CreateLeave {
    #[schema(example = "2024-03-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2024-03-03", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "sick")]
    pub leave_type: LeaveType, // enum ensures Swagger dropdown
    pub reason: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateLeave {
    #[schema(example = "2024-03-02", format = "date", value_type = String)]
    pub start_date: Option<NaiveDate>,
    #[schema(example = "2024-03-04", format = "date", value_type = String)]
    pub end_date: Option<NaiveDate>,
    pub leave_type: Option<LeaveType>,
    pub reason: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct ReviewLeave {
    pub reviewer_notes: Option<String>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct LeaveFilter {
    /// Filter by user ID (HR/Admin; employees always see their own)
    pub user_id: Option<u64>,
    #[schema(example = "pending")]
    /// Filter by leave status
    pub status: Option<String>,
    /// Pagination page number (start with 1)
    pub page: Option<u64>,
    /// Pagination per page number
    pub per_page: Option<u64>,
}

// Helper enum for typed SQLx binding
enum FilterValue<'a> {
    U64(u64),
    Str(&'a str),
}

#[derive(Serialize, ToSchema)]
pub struct LeaveListResponse {
    pub data: Vec<LeaveRequest>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

const LEAVE_COLUMNS: &str = "id, user_id, leave_type, start_date, end_date, reason, status, \
                             reviewed_by, reviewer_notes, reviewed_at, created_at";

async fn fetch_leave(pool: &MySqlPool, leave_id: u64) -> Result<Option<LeaveRequest>, sqlx::Error> {
    let sql = format!("SELECT {LEAVE_COLUMNS} FROM leave_requests WHERE id = ?");
    sqlx::query_as::<_, LeaveRequest>(&sql)
        .bind(leave_id)
        .fetch_optional(pool)
        .await
}

/* =========================
Create leave request
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/leave",
    request_body(
        content = CreateLeave,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Leave request submitted successfully", body = Object,
         example = json!({
            "message": "Leave request submitted",
            "status": "pending"
         })
        ),
        (status = 400, description = "Bad request"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn create_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateLeave>,
) -> actix_web::Result<impl Responder> {
    if payload.start_date > payload.end_date {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "start_date cannot be after end_date"
        })));
    }

    sqlx::query(
        r#"
        INSERT INTO leave_requests
            (user_id, leave_type, start_date, end_date, reason, status)
        VALUES (?, ?, ?, ?, ?, 'pending')
        "#,
    )
    .bind(auth.user_id)
    .bind(payload.leave_type.as_str())
    .bind(payload.start_date)
    .bind(payload.end_date)
    .bind(&payload.reason)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, user_id = auth.user_id, "Failed to create leave request");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Leave request submitted",
        "status": "pending"
    })))
}

/* =========================
Update own pending leave
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}",
    request_body = UpdateLeave,
    params(("leave_id" = u64, Path, description = "Leave request to amend")),
    responses(
        (status = 200, description = "Leave updated"),
        (status = 400, description = "Request is no longer pending"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Leave request not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn update_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<UpdateLeave>,
) -> actix_web::Result<impl Responder> {
    let leave_id = path.into_inner();

    let current = fetch_leave(pool.get_ref(), leave_id).await.map_err(|e| {
        tracing::error!(error = %e, leave_id, "Failed to fetch leave request");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let current = match current {
        Some(c) => c,
        None => {
            return Ok(HttpResponse::NotFound().json(serde_json::json!({
                "message": "Leave request not found"
            })));
        }
    };

    if current.user_id != auth.user_id {
        return Err(actix_web::error::ErrorForbidden("Not your leave request"));
    }

    let status: LeaveStatus = current.status.parse().map_err(|_| {
        tracing::error!(leave_id, status = %current.status, "Unknown leave status in database");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if !status.is_mutable() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Only pending requests can be updated"
        })));
    }

    let start_date = body.start_date.unwrap_or(current.start_date);
    let end_date = body.end_date.unwrap_or(current.end_date);

    if start_date > end_date {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "start_date cannot be after end_date"
        })));
    }

    let leave_type = body
        .leave_type
        .as_ref()
        .map(|t| t.as_str().to_string())
        .unwrap_or(current.leave_type);
    let reason = body.reason.clone().or(current.reason);

    sqlx::query(
        r#"
        UPDATE leave_requests
        SET start_date = ?, end_date = ?, leave_type = ?, reason = ?
        WHERE id = ? AND status = 'pending'
        "#,
    )
    .bind(start_date)
    .bind(end_date)
    .bind(leave_type)
    .bind(reason)
    .bind(leave_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, leave_id, "Failed to update leave request");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Leave updated"
    })))
}

/* =========================
Cancel own pending leave
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/cancel",
    params(("leave_id" = u64, Path, description = "Leave request to cancel")),
    responses(
        (status = 200, description = "Leave cancelled"),
        (status = 400, description = "Request is no longer pending"),
        (status = 403, description = "Not the owner")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn cancel_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let leave_id = path.into_inner();

    let result = sqlx::query(
        r#"
        UPDATE leave_requests
        SET status = 'cancelled'
        WHERE id = ? AND user_id = ? AND status = 'pending'
        "#,
    )
    .bind(leave_id)
    .bind(auth.user_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, leave_id, "Cancel leave failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Leave request not found, not yours, or already processed"
        })));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Leave cancelled"
    })))
}

async fn review_leave(
    auth: &AuthUser,
    pool: &MySqlPool,
    leave_id: u64,
    next_status: LeaveStatus,
    notes: Option<&str>,
) -> actix_web::Result<HttpResponse> {
    let result = sqlx::query(
        r#"
        UPDATE leave_requests
        SET status = ?, reviewed_by = ?, reviewer_notes = ?, reviewed_at = NOW()
        WHERE id = ?
        AND status = 'pending'
        "#,
    )
    .bind(next_status.to_string())
    .bind(auth.user_id)
    .bind(notes)
    .bind(leave_id)
    .execute(pool)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, leave_id, "Leave review failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Leave request not found or already processed"
        })));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": format!("Leave {next_status}")
    })))
}

/* =========================
Approve leave (HR/Admin)
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/approve",
    request_body = ReviewLeave,
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to approve")
    ),
    responses(
        (status = 200, description = "Leave approved successfully"),
        (status = 400, description = "Leave request not found or already processed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn approve_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<ReviewLeave>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    review_leave(
        &auth,
        pool.get_ref(),
        path.into_inner(),
        LeaveStatus::Approved,
        body.reviewer_notes.as_deref(),
    )
    .await
}

/* =========================
Reject leave (HR/Admin)
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/reject",
    request_body = ReviewLeave,
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to reject")
    ),
    responses(
        (status = 200, description = "Leave rejected successfully"),
        (status = 400, description = "Leave request not found or already processed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn reject_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<ReviewLeave>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    review_leave(
        &auth,
        pool.get_ref(),
        path.into_inner(),
        LeaveStatus::Rejected,
        body.reviewer_notes.as_deref(),
    )
    .await
}

/// for getting a leave application details endpoint
#[utoipa::path(
    get,
    path = "/api/v1/leave/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to fetch")
    ),
    responses(
        (status = 200, description = "Leave request found", body = LeaveRequest),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let leave_id = path.into_inner();

    let leave = fetch_leave(pool.get_ref(), leave_id).await.map_err(|e| {
        tracing::error!(error = %e, leave_id, "Failed to fetch leave request");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    match leave {
        Some(data) => {
            if auth.is_employee() && data.user_id != auth.user_id {
                return Err(actix_web::error::ErrorForbidden("Not your leave request"));
            }
            Ok(HttpResponse::Ok().json(data))
        }
        None => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Leave request not found"
        }))),
    }
}

/// for getting leave applications endpoint
#[utoipa::path(
    get,
    path = "/api/v1/leave",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Paginated leave list", body = LeaveListResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn leave_list(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<LeaveFilter>,
) -> actix_web::Result<impl Responder> {
    // -------------------------
    // Pagination
    // -------------------------
    let per_page = query.per_page.unwrap_or(10).min(100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    // -------------------------
    // WHERE clause
    // -------------------------
    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    let user_filter = if auth.is_employee() {
        Some(auth.user_id)
    } else {
        query.user_id
    };

    if let Some(user_id) = user_filter {
        where_sql.push_str(" AND user_id = ?");
        args.push(FilterValue::U64(user_id));
    }

    if let Some(status) = query.status.as_deref() {
        where_sql.push_str(" AND status = ?");
        args.push(FilterValue::Str(status));
    }

    // -------------------------
    // COUNT query
    // -------------------------
    let count_sql = format!("SELECT COUNT(*) FROM leave_requests{}", where_sql);

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::U64(v) => count_q.bind(*v),
            FilterValue::Str(s) => count_q.bind(*s),
        };
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to count leave requests");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    // -------------------------
    // DATA query
    // -------------------------
    let data_sql = format!(
        r#"
        SELECT {LEAVE_COLUMNS}
        FROM leave_requests
        {}
        ORDER BY created_at DESC
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, LeaveRequest>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(v),
            FilterValue::Str(s) => data_q.bind(s),
        };
    }

    let leaves = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch leave list");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(LeaveListResponse {
        data: leaves,
        page: page as u32,
        per_page: per_page as u32,
        total,
    }))
}

use crate::auth::auth::AuthUser;
use crate::model::break_request::BreakRequest;
use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

const BREAK_COLUMNS: &str = "id, user_id, attendance_record_id, date, requested_start, \
                             requested_end, approved_start, approved_end, status, \
                             reviewed_by, reviewer_notes";

#[derive(Deserialize, ToSchema)]
pub struct CreateBreak {
    pub attendance_record_id: u64,

    #[schema(value_type = String, format = "date-time")]
    pub requested_start: DateTime<Utc>,

    #[schema(value_type = String, format = "date-time")]
    pub requested_end: DateTime<Utc>,
}

#[derive(Deserialize, ToSchema)]
pub struct ApproveBreak {
    /// Approved window; defaults to the requested times when omitted
    #[schema(value_type = Option<String>, format = "date-time")]
    pub approved_start: Option<DateTime<Utc>>,

    #[schema(value_type = Option<String>, format = "date-time")]
    pub approved_end: Option<DateTime<Utc>>,

    pub reviewer_notes: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct RejectBreak {
    pub reviewer_notes: Option<String>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct BreakFilter {
    /// HR/Admin only; employees always see their own
    pub user_id: Option<u64>,
    pub attendance_record_id: Option<u64>,
    #[schema(example = "pending")]
    pub status: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct BreakListResponse {
    pub data: Vec<BreakRequest>,
}

/// Request a break inside an attendance record. Only one pending request
/// per (user, attendance record) is accepted; the check is best-effort,
/// not a database constraint.
#[utoipa::path(
    post,
    path = "/api/v1/breaks",
    request_body = CreateBreak,
    responses(
        (status = 200, description = "Break requested", body = Object, example = json!({
            "message": "Break requested",
            "status": "pending"
        })),
        (status = 400, description = "Invalid window or a pending request already exists"),
        (status = 404, description = "Attendance record not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Breaks"
)]
pub async fn create_break(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateBreak>,
) -> actix_web::Result<impl Responder> {
    if payload.requested_end <= payload.requested_start {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "requested_end must be after requested_start"
        })));
    }

    // The break must hang off one of the caller's own attendance records.
    let record = sqlx::query_as::<_, (u64, chrono::NaiveDate)>(
        r#"
        SELECT user_id, date
        FROM attendance_records
        WHERE id = ?
        "#,
    )
    .bind(payload.attendance_record_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, record_id = payload.attendance_record_id, "Break: record lookup failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let (owner, date) = match record {
        Some(r) => r,
        None => {
            return Ok(HttpResponse::NotFound().json(serde_json::json!({
                "message": "Attendance record not found"
            })));
        }
    };

    if owner != auth.user_id {
        return Err(actix_web::error::ErrorForbidden(
            "Not your attendance record",
        ));
    }

    let pending_exists = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM break_requests
            WHERE user_id = ? AND attendance_record_id = ? AND status = 'pending'
            LIMIT 1
        )
        "#,
    )
    .bind(auth.user_id)
    .bind(payload.attendance_record_id)
    .fetch_one(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Break: pending lookup failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if pending_exists {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "A pending break request already exists for this attendance record"
        })));
    }

    sqlx::query(
        r#"
        INSERT INTO break_requests
            (user_id, attendance_record_id, date, requested_start, requested_end, status)
        VALUES (?, ?, ?, ?, ?, 'pending')
        "#,
    )
    .bind(auth.user_id)
    .bind(payload.attendance_record_id)
    .bind(date)
    .bind(payload.requested_start)
    .bind(payload.requested_end)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, user_id = auth.user_id, "Failed to create break request");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Break requested",
        "status": "pending"
    })))
}

/// Approve a break (HR/Admin), setting the approved window
#[utoipa::path(
    put,
    path = "/api/v1/breaks/{break_id}/approve",
    request_body = ApproveBreak,
    params(("break_id" = u64, Path, description = "Break request to approve")),
    responses(
        (status = 200, description = "Break approved"),
        (status = 400, description = "Not found or already processed"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Breaks"
)]
pub async fn approve_break(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<ApproveBreak>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let break_id = path.into_inner();

    let current = sqlx::query_as::<_, (DateTime<Utc>, DateTime<Utc>)>(
        r#"
        SELECT requested_start, requested_end
        FROM break_requests
        WHERE id = ? AND status = 'pending'
        "#,
    )
    .bind(break_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, break_id, "Approve break: lookup failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let (requested_start, requested_end) = match current {
        Some(r) => r,
        None => {
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "message": "Break request not found or already processed"
            })));
        }
    };

    let approved_start = body.approved_start.unwrap_or(requested_start);
    let approved_end = body.approved_end.unwrap_or(requested_end);

    if approved_end <= approved_start {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "approved_end must be after approved_start"
        })));
    }

    sqlx::query(
        r#"
        UPDATE break_requests
        SET status = 'approved', approved_start = ?, approved_end = ?,
            reviewed_by = ?, reviewer_notes = ?
        WHERE id = ? AND status = 'pending'
        "#,
    )
    .bind(approved_start)
    .bind(approved_end)
    .bind(auth.user_id)
    .bind(&body.reviewer_notes)
    .bind(break_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, break_id, "Approve break failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Break approved"
    })))
}

/// Reject a break (HR/Admin)
#[utoipa::path(
    put,
    path = "/api/v1/breaks/{break_id}/reject",
    request_body = RejectBreak,
    params(("break_id" = u64, Path, description = "Break request to reject")),
    responses(
        (status = 200, description = "Break rejected"),
        (status = 400, description = "Not found or already processed"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Breaks"
)]
pub async fn reject_break(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<RejectBreak>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let break_id = path.into_inner();

    let result = sqlx::query(
        r#"
        UPDATE break_requests
        SET status = 'rejected', reviewed_by = ?, reviewer_notes = ?
        WHERE id = ? AND status = 'pending'
        "#,
    )
    .bind(auth.user_id)
    .bind(&body.reviewer_notes)
    .bind(break_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, break_id, "Reject break failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Break request not found or already processed"
        })));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Break rejected"
    })))
}

/// Cancel one's own pending break
#[utoipa::path(
    put,
    path = "/api/v1/breaks/{break_id}/cancel",
    params(("break_id" = u64, Path, description = "Break request to cancel")),
    responses(
        (status = 200, description = "Break cancelled"),
        (status = 400, description = "Not found, not yours, or already processed")
    ),
    security(("bearer_auth" = [])),
    tag = "Breaks"
)]
pub async fn cancel_break(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let break_id = path.into_inner();

    let result = sqlx::query(
        r#"
        UPDATE break_requests
        SET status = 'cancelled'
        WHERE id = ? AND user_id = ? AND status = 'pending'
        "#,
    )
    .bind(break_id)
    .bind(auth.user_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, break_id, "Cancel break failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Break request not found, not yours, or already processed"
        })));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Break cancelled"
    })))
}

/// List break requests, with active/upcoming flags derived at read time
#[utoipa::path(
    get,
    path = "/api/v1/breaks",
    params(BreakFilter),
    responses(
        (status = 200, description = "Break request list", body = BreakListResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Breaks"
)]
pub async fn list_breaks(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<BreakFilter>,
) -> actix_web::Result<impl Responder> {
    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<u64> = Vec::new();
    let mut status_arg: Option<&str> = None;

    let user_filter = if auth.is_employee() {
        Some(auth.user_id)
    } else {
        query.user_id
    };

    if let Some(user_id) = user_filter {
        where_sql.push_str(" AND user_id = ?");
        args.push(user_id);
    }

    if let Some(record_id) = query.attendance_record_id {
        where_sql.push_str(" AND attendance_record_id = ?");
        args.push(record_id);
    }

    if let Some(status) = query.status.as_deref() {
        where_sql.push_str(" AND status = ?");
        status_arg = Some(status);
    }

    let data_sql = format!(
        "SELECT {BREAK_COLUMNS} FROM break_requests{} ORDER BY requested_start DESC",
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, BreakRequest>(&data_sql);
    for arg in args {
        data_q = data_q.bind(arg);
    }
    if let Some(status) = status_arg {
        data_q = data_q.bind(status);
    }

    let breaks = data_q.fetch_all(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to fetch break list");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let now = Utc::now();
    let body: Vec<serde_json::Value> = breaks
        .iter()
        .map(|b| {
            let mut v = serde_json::to_value(b).unwrap_or_default();
            if let Some(obj) = v.as_object_mut() {
                obj.insert("is_active".into(), b.is_active(now).into());
                obj.insert("is_upcoming".into(), b.is_upcoming(now).into());
            }
            v
        })
        .collect();

    Ok(HttpResponse::Ok().json(serde_json::json!({ "data": body })))
}

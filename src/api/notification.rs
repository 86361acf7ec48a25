use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::model::notification::Notification;

#[derive(Deserialize, ToSchema)]
pub struct CreateNotification {
    pub user_id: u64,
    #[schema(example = "Leave approved")]
    pub title: String,
    pub body: String,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct NotificationQuery {
    pub unread_only: Option<bool>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Serialize, ToSchema)]
pub struct NotificationListResponse {
    pub data: Vec<Notification>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

/// Send a notification to a user (HR/Admin)
#[utoipa::path(
    post,
    path = "/api/v1/notifications",
    request_body = CreateNotification,
    responses(
        (status = 201, description = "Notification created"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
pub async fn create_notification(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateNotification>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    sqlx::query(
        r#"
        INSERT INTO notifications (user_id, title, body, is_read)
        VALUES (?, ?, ?, FALSE)
        "#,
    )
    .bind(payload.user_id)
    .bind(&payload.title)
    .bind(&payload.body)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, user_id = payload.user_id, "Failed to create notification");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Notification created"
    })))
}

/// List the caller's notifications
#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    params(NotificationQuery),
    responses(
        (status = 200, body = NotificationListResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
pub async fn list_notifications(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<NotificationQuery>,
) -> actix_web::Result<impl Responder> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    let mut where_sql = String::from(" WHERE user_id = ?");
    if query.unread_only.unwrap_or(false) {
        where_sql.push_str(" AND is_read = FALSE");
    }

    let count_sql = format!("SELECT COUNT(*) FROM notifications{}", where_sql);
    let total = sqlx::query_scalar::<_, i64>(&count_sql)
        .bind(auth.user_id)
        .fetch_one(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to count notifications");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let data_sql = format!(
        r#"
        SELECT id, user_id, title, body, is_read, created_at
        FROM notifications
        {}
        ORDER BY created_at DESC
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );

    let data = sqlx::query_as::<_, Notification>(&data_sql)
        .bind(auth.user_id)
        .bind(per_page as i64)
        .bind(offset as i64)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch notifications");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(NotificationListResponse {
        data,
        page,
        per_page,
        total,
    }))
}

/// Mark one of the caller's notifications read
#[utoipa::path(
    put,
    path = "/api/v1/notifications/{notification_id}/read",
    params(("notification_id", description = "Notification ID")),
    responses(
        (status = 200, description = "Marked read"),
        (status = 404, description = "Notification not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
pub async fn mark_read(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let notification_id = path.into_inner();

    let result = sqlx::query(
        r#"
        UPDATE notifications
        SET is_read = TRUE
        WHERE id = ? AND user_id = ?
        "#,
    )
    .bind(notification_id)
    .bind(auth.user_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, notification_id, "Failed to mark notification read");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Notification not found"
        })));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Marked read"
    })))
}

/// Mark all of the caller's notifications read
#[utoipa::path(
    put,
    path = "/api/v1/notifications/read-all",
    responses(
        (status = 200, description = "All marked read")
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
pub async fn mark_all_read(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let result = sqlx::query(
        r#"
        UPDATE notifications
        SET is_read = TRUE
        WHERE user_id = ? AND is_read = FALSE
        "#,
    )
    .bind(auth.user_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to mark notifications read");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "All marked read",
        "updated": result.rows_affected()
    })))
}

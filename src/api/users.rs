use crate::{
    auth::auth::AuthUser,
    auth::password::hash_password,
    model::user::User,
    utils::db_utils::{build_update_sql, execute_update},
};
use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sqlx::MySqlPool;
use tracing::{debug, error};
use utoipa::ToSchema;

#[derive(Deserialize, Serialize, ToSchema)]
pub struct CreateUser {
    #[schema(example = "jdoe")]
    pub username: String,
    #[schema(example = "jane.doe@company.com", format = "email")]
    pub email: String,
    #[schema(example = "Jane Doe")]
    pub full_name: String,
    pub password: String,
    #[schema(example = 3)]
    pub role_id: u8,
    #[schema(example = 10)]
    pub organization_id: Option<u64>,
    #[schema(example = "monday,tuesday,wednesday,thursday,friday")]
    pub working_days: Option<String>,
    #[schema(example = 8.0)]
    pub daily_hours: Option<f64>,
    #[schema(example = 50000.0)]
    pub base_salary: Option<f64>,
    #[schema(example = true)]
    pub wifi_verification_required: Option<bool>,
    #[schema(example = "2024-01-01", format = "date", value_type = String)]
    pub hire_date: NaiveDate,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UserQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub organization_id: Option<u64>,
    pub role_id: Option<u8>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct UserListResponse {
    pub data: Vec<User>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

const USER_COLUMNS: &str = "id, username, email, full_name, role_id, organization_id, \
                            is_active, working_days, daily_hours, base_salary, \
                            wifi_verification_required, hire_date";

/// Create a user profile (HR/Admin)
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created successfully"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Username already exists"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Users",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_user(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateUser>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let hashed = hash_password(&payload.password);

    let result = sqlx::query(
        r#"
        INSERT INTO users
            (username, email, full_name, password, role_id, organization_id,
             working_days, daily_hours, base_salary, wifi_verification_required,
             hire_date)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(payload.username.trim().to_lowercase())
    .bind(&payload.email)
    .bind(&payload.full_name)
    .bind(hashed)
    .bind(payload.role_id)
    .bind(payload.organization_id)
    .bind(payload.working_days.as_deref().unwrap_or(""))
    .bind(payload.daily_hours.unwrap_or(8.0))
    .bind(payload.base_salary.unwrap_or(0.0))
    .bind(payload.wifi_verification_required.unwrap_or(false))
    .bind(payload.hire_date)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(_) => Ok(HttpResponse::Created().json(json!({
            "message": "User created successfully"
        }))),
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(HttpResponse::Conflict().json(json!({
                        "message": "Username already exists"
                    })));
                }
            }
            error!(error = %e, "Failed to create user");
            Ok(HttpResponse::InternalServerError().json(json!({
                "message": "Something went wrong, Contact with system admin"
            })))
        }
    }
}

// -------------------- Handler --------------------

#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(
        ("page", Query, description = "Page number"),
        ("per_page", Query, description = "Items per page"),
        ("organization_id", Query, description = "Filter by organization"),
        ("role_id", Query, description = "Filter by role"),
        ("is_active", Query, description = "Filter by active flag"),
        ("search", Query, description = "Search by name, username or email")
    ),
    responses(
        (status = 200, description = "Paginated user list", body = UserListResponse)
    ),
    tag = "Users",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_users(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<UserQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    // ---------- build WHERE clause dynamically ----------
    let mut conditions = Vec::new();
    let mut bindings: Vec<sqlx::types::JsonValue> = Vec::new();

    if let Some(organization_id) = query.organization_id {
        conditions.push("organization_id = ?");
        bindings.push(organization_id.into());
    }

    if let Some(role_id) = query.role_id {
        conditions.push("role_id = ?");
        bindings.push(role_id.into());
    }

    if let Some(is_active) = query.is_active {
        conditions.push("is_active = ?");
        bindings.push(is_active.into());
    }

    if let Some(search) = &query.search {
        conditions.push("(full_name LIKE ? OR username LIKE ? OR email LIKE ?)");
        let like = format!("%{}%", search);
        bindings.push(like.clone().into());
        bindings.push(like.clone().into());
        bindings.push(like.into());
    }

    let where_clause = if conditions.is_empty() {
        "".to_string()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    // ---------- total count ----------
    let count_sql = format!("SELECT COUNT(*) as total FROM users {}", where_clause);
    debug!(sql = %count_sql, bindings = ?bindings, "Counting users");

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    for b in &bindings {
        count_query = count_query.bind(b);
    }

    let total = count_query.fetch_one(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, sql = %count_sql, "Failed to count users");
        ErrorInternalServerError("Database error")
    })?;

    // ---------- data query ----------
    let data_sql = format!(
        "SELECT {USER_COLUMNS} FROM users {} ORDER BY id DESC LIMIT ? OFFSET ?",
        where_clause
    );
    debug!(sql = %data_sql, bindings = ?bindings, page, per_page, offset, "Fetching users");

    let mut data_query = sqlx::query_as::<_, User>(&data_sql);
    for b in &bindings {
        data_query = data_query.bind(b);
    }
    data_query = data_query.bind(per_page as i64).bind(offset as i64);

    let users = data_query.fetch_all(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, sql = %data_sql, "Failed to fetch users");
        ErrorInternalServerError("Database error")
    })?;

    Ok(HttpResponse::Ok().json(UserListResponse {
        data: users,
        page,
        per_page,
        total,
    }))
}

/// Update user (dynamic fields)
#[utoipa::path(
    put,
    path = "/api/v1/users/{user_id}",
    params(
        ("user_id", Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User updated successfully"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Users",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_user(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<i64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let user_id = path.into_inner();

    // Password and identity changes go through dedicated flows.
    if let Some(obj) = body.as_object() {
        if obj.contains_key("password") || obj.contains_key("id") {
            return Ok(HttpResponse::BadRequest().body("Field not updatable here"));
        }
    }

    let update = build_update_sql("users", &body, "id", user_id)?;

    let affected = execute_update(pool.get_ref(), update)
        .await
        .map_err(actix_web::error::ErrorInternalServerError)?;

    if affected == 0 {
        return Ok(HttpResponse::NotFound().body("User not found"));
    }

    Ok(HttpResponse::Ok().body("User updated successfully"))
}

/// Cascading delete via stored procedure (attendance, breaks, leave,
/// salary data, notifications, then the user row)
#[utoipa::path(
    delete,
    path = "/api/v1/users/{user_id}",
    params(
        ("user_id", Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Successfully deleted"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Users",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_user(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let user_id = path.into_inner();

    let result = sqlx::query("CALL cascade_delete_user(?)")
        .bind(user_id)
        .execute(pool.get_ref())
        .await;

    match result {
        Ok(_) => Ok(HttpResponse::Ok().json(json!({
            "message": "Successfully deleted"
        }))),
        Err(e) => {
            error!(error = %e, user_id, "Failed to delete user");
            Ok(HttpResponse::InternalServerError().json(json!({
                "message": "Internal Server Error"
            })))
        }
    }
}

/// Get user by ID
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}",
    params(
        ("user_id", Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User found", body = User),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Users",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_user(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let user_id: u64 = path.into_inner();

    if auth.is_employee() && user_id != auth.user_id {
        return Err(actix_web::error::ErrorForbidden("HR/Admin only"));
    }

    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(user_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id, "Failed to fetch user");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    match user {
        Some(u) => Ok(HttpResponse::Ok().json(u)),
        None => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "User not found"
        }))),
    }
}

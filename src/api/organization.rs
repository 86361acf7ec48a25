use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use sqlx::MySqlPool;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::model::organization::{OfficeWifiNetwork, Organization};
use crate::utils::network_cache;

#[derive(Deserialize, ToSchema)]
pub struct CreateOrganization {
    #[schema(example = "Acme Corp")]
    pub name: String,
}

#[derive(Deserialize, ToSchema)]
pub struct AddNetwork {
    #[schema(example = "HQ-Floor1")]
    pub ssid: String,
}

/// Create an organization (Admin)
#[utoipa::path(
    post,
    path = "/api/v1/organizations",
    request_body = CreateOrganization,
    responses(
        (status = 201, description = "Organization created"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Organizations"
)]
pub async fn create_organization(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateOrganization>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    if payload.name.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "name must not be empty"
        })));
    }

    sqlx::query("INSERT INTO organizations (name) VALUES (?)")
        .bind(payload.name.trim())
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to create organization");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Organization created"
    })))
}

/// List organizations
#[utoipa::path(
    get,
    path = "/api/v1/organizations",
    responses(
        (status = 200, body = Vec<Organization>)
    ),
    security(("bearer_auth" = [])),
    tag = "Organizations"
)]
pub async fn list_organizations(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let orgs = sqlx::query_as::<_, Organization>("SELECT id, name FROM organizations ORDER BY name")
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to list organizations");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(orgs))
}

/// Fetch a single organization
#[utoipa::path(
    get,
    path = "/api/v1/organizations/{org_id}",
    params(("org_id", description = "Organization ID")),
    responses(
        (status = 200, body = Organization),
        (status = 404, description = "Organization not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Organizations"
)]
pub async fn get_organization(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let org_id = path.into_inner();

    let org = sqlx::query_as::<_, Organization>("SELECT id, name FROM organizations WHERE id = ?")
        .bind(org_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, org_id, "Failed to fetch organization");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    match org {
        Some(o) => Ok(HttpResponse::Ok().json(o)),
        None => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Organization not found"
        }))),
    }
}

/// Register an office network for presence verification
#[utoipa::path(
    post,
    path = "/api/v1/organizations/{org_id}/networks",
    request_body = AddNetwork,
    params(("org_id", description = "Organization ID")),
    responses(
        (status = 201, description = "Network registered"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Organizations"
)]
pub async fn add_network(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<AddNetwork>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let org_id = path.into_inner();

    if payload.ssid.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "ssid must not be empty"
        })));
    }

    sqlx::query(
        r#"
        INSERT INTO office_wifi_networks (organization_id, ssid, is_active)
        VALUES (?, ?, TRUE)
        "#,
    )
    .bind(org_id)
    .bind(payload.ssid.trim())
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, org_id, "Failed to register office network");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    // Presence checks read through the cache; drop the stale entry now.
    network_cache::invalidate(org_id).await;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Network registered"
    })))
}

/// Deactivate an office network
#[utoipa::path(
    put,
    path = "/api/v1/organizations/{org_id}/networks/{network_id}/deactivate",
    params(
        ("org_id", description = "Organization ID"),
        ("network_id", description = "Network ID")
    ),
    responses(
        (status = 200, description = "Network deactivated"),
        (status = 404, description = "Network not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Organizations"
)]
pub async fn deactivate_network(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<(u64, u64)>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let (org_id, network_id) = path.into_inner();

    let result = sqlx::query(
        r#"
        UPDATE office_wifi_networks
        SET is_active = FALSE
        WHERE id = ? AND organization_id = ?
        "#,
    )
    .bind(network_id)
    .bind(org_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, network_id, "Failed to deactivate network");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Network not found"
        })));
    }

    network_cache::invalidate(org_id).await;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Network deactivated"
    })))
}

/// List an organization's registered networks
#[utoipa::path(
    get,
    path = "/api/v1/organizations/{org_id}/networks",
    params(("org_id", description = "Organization ID")),
    responses(
        (status = 200, body = Vec<OfficeWifiNetwork>)
    ),
    security(("bearer_auth" = [])),
    tag = "Organizations"
)]
pub async fn list_networks(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let org_id = path.into_inner();

    let networks = sqlx::query_as::<_, OfficeWifiNetwork>(
        r#"
        SELECT id, organization_id, ssid, is_active
        FROM office_wifi_networks
        WHERE organization_id = ?
        ORDER BY ssid
        "#,
    )
    .bind(org_id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, org_id, "Failed to list office networks");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(networks))
}

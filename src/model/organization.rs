use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Organization {
    pub id: u64,
    pub name: String,
}

/// Registered office SSID. Only active networks participate in presence
/// verification.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct OfficeWifiNetwork {
    pub id: u64,
    pub organization_id: u64,
    #[schema(example = "HQ-Floor1")]
    pub ssid: String,
    pub is_active: bool,
}

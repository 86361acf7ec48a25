use anyhow::Result;
use futures_util::StreamExt;
use moka::future::Cache;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// organization_id -> active office SSIDs.
///
/// Presence verification hits this on every check-in; office networks
/// change rarely, so a short TTL plus explicit invalidation after network
/// mutations keeps reads off the database.
pub static NETWORK_CACHE: Lazy<Cache<u64, Arc<Vec<String>>>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(10_000)
        .time_to_live(Duration::from_secs(300)) // 5 min TTL
        .build()
});

/// Active SSIDs for an organization, read-through.
pub async fn office_networks(
    pool: &MySqlPool,
    organization_id: u64,
) -> Result<Arc<Vec<String>>, sqlx::Error> {
    if let Some(ssids) = NETWORK_CACHE.get(&organization_id).await {
        return Ok(ssids);
    }

    let ssids: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT ssid
        FROM office_wifi_networks
        WHERE organization_id = ? AND is_active = TRUE
        "#,
    )
    .bind(organization_id)
    .fetch_all(pool)
    .await?;

    let ssids = Arc::new(ssids);
    NETWORK_CACHE
        .insert(organization_id, ssids.clone())
        .await;
    Ok(ssids)
}

/// Drop the cached entry after an office-network mutation.
pub async fn invalidate(organization_id: u64) {
    NETWORK_CACHE.invalidate(&organization_id).await;
}

/// Load all active office networks into the cache at startup (streamed).
pub async fn warmup_network_cache(pool: &MySqlPool) -> Result<()> {
    let mut stream = sqlx::query_as::<_, (u64, String)>(
        r#"
        SELECT organization_id, ssid
        FROM office_wifi_networks
        WHERE is_active = TRUE
        ORDER BY organization_id
        "#,
    )
    .fetch(pool);

    let mut grouped: HashMap<u64, Vec<String>> = HashMap::new();
    let mut total = 0usize;

    while let Some(row) = stream.next().await {
        let (organization_id, ssid) = row?;
        grouped.entry(organization_id).or_default().push(ssid);
        total += 1;
    }

    let orgs = grouped.len();
    for (organization_id, ssids) in grouped {
        NETWORK_CACHE
            .insert(organization_id, Arc::new(ssids))
            .await;
    }

    log::info!(
        "Office network cache warmup complete: {} networks across {} organizations",
        total,
        orgs
    );

    Ok(())
}

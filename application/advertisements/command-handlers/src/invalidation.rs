use std::sync::Arc;

use advertisement_cache_keys::AdvertisementCacheKey;
use property_cache_keys::PropertyCacheKey;
use redis_connection::{CacheBackend, CacheError, CacheTypeBind};
use tracing::instrument;
use uuid::Uuid;

/// Statically-declared fan-out for an advertisement mutation: its own
/// snapshot plus the parent property embedding its summary.
#[instrument(skip(cache))]
pub async fn invalidate_advertisement_graph(
    cache: &Arc<CacheBackend>, advertisement_id: Uuid, property_id: Uuid,
) -> Result<(), CacheError> {
    AdvertisementCacheKey
        .bind_with(cache.clone(), &advertisement_id)
        .remove()
        .await?;
    PropertyCacheKey
        .bind_with(cache.clone(), &property_id)
        .remove()
        .await?;

    Ok(())
}

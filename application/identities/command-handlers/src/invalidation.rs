use std::sync::Arc;

use identity_cache_keys::IdentityCacheKey;
use property_cache_keys::PropertyCacheKey;
use redis_connection::{CacheBackend, CacheError, CacheTypeBind};
use tracing::instrument;
use uuid::Uuid;

/// Statically-declared fan-out for an identity mutation: the identity's
/// own snapshot plus every property embedding it as owner or tenant.
#[instrument(skip(cache))]
pub async fn invalidate_identity_graph(
    cache: &Arc<CacheBackend>, identity_id: Uuid, property_ids: &[Uuid],
) -> Result<(), CacheError> {
    IdentityCacheKey
        .bind_with(cache.clone(), &identity_id)
        .remove()
        .await?;

    for property_id in property_ids {
        PropertyCacheKey
            .bind_with(cache.clone(), property_id)
            .remove()
            .await?;
    }

    Ok(())
}

use std::sync::Arc;

use category_cache_keys::CategoryCacheKey;
use property_cache_keys::PropertyCacheKey;
use redis_connection::{CacheBackend, CacheError, CacheTypeBind};
use tracing::instrument;
use uuid::Uuid;

/// Statically-declared fan-out for a category mutation: the category's
/// own snapshot plus every child property embedding its summary.
#[instrument(skip(cache))]
pub async fn invalidate_category_graph(
    cache: &Arc<CacheBackend>, category_id: Uuid, property_ids: &[Uuid],
) -> Result<(), CacheError> {
    CategoryCacheKey
        .bind_with(cache.clone(), &category_id)
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

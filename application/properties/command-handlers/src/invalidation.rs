use std::sync::Arc;

use advertisement_cache_keys::AdvertisementCacheKey;
use category_cache_keys::CategoryCacheKey;
use identity_cache_keys::IdentityCacheKey;
use property_cache_keys::PropertyCacheKey;
use property_dao::PropertyDetail;
use property_models::Property;
use redis_connection::{CacheBackend, CacheError, CacheTypeBind};
use tracing::instrument;
use uuid::Uuid;

/// Statically-declared set of cache entries embedding a property: the
/// property's own snapshot, its category, its advertisement, and the
/// owner/tenant identities. Mutations delete every one of them; the list
/// must be extended whenever a new response type embeds property data.
#[derive(Debug, Clone, Default)]
pub struct PropertyCacheGraph {
    pub property_id: Option<Uuid>,
    pub category_ids: Vec<Uuid>,
    pub advertisement_ids: Vec<Uuid>,
    pub identity_ids: Vec<Uuid>,
}

impl PropertyCacheGraph {
    pub fn of(detail: &PropertyDetail) -> Self {
        let mut graph = Self {
            property_id: Some(detail.property.id),
            ..Self::default()
        };

        if let Some(category) = &detail.category {
            graph.category_ids.push(category.id);
        }
        if let Some(advertisement) = &detail.advertisement {
            graph.advertisement_ids.push(advertisement.id);
        }
        graph.identity_ids.push(detail.owner.id);
        if let Some(tenant) = &detail.tenant {
            graph.identity_ids.push(tenant.id);
        }

        graph
    }

    /// Extends the graph with the edges of a post-update row, so entries
    /// for both the old and the new category/tenant are cleared.
    pub fn merge_property(mut self, property: &Property) -> Self {
        if let Some(category_id) = property.category_id {
            if !self.category_ids.contains(&category_id) {
                self.category_ids.push(category_id);
            }
        }
        if !self.identity_ids.contains(&property.owner_id) {
            self.identity_ids.push(property.owner_id);
        }
        if let Some(tenant_id) = property.tenant_id {
            if !self.identity_ids.contains(&tenant_id) {
                self.identity_ids.push(tenant_id);
            }
        }
        self
    }

    /// Graph for a freshly created property: the new row has no cache
    /// entry of its own, but every parent embedding a property list does.
    pub fn of_created(property: &Property) -> Self {
        Self::default().merge_property(property)
    }
}

#[instrument(skip(cache))]
pub async fn invalidate_property_graph(
    cache: &Arc<CacheBackend>, graph: &PropertyCacheGraph,
) -> Result<(), CacheError> {
    if let Some(property_id) = graph.property_id {
        PropertyCacheKey
            .bind_with(cache.clone(), &property_id)
            .remove()
            .await?;
    }
    for category_id in &graph.category_ids {
        CategoryCacheKey
            .bind_with(cache.clone(), category_id)
            .remove()
            .await?;
    }
    for advertisement_id in &graph.advertisement_ids {
        AdvertisementCacheKey
            .bind_with(cache.clone(), advertisement_id)
            .remove()
            .await?;
    }
    for identity_id in &graph.identity_ids {
        IdentityCacheKey
            .bind_with(cache.clone(), identity_id)
            .remove()
            .await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use redis_connection::CacheKey;

    use super::*;

    async fn seed(cache: &Arc<CacheBackend>, key: String) {
        use bytes::Bytes;
        match &**cache {
            CacheBackend::Memory(inner) => {
                inner.insert(key, Bytes::from_static(b"{}")).await;
            }
            CacheBackend::Redis(_) => unreachable!("memory-only test"),
        }
    }

    #[tokio::test]
    async fn graph_invalidation_clears_every_embedding_entry() {
        let cache = Arc::new(CacheBackend::memory());
        let property_id = Uuid::now_v7();
        let category_id = Uuid::now_v7();
        let owner_id = Uuid::now_v7();

        seed(
            &cache,
            PropertyCacheKey.get_key_with_args((&property_id,)).to_string(),
        )
        .await;
        seed(
            &cache,
            CategoryCacheKey.get_key_with_args((&category_id,)).to_string(),
        )
        .await;
        seed(
            &cache,
            IdentityCacheKey.get_key_with_args((&owner_id,)).to_string(),
        )
        .await;

        let graph = PropertyCacheGraph {
            property_id: Some(property_id),
            category_ids: vec![category_id],
            advertisement_ids: vec![],
            identity_ids: vec![owner_id],
        };

        invalidate_property_graph(&cache, &graph).await.unwrap();

        assert!(
            !PropertyCacheKey
                .bind_with(cache.clone(), &property_id)
                .exists()
                .await
                .unwrap()
        );
        assert!(
            !CategoryCacheKey
                .bind_with(cache.clone(), &category_id)
                .exists()
                .await
                .unwrap()
        );
        assert!(
            !IdentityCacheKey
                .bind_with(cache.clone(), &owner_id)
                .exists()
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn invalidation_tolerates_absent_keys() {
        let cache = Arc::new(CacheBackend::memory());
        let graph = PropertyCacheGraph {
            property_id: Some(Uuid::now_v7()),
            category_ids: vec![Uuid::now_v7()],
            advertisement_ids: vec![Uuid::now_v7()],
            identity_ids: vec![Uuid::now_v7()],
        };

        // Nothing seeded; both passes must succeed
        invalidate_property_graph(&cache, &graph).await.unwrap();
        invalidate_property_graph(&cache, &graph).await.unwrap();
    }
}

use std::{borrow::Cow, marker::PhantomData, sync::Arc};

use bytes::Bytes;
use redis::AsyncCommands;
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    backend::{CacheBackend, CacheError},
    value::Json,
};

/// One addressable cache slot: a key plus the type stored under it.
pub struct CacheEntry<T> {
    backend: Arc<CacheBackend>,
    key: Cow<'static, str>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> CacheEntry<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    pub fn new(backend: Arc<CacheBackend>, key: Cow<'static, str>) -> Self {
        Self {
            backend,
            key,
            _marker: PhantomData,
        }
    }

    pub fn key(&self) -> &str { &self.key }

    pub async fn exists(&self) -> Result<bool, CacheError> {
        match &*self.backend {
            CacheBackend::Redis(pool) => {
                let mut conn = pool.get().await?;
                Ok(conn.exists(&*self.key).await?)
            }
            CacheBackend::Memory(cache) => {
                Ok(cache.contains_key(self.key.as_ref()))
            }
        }
    }

    pub async fn try_get(&self) -> Result<Option<T>, CacheError> {
        match &*self.backend {
            CacheBackend::Redis(pool) => {
                let mut conn = pool.get().await?;
                let value: Option<Json<T>> = conn.get(&*self.key).await?;
                Ok(value.map(Json::inner))
            }
            CacheBackend::Memory(cache) => {
                match cache.get(self.key.as_ref()).await {
                    Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
                    None => Ok(None),
                }
            }
        }
    }

    /// Stores the value with no expiry. Entries leave the cache through
    /// [`CacheEntry::remove`] only.
    pub async fn set(&self, value: &T) -> Result<(), CacheError> {
        match &*self.backend {
            CacheBackend::Redis(pool) => {
                let mut conn = pool.get().await?;
                let _: () = conn.set(&*self.key, Json(value)).await?;
                Ok(())
            }
            CacheBackend::Memory(cache) => {
                let bytes = Bytes::from(serde_json::to_vec(value)?);
                cache.insert(self.key.to_string(), bytes).await;
                Ok(())
            }
        }
    }

    /// Deletes the entry. Removing an absent key is a no-op, not an error.
    pub async fn remove(&self) -> Result<bool, CacheError> {
        match &*self.backend {
            CacheBackend::Redis(pool) => {
                let mut conn = pool.get().await?;
                let count: u32 = conn.del(&*self.key).await?;
                Ok(count > 0)
            }
            CacheBackend::Memory(cache) => {
                let removed = cache.remove(self.key.as_ref()).await;
                Ok(removed.is_some())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde::{Deserialize, Serialize};

    use super::*;
    use crate::cache_key;

    #[derive(
        Debug, Clone, PartialEq, Eq, Serialize, Deserialize,
    )]
    pub struct Snapshot {
        id: uuid::Uuid,
        label: String,
    }

    cache_key!(SnapshotCacheKey::<Snapshot> => "snapshotFullResponse::{}"[id: uuid::Uuid]);

    use crate::key::CacheTypeBind;

    #[tokio::test]
    async fn memory_round_trip() {
        let backend = Arc::new(CacheBackend::memory());
        let id = uuid::Uuid::now_v7();
        let entry = SnapshotCacheKey.bind_with(backend, &id);

        assert!(entry.try_get().await.unwrap().is_none());

        let value = Snapshot {
            id,
            label: "hotel".to_string(),
        };
        entry.set(&value).await.unwrap();

        assert_eq!(entry.try_get().await.unwrap(), Some(value));
        assert!(entry.exists().await.unwrap());
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let backend = Arc::new(CacheBackend::memory());
        let id = uuid::Uuid::now_v7();
        let entry = SnapshotCacheKey.bind_with(backend, &id);

        let value = Snapshot {
            id,
            label: "hotel".to_string(),
        };
        entry.set(&value).await.unwrap();

        assert!(entry.remove().await.unwrap());
        // Second removal of an absent key must not error
        assert!(!entry.remove().await.unwrap());
        assert!(entry.try_get().await.unwrap().is_none());
    }

    #[test]
    fn key_format_embeds_id() {
        let backend = Arc::new(CacheBackend::memory());
        let id = uuid::Uuid::now_v7();
        let entry = SnapshotCacheKey.bind_with(backend, &id);
        assert_eq!(entry.key(), format!("snapshotFullResponse::{id}"));
    }
}

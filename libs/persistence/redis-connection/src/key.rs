use std::{borrow::Cow, sync::Arc};

use serde::{Serialize, de::DeserializeOwned};

use crate::{backend::CacheBackend, entry::CacheEntry};

pub trait CacheKey {
    type Args<'r>;

    fn get_key_with_args(&self, args: Self::Args<'_>) -> Cow<'static, str>;
}

pub trait CacheKeyArg1 {
    type Arg0;

    fn construct(arg0: Self::Arg0) -> Self;
}

impl<T> CacheKeyArg1 for (T,) {
    type Arg0 = T;

    fn construct(arg0: Self::Arg0) -> Self { (arg0,) }
}

pub trait CacheKeyAutoConstruct {
    fn construct() -> Self;
}

impl CacheKeyAutoConstruct for () {
    fn construct() -> Self {}
}

/// Binds a declared cache key to the value type stored under it, producing
/// [`CacheEntry`] handles against an injected backend.
pub trait CacheTypeBind: CacheKey {
    type Value: Serialize + DeserializeOwned + Send + Sync;

    fn bind_with_args(
        &self, backend: Arc<CacheBackend>, args: <Self as CacheKey>::Args<'_>,
    ) -> CacheEntry<Self::Value> {
        let key = CacheKey::get_key_with_args(self, args);
        CacheEntry::new(backend, key)
    }

    fn bind_with(
        &self, backend: Arc<CacheBackend>,
        arg: <<Self as CacheKey>::Args<'_> as CacheKeyArg1>::Arg0,
    ) -> CacheEntry<Self::Value>
    where
        for<'r> <Self as CacheKey>::Args<'r>: CacheKeyArg1,
    {
        CacheTypeBind::bind_with_args(
            self,
            backend,
            <<Self as CacheKey>::Args<'_> as CacheKeyArg1>::construct(arg),
        )
    }

    fn bind(&self, backend: Arc<CacheBackend>) -> CacheEntry<Self::Value>
    where
        for<'r> <Self as CacheKey>::Args<'r>: CacheKeyAutoConstruct,
    {
        CacheTypeBind::bind_with_args(
            self,
            backend,
            CacheKeyAutoConstruct::construct(),
        )
    }
}

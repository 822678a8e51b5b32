//! 缓存后端注册表，按 `cache.type` 配置的名称查找构造函数

use crate::cache::traits::ObjectCache;
use crate::errors::Result;
use once_cell::sync::Lazy;
use std::{
    collections::BTreeMap,
    future::Future,
    pin::Pin,
    sync::{Arc, PoisonError, RwLock},
};

pub type BoxedObjectCacheFuture =
    Pin<Box<dyn Future<Output = Result<Box<dyn ObjectCache>>> + Send>>;
pub type ObjectCacheConstructor = Arc<dyn Fn() -> BoxedObjectCacheFuture + Send + Sync>;

// 注册只发生在启动阶段，锁中毒时沿用已有内容
static REGISTRY: Lazy<RwLock<BTreeMap<String, ObjectCacheConstructor>>> =
    Lazy::new(|| RwLock::new(BTreeMap::new()));

pub fn register_object_cache_plugin<S: Into<String>>(name: S, constructor: ObjectCacheConstructor) {
    REGISTRY
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(name.into(), constructor);
}

pub fn get_object_cache_plugin(name: &str) -> Option<ObjectCacheConstructor> {
    REGISTRY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(name)
        .cloned()
}

/// 已注册的后端名称（有序）
pub fn registered_cache_backends() -> Vec<String> {
    REGISTRY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .keys()
        .cloned()
        .collect()
}

pub fn debug_object_cache_registry() {
    let backends = registered_cache_backends();
    if backends.is_empty() {
        tracing::debug!("未注册任何缓存后端");
    } else {
        tracing::debug!("已注册的缓存后端: {}", backends.join(", "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SchoolError;

    #[test]
    fn test_lookup_by_name() {
        register_object_cache_plugin(
            "test-unavailable",
            Arc::new(|| {
                Box::pin(async { Err(SchoolError::cache_connection("offline")) })
                    as BoxedObjectCacheFuture
            }),
        );

        assert!(get_object_cache_plugin("test-unavailable").is_some());
        assert!(get_object_cache_plugin("memcached").is_none());
        assert!(registered_cache_backends().contains(&"test-unavailable".to_string()));
    }
}

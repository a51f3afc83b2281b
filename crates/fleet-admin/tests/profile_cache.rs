//! Cache-aside profile reads against SQLite and the memory cache.

use std::sync::Arc;

use chrono::Duration;
use fleet_admin::profile::PROFILES;
use fleet_admin::{
    AdminError, DocumentStore, KeyValueCache, MemoryCache, Profile, ProfileService,
    SqliteDocumentStore,
};
use sqlx::sqlite::SqlitePoolOptions;

async fn create_store() -> Arc<SqliteDocumentStore> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(":memory:")
        .await
        .expect("Failed to create in-memory SQLite pool");
    let store = SqliteDocumentStore::new(pool);
    store.init().await.expect("Failed to create tables");
    Arc::new(store)
}

fn profile(name: &str) -> Profile {
    Profile {
        name: name.to_string(),
        email: "ops@haulco.example".to_string(),
        company: Some("Haulco Ltd".to_string()),
        operator_licence: Some("OB1234567".to_string()),
    }
}

#[tokio::test]
async fn test_miss_populates_then_hit_skips_store() {
    let store = create_store().await;
    let cache = Arc::new(MemoryCache::new());
    let service = ProfileService::new(store.clone(), cache.clone(), Duration::minutes(5));

    let id = service.create_profile(&profile("Ada")).await.unwrap();
    let key = ProfileService::cache_key(&id);
    assert!(!cache.exists(&key).await.unwrap());

    let first = service.get_profile(&id).await.unwrap().unwrap();
    assert_eq!(first.name, "Ada");
    assert!(cache.exists(&key).await.unwrap());

    // Change the store behind the service's back: the cached copy still wins.
    store
        .update(PROFILES, &id, serde_json::to_value(profile("Grace")).unwrap())
        .await
        .unwrap();
    let second = service.get_profile(&id).await.unwrap().unwrap();
    assert_eq!(second.name, "Ada");
}

#[tokio::test]
async fn test_update_invalidates_cached_copy() {
    let store = create_store().await;
    let cache = Arc::new(MemoryCache::new());
    let service = ProfileService::new(store, cache.clone(), Duration::minutes(5));

    let id = service.create_profile(&profile("Ada")).await.unwrap();
    service.get_profile(&id).await.unwrap();

    service.update_profile(&id, &profile("Grace")).await.unwrap();
    assert!(!cache.exists(&ProfileService::cache_key(&id)).await.unwrap());
    assert_eq!(service.get_profile(&id).await.unwrap().unwrap().name, "Grace");
}

#[tokio::test]
async fn test_expired_entry_reads_through() {
    let store = create_store().await;
    let cache = Arc::new(MemoryCache::new());
    let service = ProfileService::new(store.clone(), cache.clone(), Duration::zero());

    let id = service.create_profile(&profile("Ada")).await.unwrap();
    service.get_profile(&id).await.unwrap();

    store
        .update(PROFILES, &id, serde_json::to_value(profile("Grace")).unwrap())
        .await
        .unwrap();
    assert_eq!(service.get_profile(&id).await.unwrap().unwrap().name, "Grace");
}

#[tokio::test]
async fn test_undecodable_cache_entry_is_replaced() {
    let store = create_store().await;
    let cache = Arc::new(MemoryCache::new());
    let service = ProfileService::new(store, cache.clone(), Duration::minutes(5));

    let id = service.create_profile(&profile("Ada")).await.unwrap();
    let key = ProfileService::cache_key(&id);
    cache
        .set_with_ttl(&key, "{not json".to_string(), Duration::minutes(5))
        .await
        .unwrap();

    assert_eq!(service.get_profile(&id).await.unwrap().unwrap().name, "Ada");
    let cached = cache.get(&key).await.unwrap().unwrap();
    assert!(cached.contains("\"Ada\""));
}

#[tokio::test]
async fn test_missing_and_deleted_profiles() {
    let store = create_store().await;
    let cache = Arc::new(MemoryCache::new());
    let service = ProfileService::new(store, cache.clone(), Duration::minutes(5));

    assert!(service.get_profile("nope").await.unwrap().is_none());
    assert!(cache.is_empty());

    let id = service.create_profile(&profile("Ada")).await.unwrap();
    service.get_profile(&id).await.unwrap();
    service.delete_profile(&id).await.unwrap();

    assert!(service.get_profile(&id).await.unwrap().is_none());
    assert!(matches!(
        service.delete_profile(&id).await,
        Err(AdminError::NotFound { .. })
    ));
}

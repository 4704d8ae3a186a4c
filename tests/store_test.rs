use std::time::Duration;

use sporelay::management::{FileStore, KvStore, MemoryStore};
use sporelay::utils::generate_state_token;

#[tokio::test]
async fn test_memory_store_roundtrip() {
    let store = MemoryStore::new();

    assert_eq!(store.get("missing").await.unwrap(), None);

    store.put("key", "value", None).await.unwrap();
    assert_eq!(store.get("key").await.unwrap(), Some("value".to_string()));

    // Overwrite replaces the previous value
    store.put("key", "other", None).await.unwrap();
    assert_eq!(store.get("key").await.unwrap(), Some("other".to_string()));

    store.delete("key").await.unwrap();
    assert_eq!(store.get("key").await.unwrap(), None);

    // Deleting an absent key is not an error
    store.delete("key").await.unwrap();
}

#[tokio::test]
async fn test_memory_store_ttl_expiry() {
    let store = MemoryStore::new();

    store
        .put("short", "lived", Some(Duration::from_millis(50)))
        .await
        .unwrap();
    assert_eq!(store.get("short").await.unwrap(), Some("lived".to_string()));

    tokio::time::sleep(Duration::from_millis(80)).await;

    // Expired entries read as absent
    assert_eq!(store.get("short").await.unwrap(), None);
}

#[tokio::test]
async fn test_memory_store_no_ttl_never_expires() {
    let store = MemoryStore::new();

    store.put("stable", "value", None).await.unwrap();
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(store.get("stable").await.unwrap(), Some("value".to_string()));
}

#[tokio::test]
async fn test_file_store_roundtrip_and_expiry() {
    let base = std::env::temp_dir().join(format!("sporelay-test-{}", generate_state_token()));
    let store = FileStore::new(base.clone());

    assert_eq!(store.get("missing").await.unwrap(), None);

    store.put("key", "value", None).await.unwrap();
    assert_eq!(store.get("key").await.unwrap(), Some("value".to_string()));

    store
        .put("short", "lived", Some(Duration::from_millis(50)))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(80)).await;
    assert_eq!(store.get("short").await.unwrap(), None);

    store.delete("key").await.unwrap();
    assert_eq!(store.get("key").await.unwrap(), None);
    store.delete("key").await.unwrap();

    let _ = std::fs::remove_dir_all(base);
}

#[tokio::test]
async fn test_file_store_persists_across_instances() {
    let base = std::env::temp_dir().join(format!("sporelay-test-{}", generate_state_token()));

    let store = FileStore::new(base.clone());
    store.put("key", "value", None).await.unwrap();
    drop(store);

    // A fresh instance over the same directory sees the entry
    let reopened = FileStore::new(base.clone());
    assert_eq!(
        reopened.get("key").await.unwrap(),
        Some("value".to_string())
    );

    let _ = std::fs::remove_dir_all(base);
}

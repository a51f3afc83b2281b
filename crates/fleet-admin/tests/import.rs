//! JSON import through the record forms.

use std::sync::Arc;

use fleet_admin::records::WorkingTimeRecord;
use fleet_admin::{import_json, import_records, AdminError, Collection, DocumentStore, SqliteDocumentStore};
use fleet_forms::MemoryUrlRegistry;
use serde_json::json;
use sqlx::sqlite::SqlitePoolOptions;

async fn create_store() -> SqliteDocumentStore {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(":memory:")
        .await
        .expect("Failed to create in-memory SQLite pool");
    let store = SqliteDocumentStore::new(pool);
    store.init().await.expect("Failed to create tables");
    store
}

#[tokio::test]
async fn test_import_reports_created_and_refused() {
    let store = create_store().await;
    let items = vec![
        json!({
            "driver_name": "Ola Nowak",
            "week_commencing": "2025-03-03",
            "hours_worked": 44.5,
            "breaks_taken": true
        }),
        // A Tuesday.
        json!({
            "driver_name": "Ola Nowak",
            "week_commencing": "2025-03-04",
            "hours_worked": 40
        }),
        json!("not an object"),
        json!({
            "driver_name": "Sam Hill",
            "week_commencing": "2025-03-10",
            "hours_worked": "38"
        }),
    ];

    let report = import_records::<WorkingTimeRecord>(&store, Arc::new(MemoryUrlRegistry::new()), items)
        .await
        .unwrap();

    assert_eq!(report.created.len(), 2);
    let refused: Vec<usize> = report.rejected.iter().map(|r| r.index).collect();
    assert_eq!(refused, vec![1, 2]);
    assert!(report.rejected[0].errors.contains_key("week_commencing"));
    assert!(report.rejected[1].errors.contains_key("__all__"));

    let docs = store.list("working-time").await.unwrap();
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0].body["hours_worked"], 44.5);
    assert_eq!(docs[0].body["breaks_taken"], true);
    assert_eq!(docs[1].body["breaks_taken"], false);
}

#[tokio::test]
async fn test_import_json_picks_collection() {
    let store = create_store().await;
    let json = r#"[
        {"plan": "fleet", "seats": 12, "renews_on": "2026-04-01", "billing_email": "accounts@haulco.example"},
        {"plan": "fleet", "seats": 2.5, "renews_on": "2026-04-01", "billing_email": "accounts@haulco.example"}
    ]"#;

    let report = import_json(&store, Arc::new(MemoryUrlRegistry::new()), Collection::Subscriptions, json)
        .await
        .unwrap();

    assert_eq!(report.created.len(), 1);
    assert!(report.rejected[0].errors.contains_key("seats"));
    assert_eq!(store.count("subscriptions").await.unwrap(), 1);
}

#[tokio::test]
async fn test_import_requires_an_array() {
    let store = create_store().await;
    let result = import_json(&store, Arc::new(MemoryUrlRegistry::new()), Collection::Drivers, "{}").await;
    assert!(matches!(result, Err(AdminError::Validation(_))));

    let result = import_json(&store, Arc::new(MemoryUrlRegistry::new()), Collection::Drivers, "[").await;
    assert!(matches!(result, Err(AdminError::Json(_))));
}

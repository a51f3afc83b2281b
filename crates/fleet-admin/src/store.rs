//! Document storage keyed by collection and opaque id.

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::Serialize;
use serde_json::Value;
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use crate::error::{AdminError, Result};

/// A stored JSON object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    /// Opaque identifier, unique across collections.
    pub id: String,
    /// Collection the document belongs to.
    pub collection: String,
    /// The document itself; always a JSON object.
    pub body: Value,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// CRUD over JSON documents.
///
/// Ids are generated by the store and carry no meaning for callers.
pub trait DocumentStore: Send + Sync {
    /// Stores a new document and returns its id.
    fn create<'a>(&'a self, collection: &'a str, body: Value) -> BoxFuture<'a, Result<String>>;

    /// Fetches a document.
    fn get<'a>(&'a self, collection: &'a str, id: &'a str)
        -> BoxFuture<'a, Result<Option<Document>>>;

    /// Replaces the body of an existing document.
    fn update<'a>(&'a self, collection: &'a str, id: &'a str, body: Value)
        -> BoxFuture<'a, Result<()>>;

    /// Deletes a document, returning whether it existed.
    fn delete<'a>(&'a self, collection: &'a str, id: &'a str) -> BoxFuture<'a, Result<bool>>;

    /// Lists a collection in creation order.
    fn list<'a>(&'a self, collection: &'a str) -> BoxFuture<'a, Result<Vec<Document>>>;
}

/// SQL to create the documents table.
pub const CREATE_DOCUMENTS_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    id VARCHAR(32) PRIMARY KEY,
    collection VARCHAR(64) NOT NULL,
    body TEXT NOT NULL,
    created_at TIMESTAMP NOT NULL,
    updated_at TIMESTAMP NOT NULL
)
"#;

const CREATE_COLLECTION_INDEX_SQL: &str =
    "CREATE INDEX IF NOT EXISTS documents_collection ON documents (collection, created_at)";

#[derive(Debug, FromRow)]
struct DocumentRow {
    id: String,
    collection: String,
    body: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<DocumentRow> for Document {
    type Error = AdminError;

    fn try_from(row: DocumentRow) -> Result<Self> {
        Ok(Self {
            body: serde_json::from_str(&row.body)?,
            id: row.id,
            collection: row.collection,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// [`DocumentStore`] backed by one SQLite table of JSON bodies.
#[derive(Debug, Clone)]
pub struct SqliteDocumentStore {
    pool: SqlitePool,
}

impl SqliteDocumentStore {
    /// Creates a store over `pool`. Call [`init`](Self::init) once first.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates the documents table if it doesn't exist.
    pub async fn init(&self) -> Result<()> {
        sqlx::query(CREATE_DOCUMENTS_TABLE_SQL)
            .execute(&self.pool)
            .await?;
        sqlx::query(CREATE_COLLECTION_INDEX_SQL)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Returns the number of documents in a collection.
    pub async fn count(&self, collection: &str) -> Result<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM documents WHERE collection = ?")
            .bind(collection)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }

    async fn insert(&self, collection: &str, body: Value) -> Result<String> {
        let body = encode_body(&body)?;
        let id = generate_document_id();
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO documents (id, collection, body, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(collection)
        .bind(body)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;
        debug!(collection, id = %id, "document created");
        Ok(id)
    }

    async fn fetch(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        sqlx::query_as::<_, DocumentRow>(
            "SELECT id, collection, body, created_at, updated_at FROM documents WHERE collection = ? AND id = ?",
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(Document::try_from)
        .transpose()
    }

    async fn replace(&self, collection: &str, id: &str, body: Value) -> Result<()> {
        let body = encode_body(&body)?;
        let result = sqlx::query(
            "UPDATE documents SET body = ?, updated_at = ? WHERE collection = ? AND id = ?",
        )
        .bind(body)
        .bind(Utc::now())
        .bind(collection)
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AdminError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    async fn remove(&self, collection: &str, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = ? AND id = ?")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn fetch_all(&self, collection: &str) -> Result<Vec<Document>> {
        sqlx::query_as::<_, DocumentRow>(
            "SELECT id, collection, body, created_at, updated_at FROM documents WHERE collection = ? ORDER BY created_at, rowid",
        )
        .bind(collection)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(Document::try_from)
        .collect()
    }
}

impl DocumentStore for SqliteDocumentStore {
    fn create<'a>(&'a self, collection: &'a str, body: Value) -> BoxFuture<'a, Result<String>> {
        self.insert(collection, body).boxed()
    }

    fn get<'a>(
        &'a self,
        collection: &'a str,
        id: &'a str,
    ) -> BoxFuture<'a, Result<Option<Document>>> {
        self.fetch(collection, id).boxed()
    }

    fn update<'a>(
        &'a self,
        collection: &'a str,
        id: &'a str,
        body: Value,
    ) -> BoxFuture<'a, Result<()>> {
        self.replace(collection, id, body).boxed()
    }

    fn delete<'a>(&'a self, collection: &'a str, id: &'a str) -> BoxFuture<'a, Result<bool>> {
        self.remove(collection, id).boxed()
    }

    fn list<'a>(&'a self, collection: &'a str) -> BoxFuture<'a, Result<Vec<Document>>> {
        self.fetch_all(collection).boxed()
    }
}

fn encode_body(body: &Value) -> Result<String> {
    if !body.is_object() {
        return Err(AdminError::Validation(
            "document body must be a JSON object".to_string(),
        ));
    }
    Ok(serde_json::to_string(body)?)
}

/// Generates a random 32 character hex document id.
fn generate_document_id() -> String {
    use rand::RngExt;
    let mut rng = rand::rng();
    let mut bytes = [0u8; 16];
    rng.fill(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn create_test_store() -> SqliteDocumentStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await
            .expect("Failed to create in-memory SQLite pool");
        let store = SqliteDocumentStore::new(pool);
        store.init().await.unwrap();
        store
    }

    #[test]
    fn test_document_id_generation() {
        let a = generate_document_id();
        let b = generate_document_id();
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_init_is_idempotent() {
        let store = create_test_store().await;
        store.init().await.unwrap();
    }

    #[tokio::test]
    async fn test_crud_round() {
        let store = create_test_store().await;

        let id = store
            .create("vehicles", json!({"registration": "AB12 CDE"}))
            .await
            .unwrap();
        let doc = store.get("vehicles", &id).await.unwrap().unwrap();
        assert_eq!(doc.body["registration"], "AB12 CDE");
        assert_eq!(doc.collection, "vehicles");

        // Ids are scoped by collection on read.
        assert!(store.get("drivers", &id).await.unwrap().is_none());

        store
            .update("vehicles", &id, json!({"registration": "XY34 FGH"}))
            .await
            .unwrap();
        let doc = store.get("vehicles", &id).await.unwrap().unwrap();
        assert_eq!(doc.body["registration"], "XY34 FGH");
        assert!(doc.updated_at >= doc.created_at);

        assert!(store.delete("vehicles", &id).await.unwrap());
        assert!(!store.delete("vehicles", &id).await.unwrap());
        assert!(store.get("vehicles", &id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let store = create_test_store().await;
        let err = store
            .update("vehicles", "missing", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, AdminError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_keeps_creation_order() {
        let store = create_test_store().await;
        for reg in ["A1", "B2", "C3"] {
            store.create("vehicles", json!({ "registration": reg })).await.unwrap();
        }
        store.create("drivers", json!({"full_name": "Sam"})).await.unwrap();

        let docs = store.list("vehicles").await.unwrap();
        let regs: Vec<&str> = docs
            .iter()
            .filter_map(|d| d.body["registration"].as_str())
            .collect();
        assert_eq!(regs, vec!["A1", "B2", "C3"]);
        assert_eq!(store.count("drivers").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_non_object_body_is_rejected() {
        let store = create_test_store().await;
        let err = store.create("vehicles", json!([1, 2])).await.unwrap_err();
        assert!(matches!(err, AdminError::Validation(_)));
    }
}

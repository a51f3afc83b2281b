//! Bulk import of records from JSON.
//!
//! Every object goes through the same form as a browser post, so imported
//! records obey the same field rules and conversions.

use std::collections::BTreeMap;
use std::sync::Arc;

use fleet_forms::{UrlRegistry, NON_FIELD_ERRORS};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::{AdminError, Result};
use crate::records::{Collection, Resource};
use crate::store::DocumentStore;
use crate::views::{save_record, SaveOutcome, Submission};
use crate::with_resource;

/// One object the import refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportRejection {
    /// Position of the object in the input.
    pub index: usize,
    /// Messages by field name (`__all__` for the whole object).
    pub errors: BTreeMap<String, Vec<String>>,
}

/// Result of an import run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    /// Ids of the stored records, in input order.
    pub created: Vec<String>,
    /// Objects that were not stored.
    pub rejected: Vec<ImportRejection>,
}

impl ImportReport {
    fn reject(&mut self, index: usize, message: impl Into<String>) {
        self.rejected.push(ImportRejection {
            index,
            errors: BTreeMap::from([(NON_FIELD_ERRORS.to_string(), vec![message.into()])]),
        });
    }
}

/// Imports `items` as records of type `T`.
///
/// Refused objects are reported and skipped. Store failures abort the run.
pub async fn import_records<T: Resource>(
    store: &dyn DocumentStore,
    registry: Arc<dyn UrlRegistry>,
    items: Vec<Value>,
) -> Result<ImportReport> {
    let mut report = ImportReport::default();

    for (index, item) in items.into_iter().enumerate() {
        let Value::Object(object) = item else {
            report.reject(index, "Expected a JSON object.");
            continue;
        };

        let submission = Submission::from_json(&object);
        match save_record::<T>(store, Arc::clone(&registry), submission).await? {
            SaveOutcome::Created(id) => report.created.push(id),
            SaveOutcome::Invalid(form) => {
                let errors = form.errors().to_map();
                warn!(collection = %T::COLLECTION, index, "import object refused");
                report.rejected.push(ImportRejection { index, errors });
            }
        }
    }

    info!(
        collection = %T::COLLECTION,
        created = report.created.len(),
        rejected = report.rejected.len(),
        "import finished"
    );
    Ok(report)
}

/// Imports a JSON array into `collection`.
pub async fn import_json(
    store: &dyn DocumentStore,
    registry: Arc<dyn UrlRegistry>,
    collection: Collection,
    json: &str,
) -> Result<ImportReport> {
    let items = match serde_json::from_str::<Value>(json)? {
        Value::Array(items) => items,
        _ => {
            return Err(AdminError::Validation(
                "import file must hold a JSON array".to_string(),
            ))
        }
    };
    with_resource!(collection, R => import_records::<R>(store, registry, items).await)
}

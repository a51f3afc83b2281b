//! Record list pages.

use fleet_table::{render_table, DataTable, TableViewState};
use tracing::warn;

use crate::error::Result;
use crate::http::{ApiEnvelope, Request, Response};
use crate::nav::FeatureFlags;
use crate::records::Resource;
use crate::store::DocumentStore;

use super::{render_page, AppContext};

/// Loads every stored record of type `T`, in creation order.
///
/// Documents that no longer deserialize are skipped and logged.
pub async fn load_records<T: Resource>(store: &dyn DocumentStore) -> Result<Vec<T>> {
    let collection = T::COLLECTION;
    let documents = store.list(collection.slug()).await?;
    let mut records = Vec::with_capacity(documents.len());
    for document in documents {
        match serde_json::from_value::<T>(document.body) {
            Ok(record) => records.push(record),
            Err(e) => warn!(%collection, id = %document.id, error = %e, "skipping unreadable document"),
        }
    }
    Ok(records)
}

/// Builds the table for `T` with the state read from a query string.
pub async fn record_table<T: Resource>(
    store: &dyn DocumentStore,
    state: TableViewState,
) -> Result<DataTable<T>> {
    let rows = load_records::<T>(store).await?;
    let page_size = state.page_size;
    Ok(DataTable::new(T::columns(), rows, page_size).with_state(state))
}

/// Renders the list page for `T`.
///
/// JSON clients get the stored documents in an envelope instead.
pub async fn list_view<T: Resource>(
    ctx: &AppContext,
    req: &Request,
    flags: &FeatureFlags,
) -> Result<Response> {
    let collection = T::COLLECTION;
    if req.wants_json() {
        let documents = ctx.store.list(collection.slug()).await?;
        return Ok(ApiEnvelope::ok(documents).into_response());
    }

    let state = TableViewState::from_params(&req.query, ctx.config.page_size);
    let table = record_table::<T>(ctx.store.as_ref(), state).await?;

    let add_url = collection.add_url();
    let content = format!(
        r#"<div class="d-flex justify-content-end mb-3"><a class="btn btn-primary" href="{add_url}"><i class="bi bi-plus-lg me-1"></i>Add {}</a></div>
<div class="card"><div class="card-body">{}</div></div>"#,
        fleet_table::html_escape(&T::TITLE.to_lowercase()),
        render_table(&table)
    );

    let breadcrumbs = vec![
        ("Home".to_string(), Some("/".to_string())),
        (T::TITLE_PLURAL.to_string(), None),
    ];
    Ok(render_page(
        ctx,
        flags,
        Some(collection.slug()),
        T::TITLE_PLURAL,
        content,
        breadcrumbs,
        Vec::new(),
    ))
}

//! Record form pages and the create handler.

use std::collections::HashMap;
use std::sync::Arc;

use fleet_forms::{FieldRules, FormEngine, FormValues, SubmitOutcome, Typed, UploadedFile, UrlRegistry};
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use crate::error::{AdminError, Result};
use crate::http::{ApiEnvelope, Request, Response};
use crate::nav::FeatureFlags;
use crate::records::Resource;
use crate::store::DocumentStore;

use super::{render_page, AppContext};

/// The form engine for a record type.
pub type RecordForm<T> = FormEngine<Typed<FieldRules, T>>;

/// Builds an empty form for `T`.
pub fn record_form<T: Resource>(registry: Arc<dyn UrlRegistry>) -> Result<RecordForm<T>> {
    Ok(FormEngine::new(
        T::form_fields()?,
        T::schema(),
        FormValues::new(),
        registry,
    )?)
}

/// Raw values posted for one record.
#[derive(Debug, Clone, Default)]
pub struct Submission {
    /// Text values by field name, as an HTML form posts them.
    pub fields: HashMap<String, String>,
    /// Uploaded files with the field they were posted under.
    pub files: Vec<(String, UploadedFile)>,
}

impl Submission {
    /// Reads a request body: urlencoded, multipart or a JSON object.
    pub fn from_request(req: &Request) -> Result<Self> {
        if let Some(parts) = req.multipart() {
            let mut submission = Self::default();
            for part in parts {
                match part.filename {
                    Some(filename) if !filename.is_empty() && !part.data.is_empty() => {
                        let mime = part
                            .content_type
                            .unwrap_or_else(|| "application/octet-stream".to_string());
                        submission
                            .files
                            .push((part.name, UploadedFile::new(filename, mime, part.data)));
                    }
                    Some(_) => {}
                    None => {
                        let text = String::from_utf8_lossy(&part.data).into_owned();
                        submission.fields.insert(part.name, text);
                    }
                }
            }
            return Ok(submission);
        }

        if req.content_type().as_deref() == Some("application/json") {
            return match req.json::<Value>()? {
                Value::Object(object) => Ok(Self::from_json(&object)),
                _ => Err(AdminError::Validation("expected a JSON object".to_string())),
            };
        }

        Ok(Self {
            fields: req.form(),
            files: Vec::new(),
        })
    }

    /// Converts a JSON object into what an HTML form would post.
    ///
    /// `true` posts as `on` and `false` as nothing, so checkboxes read back
    /// the same way. Nested values are skipped.
    pub fn from_json(object: &Map<String, Value>) -> Self {
        let mut fields = HashMap::new();
        for (name, value) in object {
            let raw = match value {
                Value::Null | Value::Bool(false) => String::new(),
                Value::Bool(true) => "on".to_string(),
                Value::Number(n) => n.to_string(),
                Value::String(s) => s.clone(),
                Value::Array(_) | Value::Object(_) => {
                    debug!(field = %name, "skipping nested value");
                    continue;
                }
            };
            fields.insert(name.clone(), raw);
        }
        Self {
            fields,
            files: Vec::new(),
        }
    }
}

/// What saving a submission did.
pub enum SaveOutcome<T: Resource> {
    /// The record was stored under this id.
    Created(String),
    /// The form refused the values; its errors say why.
    Invalid(Box<RecordForm<T>>),
}

/// Runs a submission through the form for `T` and stores the result.
pub async fn save_record<T: Resource>(
    store: &dyn DocumentStore,
    registry: Arc<dyn UrlRegistry>,
    submission: Submission,
) -> Result<SaveOutcome<T>> {
    let mut form = record_form::<T>(registry)?;
    let accepted = form.input_form(&submission.fields);

    let mut uploads: Vec<(String, Vec<UploadedFile>)> = Vec::new();
    for (name, file) in submission.files {
        match uploads.iter_mut().find(|(n, _)| *n == name) {
            Some((_, files)) => files.push(file),
            None => uploads.push((name, vec![file])),
        }
    }
    let files_accepted = form.input_files(uploads);
    if !files_accepted {
        warn!(collection = %T::COLLECTION, "submission carried unexpected files");
    }

    if !accepted || !files_accepted {
        return Ok(SaveOutcome::Invalid(Box::new(form)));
    }

    let mut created = None;
    let slot = &mut created;
    let outcome = form
        .submit(|record: T| async move {
            let body = serde_json::to_value(&record)?;
            *slot = Some(store.create(T::COLLECTION.slug(), body).await?);
            Ok::<(), AdminError>(())
        })
        .await?;

    match (outcome, created) {
        (SubmitOutcome::Submitted, Some(id)) => {
            info!(collection = %T::COLLECTION, id = %id, "record created");
            Ok(SaveOutcome::Created(id))
        }
        _ => Ok(SaveOutcome::Invalid(Box::new(form))),
    }
}

fn breadcrumbs<T: Resource>() -> Vec<(String, Option<String>)> {
    vec![
        ("Home".to_string(), Some("/".to_string())),
        (T::TITLE_PLURAL.to_string(), Some(T::COLLECTION.list_url())),
        (format!("Add {}", T::TITLE.to_lowercase()), None),
    ]
}

fn form_page<T: Resource>(
    ctx: &AppContext,
    flags: &FeatureFlags,
    form: &RecordForm<T>,
    messages: Vec<(String, String)>,
) -> Response {
    let collection = T::COLLECTION;
    let content = format!(
        r#"<div class="card"><div class="card-body">{}</div></div>"#,
        form.render(&collection.add_url(), "post", &collection.list_url())
    );
    render_page(
        ctx,
        flags,
        Some(collection.slug()),
        &format!("Add {}", T::TITLE.to_lowercase()),
        content,
        breadcrumbs::<T>(),
        messages,
    )
}

/// Renders the empty add form.
pub fn add_view<T: Resource>(ctx: &AppContext, flags: &FeatureFlags) -> Result<Response> {
    let form = record_form::<T>(Arc::clone(&ctx.registry))?;
    Ok(form_page(ctx, flags, &form, Vec::new()))
}

/// Handles a posted add form.
///
/// JSON clients get an envelope: 201 with the new id, 422 with field errors
/// or 500. Browsers are redirected to the list on success and shown the form
/// again otherwise.
pub async fn create_record<T: Resource>(
    ctx: &AppContext,
    req: &Request,
    flags: &FeatureFlags,
) -> Response {
    let json = req.wants_json();
    let saved = match Submission::from_request(req) {
        Ok(submission) => {
            save_record::<T>(ctx.store.as_ref(), Arc::clone(&ctx.registry), submission).await
        }
        Err(e) => Err(e),
    };

    match saved {
        Ok(SaveOutcome::Created(id)) if json => {
            ApiEnvelope::created(json!({ "id": id }))
                .message(format!("{} created.", T::TITLE))
                .into_response()
        }
        Ok(SaveOutcome::Created(_)) => Response::redirect(T::COLLECTION.list_url()),
        Ok(SaveOutcome::Invalid(form)) if json => {
            ApiEnvelope::<()>::validation(form.errors()).into_response()
        }
        Ok(SaveOutcome::Invalid(form)) => {
            let messages = vec![(
                "error".to_string(),
                "Please correct the errors below.".to_string(),
            )];
            form_page(ctx, flags, &form, messages).status(422)
        }
        Err(e) => {
            warn!(collection = %T::COLLECTION, error = %e, "create failed");
            if json {
                return ApiEnvelope::<()>::failure(e.to_string()).into_response();
            }
            let status = match e {
                AdminError::Json(_) | AdminError::Validation(_) => 400,
                _ => 500,
            };
            match record_form::<T>(Arc::clone(&ctx.registry)) {
                Ok(form) => {
                    let messages = vec![("error".to_string(), format!("Could not save: {e}"))];
                    form_page(ctx, flags, &form, messages).status(status)
                }
                Err(_) => Response::internal_server_error(),
            }
        }
    }
}

//! The form engine: field state, submission and HTML rendering.

use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use ironhtml::html;
use ironhtml::typed::Element;
use ironhtml_elements::{Button, Div, Li, Ul, A};
use tracing::{debug, info, warn};

use crate::error::{FormError, Result, ValidationErrors, NON_FIELD_ERRORS};
use crate::field::{check_fields, FieldConfig, FieldType};
use crate::schema::{Rejection, Schema};
use crate::upload::{FilePreviews, UrlRegistry};
use crate::value::{FieldValue, FormValues, UploadedFile};
use crate::widgets::{
    renders_own_label, widget_for, CalendarState, FieldState, WidgetAttrs, CALENDAR_KEY,
    CLOSE_KEY,
};

/// Shared view of a form's submitting flag.
///
/// Clones observe the same flag. Holding a [`SubmitGuard`] marks the form as
/// submitting; the flag resets when the guard is dropped.
#[derive(Debug, Clone, Default)]
pub struct SubmitFlag(Arc<AtomicBool>);

impl SubmitFlag {
    /// Returns whether a submission is running.
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Marks the form as submitting, unless it already is.
    pub fn try_acquire(&self) -> Option<SubmitGuard> {
        self.0
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| SubmitGuard(Arc::clone(&self.0)))
    }

    fn force_clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Resets the submitting flag when dropped.
#[derive(Debug)]
pub struct SubmitGuard(Arc<AtomicBool>);

impl Drop for SubmitGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// What a completed submit did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The schema accepted the values and the callback succeeded.
    Submitted,
    /// The schema rejected the values; errors are attached to the form.
    Rejected,
}

/// A generic form over a field list and a validation [`Schema`].
///
/// The engine owns the current value of every field, the error messages from
/// the last submit and the transient state of date and file fields.
pub struct FormEngine<S: Schema> {
    fields: Vec<FieldConfig>,
    schema: S,
    defaults: FormValues,
    values: FormValues,
    errors: ValidationErrors,
    submitting: SubmitFlag,
    previews: HashMap<String, FilePreviews>,
    calendars: HashMap<String, CalendarState>,
    registry: Arc<dyn UrlRegistry>,
}

impl<S: Schema> std::fmt::Debug for FormEngine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormEngine")
            .field("fields", &self.fields)
            .field("values", &self.values)
            .field("errors", &self.errors)
            .field("submitting", &self.submitting.is_set())
            .finish_non_exhaustive()
    }
}

impl<S: Schema> FormEngine<S> {
    /// Creates an engine.
    ///
    /// Fields missing from `defaults` start empty. A default for an unknown
    /// field or of the wrong shape is a configuration error.
    pub fn new(
        fields: Vec<FieldConfig>,
        schema: S,
        defaults: FormValues,
        registry: Arc<dyn UrlRegistry>,
    ) -> Result<Self> {
        check_fields(&fields)?;

        if let Some((name, _)) = defaults
            .iter()
            .find(|(name, _)| !fields.iter().any(|f| f.name == *name))
        {
            return Err(FormError::UnknownField(name.to_string()));
        }

        let mut initial = FormValues::new();
        for field in &fields {
            let value = match defaults.get(&field.name) {
                Some(value) if value.fits(field) => value.clone(),
                Some(_) => {
                    return Err(FormError::InvalidValue {
                        field: field.name.clone(),
                        message: format!("default does not fit a {} field", field.field_type),
                    })
                }
                None => FieldValue::empty_for(field),
            };
            initial.insert(field.name.clone(), value);
        }

        let mut engine = Self {
            fields,
            schema,
            defaults: initial.clone(),
            values: initial,
            errors: ValidationErrors::new(),
            submitting: SubmitFlag::default(),
            previews: HashMap::new(),
            calendars: HashMap::new(),
            registry,
        };
        engine.rebuild_previews();
        Ok(engine)
    }

    /// Returns the field definitions.
    pub fn fields(&self) -> &[FieldConfig] {
        &self.fields
    }

    fn field(&self, name: &str) -> Result<&FieldConfig> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))
    }

    fn field_of_type(&self, name: &str, field_type: FieldType) -> Result<&FieldConfig> {
        let field = self.field(name)?;
        if field.field_type != field_type {
            return Err(FormError::InvalidValue {
                field: name.to_string(),
                message: format!("not a {field_type} field"),
            });
        }
        Ok(field)
    }

    /// Returns the current value of a field.
    pub fn value(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    /// Returns every current value.
    pub fn values(&self) -> &FormValues {
        &self.values
    }

    /// Returns whether any value differs from its default.
    pub fn is_dirty(&self) -> bool {
        self.values != self.defaults
    }

    /// Returns the errors attached by the last submit.
    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Returns the first error message of a field.
    pub fn error(&self, name: &str) -> Option<&str> {
        self.errors.first(name)
    }

    /// Returns the whole-form error messages.
    pub fn non_field_errors(&self) -> &[String] {
        self.errors.non_field()
    }

    /// Returns whether a submission is running.
    pub fn is_submitting(&self) -> bool {
        self.submitting.is_set()
    }

    /// Returns a handle on the submitting flag.
    pub fn submit_flag(&self) -> SubmitFlag {
        self.submitting.clone()
    }

    /// Writes a value to a field and clears that field's error.
    pub fn set_value(&mut self, name: &str, value: impl Into<FieldValue>) -> Result<()> {
        let value = value.into();
        let field = self.field(name)?;
        if !value.fits(field) {
            return Err(FormError::InvalidValue {
                field: name.to_string(),
                message: format!("value does not fit a {} field", field.field_type),
            });
        }
        let is_file = field.field_type == FieldType::File;

        if is_file {
            let previews = self.previews.entry(name.to_string()).or_default();
            previews.clear();
            previews.append(&self.registry, value.files());
        }
        self.values.insert(name, value);
        self.touch(name);
        Ok(())
    }

    /// Writes a raw submitted string to a field, coercing it per field type.
    pub fn input(&mut self, name: &str, raw: &str) -> Result<()> {
        let value = FieldValue::coerce(self.field(name)?, raw)?;
        self.set_value(name, value)
    }

    /// Writes a posted HTML form into every non-file field.
    ///
    /// Fields absent from `posted` receive an empty string, which is how
    /// browsers report an unchecked checkbox. A value that cannot be coerced
    /// leaves the field untouched and is recorded as that field's error.
    /// Returns `false` when any value was refused.
    pub fn input_form(&mut self, posted: &HashMap<String, String>) -> bool {
        let names: Vec<String> = self
            .fields
            .iter()
            .filter(|f| f.field_type != FieldType::File && !f.disabled)
            .map(|f| f.name.clone())
            .collect();

        let mut refused = ValidationErrors::new();
        for name in names {
            let raw = posted.get(&name).map(String::as_str).unwrap_or("");
            match self.input(&name, raw) {
                Ok(()) => {}
                Err(FormError::InvalidValue { field, message }) => refused.add(&field, message),
                Err(e) => refused.add(&name, e.to_string()),
            }
        }

        if refused.is_empty() {
            return true;
        }
        debug!(fields = refused.len(), "posted values refused");
        self.errors.extend(refused);
        false
    }

    fn touch(&mut self, name: &str) {
        if self.errors.clear_field(name) {
            debug!(field = name, "cleared field error on edit");
        }
    }

    /// Validates the values and hands the typed output to `on_submit`.
    ///
    /// Returns [`SubmitOutcome::Rejected`] when the schema attributes errors
    /// to fields or to the whole form; those errors are then available through
    /// [`errors`](Self::errors). A schema failing without attribution and a
    /// failing callback are returned as errors. The submitting flag is set for
    /// the duration of the call and reset on every exit path, including the
    /// returned future being dropped.
    pub async fn submit<F, Fut, E>(&mut self, on_submit: F) -> Result<SubmitOutcome>
    where
        F: FnOnce(S::Output) -> Fut,
        Fut: Future<Output = std::result::Result<(), E>>,
        E: Display,
    {
        let Some(_guard) = self.submitting.try_acquire() else {
            warn!("submit rejected: a submission is already running");
            return Err(FormError::AlreadySubmitting);
        };

        self.errors.clear();
        let output = match self.schema.validate(&self.values, &self.fields) {
            Ok(output) => output,
            Err(Rejection::Fields(errors)) => {
                debug!(errors = errors.len(), "submit rejected by schema");
                self.errors = errors;
                return Ok(SubmitOutcome::Rejected);
            }
            Err(Rejection::Failed(message)) => {
                warn!(error = %message, "schema failed");
                return Err(FormError::SchemaFailure(message));
            }
        };

        if let Err(e) = on_submit(output).await {
            warn!(error = %e, "submission failed");
            return Err(FormError::SubmissionFailed(e.to_string()));
        }
        info!("form submitted");
        Ok(SubmitOutcome::Submitted)
    }

    /// Discards in-progress state without validating or submitting.
    pub fn cancel(&mut self) {
        self.reset();
        debug!("form cancelled");
    }

    /// Restores the defaults, clears errors and releases previews.
    pub fn reset(&mut self) {
        self.values = self.defaults.clone();
        self.errors.clear();
        self.calendars.clear();
        self.submitting.force_clear();
        self.rebuild_previews();
    }

    fn rebuild_previews(&mut self) {
        for previews in self.previews.values_mut() {
            previews.clear();
        }
        self.previews.clear();
        for field in self.fields.iter().filter(|f| f.field_type == FieldType::File) {
            let mut previews = FilePreviews::new();
            if let Some(value) = self.values.get(&field.name) {
                previews.append(&self.registry, value.files());
            }
            self.previews.insert(field.name.clone(), previews);
        }
    }

    // File fields.

    /// Adds files chosen through the picker.
    ///
    /// A `multiple` field appends them; a single field keeps only the first
    /// and replaces its previous file.
    pub fn select_files(&mut self, name: &str, files: Vec<UploadedFile>) -> Result<()> {
        let multiple = self.field_of_type(name, FieldType::File)?.multiple;
        if files.is_empty() {
            return Ok(());
        }

        let previews = self.previews.entry(name.to_string()).or_default();
        previews.set_dragging(false);

        if multiple {
            previews.append(&self.registry, &files);
            if let Some(FieldValue::Files(current)) = self.values.get_mut(name) {
                current.extend(files);
            }
        } else {
            let first = files.into_iter().take(1).collect::<Vec<_>>();
            previews.clear();
            previews.append(&self.registry, &first);
            self.values
                .insert(name, FieldValue::File(first.into_iter().next()));
        }
        self.touch(name);
        Ok(())
    }

    /// Writes posted uploads into their file fields.
    ///
    /// An upload naming a field that is not a file field becomes that field's
    /// error; one naming no field at all becomes a whole-form error. Returns
    /// `false` when any upload was refused.
    pub fn input_files(&mut self, uploads: Vec<(String, Vec<UploadedFile>)>) -> bool {
        let mut refused = ValidationErrors::new();
        for (name, files) in uploads {
            match self.select_files(&name, files) {
                Ok(()) => {}
                Err(FormError::UnknownField(field)) => {
                    refused.add_non_field(format!("Unexpected file upload: {field}."));
                }
                Err(FormError::InvalidValue { field, .. }) => {
                    refused.add(&field, "This field does not accept files.");
                }
                Err(e) => refused.add(&name, e.to_string()),
            }
        }

        if refused.is_empty() {
            return true;
        }
        debug!(uploads = refused.len(), "posted files refused");
        self.errors.extend(refused);
        false
    }

    /// Adds files dropped on the drop target.
    pub fn drop_files(&mut self, name: &str, files: Vec<UploadedFile>) -> Result<()> {
        self.drag_leave(name)?;
        self.select_files(name, files)
    }

    /// Marks files as being dragged over the field.
    pub fn drag_enter(&mut self, name: &str) -> Result<()> {
        self.set_dragging(name, true)
    }

    /// Clears the dragging mark.
    pub fn drag_leave(&mut self, name: &str) -> Result<()> {
        self.set_dragging(name, false)
    }

    fn set_dragging(&mut self, name: &str, dragging: bool) -> Result<()> {
        self.field_of_type(name, FieldType::File)?;
        self.previews
            .entry(name.to_string())
            .or_default()
            .set_dragging(dragging);
        Ok(())
    }

    /// Removes the `index`-th preview of a file field together with its file.
    ///
    /// Returns `false` when there is no such preview.
    pub fn remove_preview(&mut self, name: &str, index: usize) -> Result<bool> {
        let multiple = self.field_of_type(name, FieldType::File)?.multiple;
        let Some(position) = self
            .previews
            .get_mut(name)
            .and_then(|previews| previews.remove(index))
        else {
            return Ok(false);
        };

        match self.values.get_mut(name) {
            Some(FieldValue::Files(files)) if multiple && position < files.len() => {
                files.remove(position);
            }
            Some(value) if !multiple => *value = FieldValue::File(None),
            _ => {}
        }
        self.touch(name);
        Ok(true)
    }

    /// Returns the preview state of a file field.
    pub fn previews(&self, name: &str) -> Option<&FilePreviews> {
        self.previews.get(name)
    }

    // Date fields.

    /// Opens the calendar of a date field on the month of its value, or of
    /// today when no date is picked.
    pub fn open_calendar(&mut self, name: &str) -> Result<()> {
        self.field_of_type(name, FieldType::Date)?;
        let reference = self
            .values
            .get(name)
            .and_then(FieldValue::as_date)
            .unwrap_or_else(|| chrono::Local::now().date_naive());
        self.calendars
            .entry(name.to_string())
            .or_insert_with(|| CalendarState::new(reference))
            .open_at(reference);
        Ok(())
    }

    /// Closes the calendar of a date field.
    pub fn close_calendar(&mut self, name: &str) -> Result<()> {
        self.field_of_type(name, FieldType::Date)?;
        if let Some(calendar) = self.calendars.get_mut(name) {
            calendar.close();
        }
        Ok(())
    }

    /// Handles a key pressed on a date field's input.
    ///
    /// [`CALENDAR_KEY`] opens the calendar and [`CLOSE_KEY`] closes it.
    /// Returns whether the key was handled.
    pub fn key_down(&mut self, name: &str, key: &str) -> Result<bool> {
        match key {
            CALENDAR_KEY => self.open_calendar(name).map(|()| true),
            CLOSE_KEY => self.close_calendar(name).map(|()| true),
            _ => {
                self.field_of_type(name, FieldType::Date)?;
                Ok(false)
            }
        }
    }

    /// Moves an open calendar by `delta` months.
    pub fn shift_calendar(&mut self, name: &str, delta: i32) -> Result<()> {
        self.field_of_type(name, FieldType::Date)?;
        if let Some(calendar) = self.calendars.get_mut(name) {
            calendar.shift(delta);
        }
        Ok(())
    }

    /// Commits a date picked in the calendar and closes it.
    pub fn pick_date(&mut self, name: &str, date: NaiveDate) -> Result<()> {
        self.set_value(name, date)?;
        self.close_calendar(name)
    }

    /// Returns the calendar state of a date field.
    pub fn calendar(&self, name: &str) -> Option<&CalendarState> {
        self.calendars.get(name)
    }

    // Rendering.

    /// Renders one field with its label, errors and help text.
    pub fn render_field(&self, field: &FieldConfig) -> String {
        let empty = FieldValue::empty_for(field);
        let state = FieldState {
            value: self.values.get(&field.name).unwrap_or(&empty),
            previews: self.previews.get(&field.name),
            calendar: self.calendars.get(&field.name),
        };
        let errors = self.errors.get(&field.name).map(Vec::as_slice).unwrap_or_default();
        render_bootstrap_field(field, &state, errors)
    }

    /// Renders the complete form as Bootstrap 5 HTML.
    ///
    /// The submit button is disabled while submitting; `cancel_href` is the
    /// target of the cancel link.
    pub fn render(&self, action: &str, method: &str, cancel_href: &str) -> String {
        let mut form = html! {
            form.action(#action).method(#method).class("needs-validation")
        };
        if self.fields.iter().any(|f| f.field_type == FieldType::File) {
            form = form.attr("enctype", "multipart/form-data");
        }

        let form_errors = self.non_field_errors();
        if !form_errors.is_empty() {
            form = form.child::<Div, _>(|d| {
                d.class("alert alert-danger")
                    .attr("role", "alert")
                    .child::<Ul, _>(|ul| {
                        ul.class("mb-0")
                            .children(form_errors.iter(), |e, li: Element<Li>| li.text(e))
                    })
            });
        }

        let fields_html: String = self.fields.iter().map(|f| self.render_field(f)).collect();
        form = form.child::<Div, _>(|d| d.raw(&fields_html));

        let submitting = self.is_submitting();
        form.child::<Div, _>(|d| {
            d.class("d-flex gap-2")
                .child::<Button, _>(|b| {
                    b.attr("type", "submit")
                        .class("btn btn-primary")
                        .when(submitting, |b| b.attr("disabled", "disabled"))
                        .text(if submitting { "Saving..." } else { "Save" })
                })
                .child::<A, _>(|a| {
                    a.attr("href", cancel_href)
                        .class("btn btn-outline-secondary")
                        .text("Cancel")
                })
        })
        .render()
    }
}

/// Renders a field with Bootstrap 5 styling.
pub fn render_bootstrap_field(
    field: &FieldConfig,
    state: &FieldState<'_>,
    errors: &[String],
) -> String {
    let id = format!("id_{}", field.name);

    let mut attrs = WidgetAttrs::new().with("id", &id);
    if !errors.is_empty() {
        attrs.set("class", "is-invalid");
    }
    if field.disabled {
        attrs.set("disabled", "disabled");
    }
    if field.required && field.field_type != FieldType::Checkbox {
        attrs.set("required", "required");
    }

    let widget_html = widget_for(field).render(&field.name, state, &attrs);

    let mut wrapper = html! { div.class("mb-3") };
    if !renders_own_label(field.field_type) {
        let label_text = if field.required {
            format!("{} *", field.label)
        } else {
            field.label.clone()
        };
        let label_el = html! {
            label.for_(#id).class("form-label") { #label_text }
        };
        wrapper = wrapper.raw(label_el.render());
    }

    let help_text = field.help_text.clone();
    wrapper
        .raw(&widget_html)
        .children(errors, |error, div: Element<Div>| {
            div.class("invalid-feedback d-block").text(error)
        })
        .when(help_text.is_some(), |d| {
            d.child::<Div, _>(|h| h.class("form-text").text(help_text.as_deref().unwrap_or("")))
        })
        .render()
}

impl<S: Schema> FormEngine<S> {
    /// Returns the names of fields that currently carry an error, in field
    /// order, followed by [`NON_FIELD_ERRORS`] when whole-form errors exist.
    pub fn fields_with_errors(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .fields
            .iter()
            .filter(|f| self.errors.get(&f.name).is_some())
            .map(|f| f.name.as_str())
            .collect();
        if !self.errors.non_field().is_empty() {
            names.push(NON_FIELD_ERRORS);
        }
        names
    }
}

//! Form widgets for rendering HTML inputs.
//!
//! [`widget_for`] is the single dispatch point from [`FieldType`] to a
//! widget; adding a field type fails to compile until it is handled there.

mod bootstrap;
mod calendar;

pub use bootstrap::{
    BootstrapCheckbox, BootstrapDatePicker, BootstrapFileDrop, BootstrapRadioSelect,
    BootstrapSelect, BootstrapTextInput, BootstrapTextarea,
};
pub use calendar::{month_grid, CalendarState, CALENDAR_KEY, CLOSE_KEY};
pub use fleet_table::html_escape;

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::field::{FieldConfig, FieldType};
use crate::upload::FilePreviews;
use crate::value::FieldValue;

/// Extra attributes the form puts on a widget's input.
#[derive(Debug, Clone, Default)]
pub struct WidgetAttrs {
    /// HTML attributes, kept sorted so output is stable.
    pub attrs: BTreeMap<String, String>,
}

impl WidgetAttrs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an attribute.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attrs.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&String> {
        self.attrs.get(key)
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Renders every attribute except `class` and `id` as ` key="value"` pairs.
    pub fn extra_html(&self) -> String {
        self.attrs
            .iter()
            .filter(|(k, _)| k.as_str() != "class" && k.as_str() != "id")
            .map(|(k, v)| format!(r#" {k}="{}""#, html_escape(v)))
            .collect()
    }

    /// Returns the element id, defaulting to `id_<name>`.
    pub fn id_for(&self, name: &str) -> String {
        self.get("id").cloned().unwrap_or_else(|| format!("id_{name}"))
    }

    /// Returns `base` followed by any extra classes.
    pub fn class_with(&self, base: &str) -> String {
        match self.get("class") {
            Some(extra) if !extra.is_empty() => format!("{base} {extra}"),
            _ => base.to_string(),
        }
    }
}

/// Everything a widget needs to know about the field it renders.
#[derive(Debug, Clone, Copy)]
pub struct FieldState<'a> {
    /// Current value.
    pub value: &'a FieldValue,
    /// Preview state of a file field.
    pub previews: Option<&'a FilePreviews>,
    /// Calendar state of a date field.
    pub calendar: Option<&'a CalendarState>,
}

impl<'a> FieldState<'a> {
    /// State holding only a value.
    pub fn value(value: &'a FieldValue) -> Self {
        Self {
            value,
            previews: None,
            calendar: None,
        }
    }
}

/// Renders the input of one field type.
pub trait Widget: Send + Sync {
    /// Renders the input named `name` for `state`, merging in `attrs`.
    fn render(&self, name: &str, state: &FieldState<'_>, attrs: &WidgetAttrs) -> String;

    /// The `type` attribute of the underlying `<input>`.
    fn input_type(&self) -> &str {
        "text"
    }
}

/// Returns the widget that renders `field`.
pub fn widget_for(field: &FieldConfig) -> Box<dyn Widget> {
    let choices = || {
        field
            .options
            .iter()
            .map(|o| (o.value.clone(), o.label.clone()))
            .collect::<Vec<_>>()
    };

    match field.field_type {
        FieldType::Text => Box::new(text_input(BootstrapTextInput::new(), field)),
        FieldType::Email => Box::new(text_input(BootstrapTextInput::email(), field)),
        FieldType::Password => Box::new(text_input(BootstrapTextInput::password(), field)),
        FieldType::Number => Box::new(text_input(BootstrapTextInput::number(), field)),
        FieldType::Textarea => {
            let mut widget = BootstrapTextarea::new(4);
            widget.placeholder = field.placeholder.clone();
            Box::new(widget)
        }
        FieldType::Select => {
            let mut widget = BootstrapSelect::new(choices());
            if let Some(placeholder) = &field.placeholder {
                widget = widget.placeholder(placeholder.clone());
            }
            Box::new(widget)
        }
        FieldType::Radio => Box::new(BootstrapRadioSelect::new(choices())),
        FieldType::Checkbox => Box::new(BootstrapCheckbox::new().label(field.label.clone())),
        FieldType::Switch => Box::new(BootstrapCheckbox::switch().label(field.label.clone())),
        FieldType::Date => Box::new(BootstrapDatePicker::new(field.placeholder.clone())),
        FieldType::File => Box::new(BootstrapFileDrop::new(field.multiple, field.accept.clone())),
    }
}

fn text_input(widget: BootstrapTextInput, field: &FieldConfig) -> BootstrapTextInput {
    match &field.placeholder {
        Some(placeholder) => widget.placeholder(placeholder.clone()),
        None => widget,
    }
}

/// Returns whether the field renders its own label next to the input.
pub fn renders_own_label(field_type: FieldType) -> bool {
    field_type.is_toggle()
}

/// Formats a date the way the date picker displays it.
pub fn display_date(date: NaiveDate) -> String {
    date.format("%d %b %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widget_attrs() {
        let attrs = WidgetAttrs::new()
            .with("class", "is-invalid")
            .with("id", "vin")
            .with("required", "required");
        assert_eq!(attrs.id_for("x"), "vin");
        assert_eq!(attrs.class_with("form-control"), "form-control is-invalid");
        assert_eq!(attrs.extra_html(), r#" required="required""#);
    }

    #[test]
    fn test_every_field_type_has_a_widget() {
        for ty in FieldType::ALL {
            let mut field = FieldConfig::new("f", "F", ty);
            if ty.is_choice() {
                field = field.option("1", "One");
            }
            let value = FieldValue::empty_for(&field);
            let html = widget_for(&field).render("f", &FieldState::value(&value), &WidgetAttrs::new());
            assert!(html.contains(r#"name="f""#), "{ty} widget lacks a name: {html}");
        }
    }
}

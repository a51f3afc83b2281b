//! Field values and the per-type coercion rules.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{FormError, Result};
use crate::field::{FieldConfig, FieldType};

/// Date format used for raw input and JSON output.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A file chosen through the picker or dropped on a file field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    /// Original file name.
    pub name: String,
    /// MIME type reported by the browser.
    #[serde(rename = "type")]
    pub mime_type: String,
    /// Size in bytes.
    pub size: u64,
    /// File contents; never serialized into form output.
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    /// Creates a file from its contents.
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size: bytes.len() as u64,
            bytes,
        }
    }

    /// Returns whether the file can be previewed as an image.
    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

/// The current value of one field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Value of text-like, select and radio fields.
    Text(String),
    /// Value of checkbox and switch fields.
    Bool(bool),
    /// Value of date fields; `None` until a date is picked.
    Date(Option<NaiveDate>),
    /// Value of a single file field.
    File(Option<UploadedFile>),
    /// Value of a `multiple` file field.
    Files(Vec<UploadedFile>),
}

impl FieldValue {
    /// Returns the empty value for a field.
    pub fn empty_for(field: &FieldConfig) -> Self {
        match field.field_type {
            FieldType::Text
            | FieldType::Email
            | FieldType::Password
            | FieldType::Number
            | FieldType::Textarea
            | FieldType::Select
            | FieldType::Radio => Self::Text(String::new()),
            FieldType::Checkbox | FieldType::Switch => Self::Bool(false),
            FieldType::Date => Self::Date(None),
            FieldType::File if field.multiple => Self::Files(Vec::new()),
            FieldType::File => Self::File(None),
        }
    }

    /// Coerces a raw submitted string into the field's value shape.
    ///
    /// Text-like values pass through untouched. Toggles accept `true`, `on`
    /// and `1`. Dates use `YYYY-MM-DD`; an empty string clears the date.
    /// Files cannot be expressed as raw strings.
    pub fn coerce(field: &FieldConfig, raw: &str) -> Result<Self> {
        match field.field_type {
            FieldType::Text
            | FieldType::Email
            | FieldType::Password
            | FieldType::Number
            | FieldType::Textarea
            | FieldType::Select
            | FieldType::Radio => Ok(Self::Text(raw.to_string())),
            FieldType::Checkbox | FieldType::Switch => Ok(Self::Bool(matches!(
                raw.trim().to_ascii_lowercase().as_str(),
                "true" | "on" | "1"
            ))),
            FieldType::Date => {
                let raw = raw.trim();
                if raw.is_empty() {
                    return Ok(Self::Date(None));
                }
                NaiveDate::parse_from_str(raw, DATE_FORMAT)
                    .map(|d| Self::Date(Some(d)))
                    .map_err(|_| FormError::InvalidValue {
                        field: field.name.clone(),
                        message: format!("expected a date as YYYY-MM-DD, got {raw:?}"),
                    })
            }
            FieldType::File => Err(FormError::InvalidValue {
                field: field.name.clone(),
                message: "file fields take uploaded files, not text".to_string(),
            }),
        }
    }

    /// Returns whether this value has the shape the field expects.
    pub fn fits(&self, field: &FieldConfig) -> bool {
        match (self, field.field_type) {
            (Self::Text(_), ty) => ty.is_text_like(),
            (Self::Bool(_), ty) => ty.is_toggle(),
            (Self::Date(_), FieldType::Date) => true,
            (Self::File(_), FieldType::File) => !field.multiple,
            (Self::Files(_), FieldType::File) => field.multiple,
            _ => false,
        }
    }

    /// Returns whether the value counts as "not filled in".
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.trim().is_empty(),
            Self::Bool(b) => !b,
            Self::Date(d) => d.is_none(),
            Self::File(f) => f.is_none(),
            Self::Files(files) => files.is_empty(),
        }
    }

    /// Returns the text of a text-like value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the boolean of a toggle value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the date of a date value.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => *d,
            _ => None,
        }
    }

    /// Returns the files held by a file value, whatever its arity.
    pub fn files(&self) -> &[UploadedFile] {
        match self {
            Self::File(Some(file)) => std::slice::from_ref(file),
            Self::Files(files) => files,
            _ => &[],
        }
    }

    /// Renders the value the way it appears in an input's `value` attribute.
    pub fn display(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Bool(b) => b.to_string(),
            Self::Date(Some(d)) => d.format(DATE_FORMAT).to_string(),
            Self::Date(None) => String::new(),
            Self::File(Some(f)) => f.name.clone(),
            Self::File(None) => String::new(),
            Self::Files(files) => files
                .iter()
                .map(|f| f.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    /// Converts the value to JSON.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(s) => Value::String(s.clone()),
            Self::Bool(b) => Value::Bool(*b),
            Self::Date(Some(d)) => Value::String(d.format(DATE_FORMAT).to_string()),
            Self::Date(None) => Value::Null,
            Self::File(Some(f)) => serde_json::to_value(f).unwrap_or(Value::Null),
            Self::File(None) => Value::Null,
            Self::Files(files) => Value::Array(
                files
                    .iter()
                    .filter_map(|f| serde_json::to_value(f).ok())
                    .collect(),
            ),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(d: NaiveDate) -> Self {
        Self::Date(Some(d))
    }
}

/// The value map of a form, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormValues {
    values: HashMap<String, FieldValue>,
}

impl FormValues {
    /// Creates an empty value map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.values.insert(name.into(), value.into());
    }

    /// Builder method to set a value.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Gets a value.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    /// Gets a mutable value.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut FieldValue> {
        self.values.get_mut(name)
    }

    /// Returns the text of a text-like field.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FieldValue::as_text)
    }

    /// Returns whether a value is present for `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Returns the number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns whether there are no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Converts the map to a JSON object.
    pub fn to_json(&self) -> Value {
        let object: Map<String, Value> = self
            .values
            .iter()
            .map(|(name, value)| (name.clone(), value.to_json()))
            .collect();
        Value::Object(object)
    }
}

impl FromIterator<(String, FieldValue)> for FormValues {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(ty: FieldType) -> FieldConfig {
        FieldConfig::new("f", "F", ty)
    }

    #[test]
    fn test_text_like_passthrough() {
        let value = FieldValue::coerce(&field(FieldType::Number), " 42 ").unwrap();
        assert_eq!(value, FieldValue::Text(" 42 ".to_string()));
    }

    #[test]
    fn test_toggle_coercion() {
        let checkbox = field(FieldType::Checkbox);
        assert_eq!(FieldValue::coerce(&checkbox, "on").unwrap(), FieldValue::Bool(true));
        assert_eq!(FieldValue::coerce(&checkbox, "TRUE").unwrap(), FieldValue::Bool(true));
        assert_eq!(FieldValue::coerce(&checkbox, "").unwrap(), FieldValue::Bool(false));
        assert_eq!(FieldValue::empty_for(&checkbox), FieldValue::Bool(false));
    }

    #[test]
    fn test_date_coercion() {
        let date = field(FieldType::Date);
        let value = FieldValue::coerce(&date, "2024-03-01").unwrap();
        assert_eq!(value.as_date(), NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(FieldValue::coerce(&date, "").unwrap(), FieldValue::Date(None));
        assert!(FieldValue::coerce(&date, "01/03/2024").is_err());
    }

    #[test]
    fn test_file_arity_follows_multiple() {
        let single = field(FieldType::File);
        let multiple = field(FieldType::File).multiple();
        assert_eq!(FieldValue::empty_for(&single), FieldValue::File(None));
        assert_eq!(FieldValue::empty_for(&multiple), FieldValue::Files(Vec::new()));
        assert!(!FieldValue::Files(Vec::new()).fits(&single));
        assert!(FieldValue::Files(Vec::new()).fits(&multiple));
        assert!(FieldValue::coerce(&single, "x.png").is_err());
    }

    #[test]
    fn test_to_json() {
        let photo = UploadedFile::new("van.png", "image/png", vec![1, 2, 3]);
        let values = FormValues::new()
            .with("name", "Al")
            .with("active", true)
            .with("photos", FieldValue::Files(vec![photo]))
            .with("expires", FieldValue::Date(None));

        let json = values.to_json();
        assert_eq!(json["name"], "Al");
        assert_eq!(json["active"], true);
        assert_eq!(json["photos"][0]["name"], "van.png");
        assert_eq!(json["photos"][0]["type"], "image/png");
        assert_eq!(json["photos"][0]["size"], 3);
        assert!(json["expires"].is_null());
    }
}

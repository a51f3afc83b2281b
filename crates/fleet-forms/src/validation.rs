//! Per-field validators.
//!
//! Validators see the typed [`FieldValue`]. Text validators skip empty
//! values so that optional fields stay optional; emptiness is the job of
//! [`RequiredValidator`].

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::value::FieldValue;

static EMAIL_RE: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$"));

fn looks_like_email(text: &str) -> bool {
    EMAIL_RE.as_ref().is_ok_and(|re| re.is_match(text))
}

/// A check on one field's value, run at submit time.
pub trait Validator: Send + Sync {
    /// Returns the message to show under the field when `value` fails.
    fn validate(&self, value: &FieldValue) -> Result<(), String>;
}

/// Returns the non-empty text of a value, if it has any.
fn filled_text(value: &FieldValue) -> Option<&str> {
    value.as_text().filter(|s| !s.trim().is_empty())
}

/// Refuses empty text, unset dates, unchecked toggles and missing files.
#[derive(Debug, Clone)]
pub struct RequiredValidator {
    message: String,
}

impl RequiredValidator {
    pub fn new() -> Self {
        Self::with_message("This field is required.")
    }

    /// Reports `message` instead of the default.
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Default for RequiredValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator for RequiredValidator {
    fn validate(&self, value: &FieldValue) -> Result<(), String> {
        if value.is_empty() {
            Err(self.message.clone())
        } else {
            Ok(())
        }
    }
}

/// Validator that enforces a maximum length in characters.
#[derive(Debug, Clone)]
pub struct MaxLengthValidator {
    max_length: usize,
    message: String,
}

impl MaxLengthValidator {
    pub fn new(max_length: usize) -> Self {
        Self {
            max_length,
            message: format!("Ensure this value has at most {max_length} characters."),
        }
    }
}

impl Validator for MaxLengthValidator {
    fn validate(&self, value: &FieldValue) -> Result<(), String> {
        match filled_text(value) {
            Some(text) if text.chars().count() > self.max_length => Err(self.message.clone()),
            _ => Ok(()),
        }
    }
}

/// Validator that enforces a minimum length in characters.
#[derive(Debug, Clone)]
pub struct MinLengthValidator {
    min_length: usize,
    message: String,
}

impl MinLengthValidator {
    pub fn new(min_length: usize) -> Self {
        Self::with_message(
            min_length,
            format!("Ensure this value has at least {min_length} characters."),
        )
    }

    pub fn with_message(min_length: usize, message: impl Into<String>) -> Self {
        Self {
            min_length,
            message: message.into(),
        }
    }
}

impl Validator for MinLengthValidator {
    fn validate(&self, value: &FieldValue) -> Result<(), String> {
        match filled_text(value) {
            Some(text) if text.chars().count() < self.min_length => Err(self.message.clone()),
            _ => Ok(()),
        }
    }
}

/// Loose `local@domain.tld` check.
#[derive(Debug, Clone)]
pub struct EmailValidator {
    message: String,
}

impl EmailValidator {
    pub fn new() -> Self {
        Self {
            message: "Enter a valid email address.".to_string(),
        }
    }
}

impl Default for EmailValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator for EmailValidator {
    fn validate(&self, value: &FieldValue) -> Result<(), String> {
        match filled_text(value) {
            Some(text) if !looks_like_email(text.trim()) => Err(self.message.clone()),
            _ => Ok(()),
        }
    }
}

/// Accepts `http://` and `https://` URLs.
#[derive(Debug, Clone)]
pub struct UrlValidator {
    message: String,
}

impl UrlValidator {
    pub fn new() -> Self {
        Self {
            message: "Enter a valid URL.".to_string(),
        }
    }
}

impl Default for UrlValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator for UrlValidator {
    fn validate(&self, value: &FieldValue) -> Result<(), String> {
        match filled_text(value) {
            Some(text) if !(text.starts_with("http://") || text.starts_with("https://")) => {
                Err(self.message.clone())
            }
            _ => Ok(()),
        }
    }
}

/// Validator using a custom regex pattern.
#[derive(Debug, Clone)]
pub struct RegexValidator {
    pattern: Regex,
    message: String,
}

impl RegexValidator {
    /// Compiles `pattern`.
    pub fn new(pattern: &str, message: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            message: message.into(),
        })
    }
}

impl Validator for RegexValidator {
    fn validate(&self, value: &FieldValue) -> Result<(), String> {
        match filled_text(value) {
            Some(text) if !self.pattern.is_match(text) => Err(self.message.clone()),
            _ => Ok(()),
        }
    }
}

/// Validator for a numeric range on number fields.
#[derive(Debug, Clone)]
pub struct RangeValidator {
    min: Option<f64>,
    max: Option<f64>,
    message: String,
}

impl RangeValidator {
    /// Either bound may be open.
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        let message = match (min, max) {
            (Some(min), Some(max)) => format!("Value must be between {min} and {max}."),
            (Some(min), None) => format!("Value must be at least {min}."),
            (None, Some(max)) => format!("Value must be at most {max}."),
            (None, None) => "Invalid value.".to_string(),
        };
        Self { min, max, message }
    }
}

impl Validator for RangeValidator {
    fn validate(&self, value: &FieldValue) -> Result<(), String> {
        let Some(text) = filled_text(value) else {
            return Ok(());
        };
        let num: f64 = text
            .trim()
            .parse()
            .ok()
            .filter(|n: &f64| n.is_finite())
            .ok_or_else(|| "Enter a valid number.".to_string())?;

        if self.min.is_some_and(|min| num < min) || self.max.is_some_and(|max| num > max) {
            return Err(self.message.clone());
        }
        Ok(())
    }
}

/// Validator bounding a date field, e.g. an expiry that must lie ahead.
#[derive(Debug, Clone)]
pub struct DateRangeValidator {
    not_before: Option<NaiveDate>,
    not_after: Option<NaiveDate>,
    message: String,
}

impl DateRangeValidator {
    pub fn new(not_before: Option<NaiveDate>, not_after: Option<NaiveDate>) -> Self {
        let message = match (not_before, not_after) {
            (Some(a), Some(b)) => format!("Date must be between {a} and {b}."),
            (Some(a), None) => format!("Date must be on or after {a}."),
            (None, Some(b)) => format!("Date must be on or before {b}."),
            (None, None) => "Invalid date.".to_string(),
        };
        Self {
            not_before,
            not_after,
            message,
        }
    }
}

impl Validator for DateRangeValidator {
    fn validate(&self, value: &FieldValue) -> Result<(), String> {
        let Some(date) = value.as_date() else {
            return Ok(());
        };
        if self.not_before.is_some_and(|min| date < min)
            || self.not_after.is_some_and(|max| date > max)
        {
            return Err(self.message.clone());
        }
        Ok(())
    }
}

/// Validator capping the number of files on a `multiple` file field.
#[derive(Debug, Clone)]
pub struct MaxFilesValidator {
    max_files: usize,
    message: String,
}

impl MaxFilesValidator {
    pub fn new(max_files: usize) -> Self {
        Self {
            max_files,
            message: format!("Upload at most {max_files} files."),
        }
    }
}

impl Validator for MaxFilesValidator {
    fn validate(&self, value: &FieldValue) -> Result<(), String> {
        if value.files().len() > self.max_files {
            Err(self.message.clone())
        } else {
            Ok(())
        }
    }
}

/// Validator restricting uploaded files to MIME types with a given prefix.
#[derive(Debug, Clone)]
pub struct FileTypeValidator {
    prefixes: Vec<String>,
    message: String,
}

impl FileTypeValidator {
    /// Creates a validator accepting MIME types starting with any prefix,
    /// e.g. `["image/", "application/pdf"]`.
    pub fn new(prefixes: &[&str]) -> Self {
        Self {
            prefixes: prefixes.iter().map(|s| (*s).to_string()).collect(),
            message: format!("Allowed file types: {}.", prefixes.join(", ")),
        }
    }
}

impl Validator for FileTypeValidator {
    fn validate(&self, value: &FieldValue) -> Result<(), String> {
        let rejected = value.files().iter().any(|f| {
            !self
                .prefixes
                .iter()
                .any(|p| f.mime_type.starts_with(p.as_str()))
        });
        if rejected {
            Err(self.message.clone())
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::UploadedFile;

    fn text(s: &str) -> FieldValue {
        FieldValue::Text(s.to_string())
    }

    #[test]
    fn test_required_validator() {
        let v = RequiredValidator::new();
        assert!(v.validate(&text("hello")).is_ok());
        assert!(v.validate(&text("")).is_err());
        assert!(v.validate(&text("   ")).is_err());
        assert!(v.validate(&FieldValue::Bool(false)).is_err());
        assert!(v.validate(&FieldValue::Date(None)).is_err());
    }

    #[test]
    fn test_length_validators() {
        let max = MaxLengthValidator::new(5);
        assert!(max.validate(&text("hello")).is_ok());
        assert!(max.validate(&text("hello world")).is_err());

        let min = MinLengthValidator::new(2);
        assert!(min.validate(&text("Al")).is_ok());
        assert!(min.validate(&text("A")).is_err());
        // Optional fields stay optional.
        assert!(min.validate(&text("")).is_ok());
        assert!(min.validate(&text("   ")).is_ok());
    }

    #[test]
    fn test_email_validator() {
        let v = EmailValidator::new();
        assert!(v.validate(&text("fleet@example.com")).is_ok());
        assert!(v.validate(&text("ops.team@depot.co.uk")).is_ok());
        assert!(v.validate(&text("invalid")).is_err());
        assert!(v.validate(&text("@example.com")).is_err());
        assert!(v.validate(&text("")).is_ok());
    }

    #[test]
    fn test_url_validator() {
        let v = UrlValidator::new();
        assert!(v.validate(&text("https://example.com")).is_ok());
        assert!(v.validate(&text("example.com")).is_err());
    }

    #[test]
    fn test_regex_validator() {
        let v = RegexValidator::new(r"^[A-Z]{2}\d{2} ?[A-Z]{3}$", "Enter a valid registration.")
            .unwrap();
        assert!(v.validate(&text("AB12 CDE")).is_ok());
        assert!(v.validate(&text("not a plate")).is_err());
    }

    #[test]
    fn test_range_validator() {
        let v = RangeValidator::new(Some(0.0), Some(100.0));
        assert!(v.validate(&text("50")).is_ok());
        assert!(v.validate(&text("100")).is_ok());
        assert!(v.validate(&text("-1")).is_err());
        assert!(v.validate(&text("abc")).is_err());
        assert!(v.validate(&text("NaN")).is_err());
    }

    #[test]
    fn test_date_range_validator() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let v = DateRangeValidator::new(Some(today), None);
        assert!(v.validate(&FieldValue::Date(Some(today))).is_ok());
        assert!(v
            .validate(&FieldValue::Date(NaiveDate::from_ymd_opt(2024, 5, 31)))
            .is_err());
        assert!(v.validate(&FieldValue::Date(None)).is_ok());
    }

    #[test]
    fn test_file_validators() {
        let photo = UploadedFile::new("van.png", "image/png", vec![0; 4]);
        let sheet = UploadedFile::new("log.csv", "text/csv", vec![0; 4]);
        let files = FieldValue::Files(vec![photo.clone(), sheet]);

        assert!(MaxFilesValidator::new(1).validate(&files).is_err());
        assert!(MaxFilesValidator::new(2).validate(&files).is_ok());

        let images = FileTypeValidator::new(&["image/"]);
        assert!(images.validate(&files).is_err());
        assert!(images.validate(&FieldValue::File(Some(photo))).is_ok());
    }
}

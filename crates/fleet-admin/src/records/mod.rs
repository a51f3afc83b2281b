//! The fleet record catalog.
//!
//! Each record type says which collection it lives in, which form creates
//! it and which table lists it. Records are plain serde structs; the form's
//! validated output deserializes straight into them.

mod driver;
mod subcontractor;
mod subscription;
mod training;
mod vehicle;
mod working_time;

pub use driver::Driver;
pub use subcontractor::Subcontractor;
pub use subscription::Subscription;
pub use training::TrainingRecord;
pub use vehicle::Vehicle;
pub use working_time::WorkingTimeRecord;

use std::fmt::{self, Display};
use std::str::FromStr;

use chrono::{Local, NaiveDate};
use fleet_forms::{FieldConfig, FieldRules, FieldValue, Typed};
use fleet_table::{html_escape, Column, Row};
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};

use crate::error::{AdminError, Result};

/// Collections of the record catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Collection {
    /// Vehicles.
    Vehicles,
    /// Drivers.
    Drivers,
    /// Training records.
    Training,
    /// Subcontractors.
    Subcontractors,
    /// Working-time-directive records.
    WorkingTime,
    /// Subscriptions.
    Subscriptions,
}

impl Collection {
    /// Every collection, in navigation order.
    pub const ALL: [Collection; 6] = [
        Self::Vehicles,
        Self::Drivers,
        Self::Training,
        Self::Subcontractors,
        Self::WorkingTime,
        Self::Subscriptions,
    ];

    /// Returns the URL slug, which is also the storage collection name and
    /// the navigation id.
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Vehicles => "vehicles",
            Self::Drivers => "drivers",
            Self::Training => "training",
            Self::Subcontractors => "subcontractors",
            Self::WorkingTime => "working-time",
            Self::Subscriptions => "subscriptions",
        }
    }

    /// Looks a collection up by slug.
    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.slug() == slug)
    }

    /// Returns the list page path.
    pub fn list_url(&self) -> String {
        format!("/{}/", self.slug())
    }

    /// Returns the add page path.
    pub fn add_url(&self) -> String {
        format!("/{}/add/", self.slug())
    }
}

impl Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Collection {
    type Err = AdminError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_slug(s).ok_or_else(|| AdminError::UnknownCollection(s.to_string()))
    }
}

/// A record type of the catalog.
pub trait Resource: Serialize + DeserializeOwned + Row + Send + Sync + 'static {
    /// Where records of this type are stored.
    const COLLECTION: Collection;
    /// Singular display name.
    const TITLE: &'static str;
    /// Plural display name.
    const TITLE_PLURAL: &'static str;

    /// Fields of the form that creates a record.
    fn form_fields() -> fleet_forms::Result<Vec<FieldConfig>>;

    /// Columns of the list table.
    fn columns() -> Vec<Column<Self>>;

    /// Rules beyond the fields' own validators.
    fn rules() -> FieldRules {
        FieldRules::new()
    }

    /// The schema the form validates against.
    fn schema() -> Typed<FieldRules, Self> {
        Typed::new(Self::rules())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Loose<T> {
    Value(T),
    Text(String),
}

/// Reads an optional number that may arrive as JSON number or as form text.
/// Blank text reads as absent.
pub(crate) fn optional_number<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: Display,
{
    match Option::<Loose<T>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Loose::Value(v)) => Ok(Some(v)),
        Some(Loose::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Loose::Text(s)) => s.trim().parse().map(Some).map_err(de::Error::custom),
    }
}

/// Runs `$body` with `$T` bound to the record type stored in `$collection`.
///
/// ```ignore
/// let html = with_resource!(collection, R => list_view::<R>(ctx, &req, &flags).await);
/// ```
#[macro_export]
macro_rules! with_resource {
    ($collection:expr, $T:ident => $body:expr) => {
        match $collection {
            $crate::records::Collection::Vehicles => {
                type $T = $crate::records::Vehicle;
                $body
            }
            $crate::records::Collection::Drivers => {
                type $T = $crate::records::Driver;
                $body
            }
            $crate::records::Collection::Training => {
                type $T = $crate::records::TrainingRecord;
                $body
            }
            $crate::records::Collection::Subcontractors => {
                type $T = $crate::records::Subcontractor;
                $body
            }
            $crate::records::Collection::WorkingTime => {
                type $T = $crate::records::WorkingTimeRecord;
                $body
            }
            $crate::records::Collection::Subscriptions => {
                type $T = $crate::records::Subscription;
                $body
            }
        }
    };
}

/// Field rule for counts: blank, or a non-negative whole number.
pub(crate) fn whole_number(value: &FieldValue) -> std::result::Result<(), String> {
    match value.as_text().map(str::trim) {
        Some(text) if !text.is_empty() && text.parse::<u32>().is_err() => {
            Err("Enter a whole number.".to_string())
        }
        _ => Ok(()),
    }
}

/// Formats an optional date as `YYYY-MM-DD`, or blank.
pub(crate) fn date_cell(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format(fleet_forms::DATE_FORMAT).to_string())
        .unwrap_or_default()
}

/// Formats an optional number, or blank.
pub(crate) fn number_cell<T: Display>(n: Option<T>) -> String {
    n.map(|n| n.to_string()).unwrap_or_default()
}

/// Days before expiry at which a date is flagged as due soon.
pub const DUE_SOON_DAYS: i64 = 30;

/// Renders an expiry date, coloured by how close it is to `today`.
pub fn expiry_badge(date: Option<NaiveDate>, today: NaiveDate) -> String {
    let Some(date) = date else {
        return r#"<span class="text-muted">&mdash;</span>"#.to_string();
    };
    let text = html_escape(&date.format("%d %b %Y").to_string());
    let days = (date - today).num_days();
    if days < 0 {
        format!(r#"<span class="badge text-bg-danger">{text}</span>"#)
    } else if days <= DUE_SOON_DAYS {
        format!(r#"<span class="badge text-bg-warning">{text}</span>"#)
    } else {
        text
    }
}

/// [`expiry_badge`] against the local date.
pub(crate) fn expiry_badge_today(date: Option<NaiveDate>) -> String {
    expiry_badge(date, Local::now().date_naive())
}

/// Renders a yes/no flag.
pub(crate) fn yes_no_badge(value: bool) -> String {
    if value {
        r#"<span class="badge text-bg-success">Yes</span>"#.to_string()
    } else {
        r#"<span class="badge text-bg-secondary">No</span>"#.to_string()
    }
}

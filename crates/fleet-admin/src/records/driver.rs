//! Drivers.

use chrono::NaiveDate;
use fleet_forms::fields::{char_field, date_field, email_field, radio_field, switch_field};
use fleet_forms::{FieldConfig, FieldRules, FormBuilder};
use fleet_table::{html_escape, Column, Row};
use serde::{Deserialize, Serialize};

use super::{date_cell, expiry_badge_today, yes_no_badge, Collection, Resource};

/// Licence categories a driver can hold.
pub const LICENCE_CATEGORIES: &[(&str, &str)] = &[
    ("b", "B"),
    ("c1", "C1"),
    ("c", "C"),
    ("ce", "C+E"),
];

/// A driver working under the operator licence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    /// Full name.
    pub full_name: String,
    /// Contact email.
    #[serde(default)]
    pub email: String,
    /// Driving licence number.
    pub licence_number: String,
    /// Highest category held.
    pub licence_category: String,
    /// Licence expiry.
    pub licence_expiry: NaiveDate,
    /// Driver CPC expiry.
    #[serde(default)]
    pub cpc_expiry: Option<NaiveDate>,
    /// Whether the driver is currently employed.
    #[serde(default)]
    pub active: bool,
}

impl Row for Driver {
    fn cell(&self, key: &str) -> Option<String> {
        match key {
            "full_name" => Some(self.full_name.clone()),
            "email" => Some(self.email.clone()),
            "licence_number" => Some(self.licence_number.clone()),
            "licence_category" => Some(
                LICENCE_CATEGORIES
                    .iter()
                    .find(|(v, _)| *v == self.licence_category)
                    .map_or(self.licence_category.clone(), |(_, label)| label.to_string()),
            ),
            "licence_expiry" => Some(date_cell(Some(self.licence_expiry))),
            "cpc_expiry" => Some(date_cell(self.cpc_expiry)),
            "active" => Some(self.active.to_string()),
            _ => None,
        }
    }
}

impl Resource for Driver {
    const COLLECTION: Collection = Collection::Drivers;
    const TITLE: &'static str = "Driver";
    const TITLE_PLURAL: &'static str = "Drivers";

    fn form_fields() -> fleet_forms::Result<Vec<FieldConfig>> {
        FormBuilder::new()
            .field(char_field("full_name", "Full name", 100, true))
            .field(email_field("email", "Email", false))
            .field(
                char_field("licence_number", "Licence number", 16, true)
                    .help_text("The 16 character number on the photocard."),
            )
            .field(radio_field(
                "licence_category",
                "Licence category",
                LICENCE_CATEGORIES.to_vec(),
                true,
            ))
            .field(date_field("licence_expiry", "Licence expiry", true, None, None))
            .field(date_field("cpc_expiry", "CPC expiry", false, None, None))
            .field(switch_field("active", "Currently employed"))
            .build()
    }

    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("full_name", "Name"),
            Column::new("licence_number", "Licence")
                .render(|d: &Driver| format!("<code>{}</code>", html_escape(&d.licence_number))),
            Column::new("licence_category", "Category"),
            Column::new("licence_expiry", "Licence expiry")
                .render(|d: &Driver| expiry_badge_today(Some(d.licence_expiry))),
            Column::new("cpc_expiry", "CPC expiry").render(|d: &Driver| expiry_badge_today(d.cpc_expiry)),
            Column::new("active", "Employed")
                .render(|d: &Driver| yes_no_badge(d.active))
                .not_sortable(),
        ]
    }

    fn rules() -> FieldRules {
        FieldRules::new().rule("licence_number", |value| {
            let number = value.as_text().unwrap_or_default();
            if number.chars().count() == 16 && number.chars().all(|c| c.is_ascii_alphanumeric()) {
                Ok(())
            } else {
                Err("A licence number has 16 letters and digits.".to_string())
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleet_forms::{FormValues, Rejection, Schema};

    fn values(licence: &str) -> FormValues {
        FormValues::new()
            .with("full_name", "Priya Shah")
            .with("licence_number", licence)
            .with("licence_category", "ce")
            .with("licence_expiry", NaiveDate::from_ymd_opt(2031, 7, 4).unwrap())
    }

    #[test]
    fn test_valid_driver() {
        let fields = Driver::form_fields().unwrap();
        let driver = Driver::schema()
            .validate(&values("SHAHP801046PS9AB"), &fields)
            .unwrap();
        assert_eq!(driver.cell("licence_category").as_deref(), Some("C+E"));
        assert_eq!(driver.cpc_expiry, None);
        assert!(!driver.active);
    }

    #[test]
    fn test_short_licence_number() {
        let fields = Driver::form_fields().unwrap();
        let result = Driver::schema().validate(&values("SHAH"), &fields);
        assert!(
            matches!(result, Err(Rejection::Fields(errors)) if errors.get("licence_number").is_some())
        );
    }
}

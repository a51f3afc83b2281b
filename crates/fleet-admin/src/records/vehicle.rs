//! Vehicles.

use chrono::NaiveDate;
use fleet_forms::fields::{char_field, date_field, number_field, select_field, switch_field};
use fleet_forms::{FieldConfig, FieldRules, FormBuilder};
use fleet_table::{html_escape, Column, Row};
use serde::{Deserialize, Serialize};

use super::{
    date_cell, expiry_badge_today, number_cell, optional_number, whole_number, yes_no_badge,
    Collection, Resource,
};

/// Vehicle body types.
pub const VEHICLE_TYPES: &[(&str, &str)] = &[
    ("hgv", "HGV"),
    ("lgv", "LGV"),
    ("van", "Van"),
    ("trailer", "Trailer"),
];

/// A vehicle on the operator licence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    /// Registration mark.
    pub registration: String,
    /// Manufacturer.
    pub make: String,
    /// Model name.
    #[serde(default)]
    pub model: String,
    /// One of [`VEHICLE_TYPES`].
    pub vehicle_type: String,
    /// Number of axles.
    #[serde(default, deserialize_with = "optional_number")]
    pub axles: Option<u32>,
    /// Next MOT due date.
    pub mot_due: NaiveDate,
    /// Road tax renewal date.
    #[serde(default)]
    pub tax_due: Option<NaiveDate>,
    /// Whether the vehicle is in service.
    #[serde(default)]
    pub active: bool,
}

impl Row for Vehicle {
    fn cell(&self, key: &str) -> Option<String> {
        match key {
            "registration" => Some(self.registration.clone()),
            "make" => Some(self.make.clone()),
            "model" => Some(self.model.clone()),
            "vehicle_type" => Some(type_label(&self.vehicle_type).to_string()),
            "axles" => Some(number_cell(self.axles)),
            "mot_due" => Some(date_cell(Some(self.mot_due))),
            "tax_due" => Some(date_cell(self.tax_due)),
            "active" => Some(self.active.to_string()),
            _ => None,
        }
    }
}

fn type_label(value: &str) -> &str {
    VEHICLE_TYPES
        .iter()
        .find(|(v, _)| *v == value)
        .map_or(value, |(_, label)| label)
}

/// Whether `reg` looks like a registration mark: letters and digits, with
/// optional single spaces, 2 to 8 characters without the spaces.
pub fn is_registration(reg: &str) -> bool {
    let compact: String = reg.chars().filter(|c| *c != ' ').collect();
    (2..=8).contains(&compact.len())
        && compact.chars().all(|c| c.is_ascii_alphanumeric())
        && !reg.contains("  ")
        && reg.trim() == reg
}

impl Resource for Vehicle {
    const COLLECTION: Collection = Collection::Vehicles;
    const TITLE: &'static str = "Vehicle";
    const TITLE_PLURAL: &'static str = "Vehicles";

    fn form_fields() -> fleet_forms::Result<Vec<FieldConfig>> {
        FormBuilder::new()
            .field(char_field("registration", "Registration", 10, true).placeholder("AB12 CDE"))
            .field(char_field("make", "Make", 50, true))
            .field(char_field("model", "Model", 50, false))
            .field(select_field(
                "vehicle_type",
                "Type",
                VEHICLE_TYPES.to_vec(),
                Some("Choose a type"),
                true,
            ))
            .field(number_field("axles", "Axles", Some(2.0), Some(10.0)))
            .field(date_field("mot_due", "MOT due", true, None, None))
            .field(date_field("tax_due", "Tax due", false, None, None))
            .field(switch_field("active", "In service"))
            .build()
    }

    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("registration", "Registration")
                .render(|v: &Vehicle| format!("<strong>{}</strong>", html_escape(&v.registration))),
            Column::new("make", "Make"),
            Column::new("model", "Model"),
            Column::new("vehicle_type", "Type"),
            Column::new("mot_due", "MOT due").render(|v: &Vehicle| expiry_badge_today(Some(v.mot_due))),
            Column::new("tax_due", "Tax due").render(|v: &Vehicle| expiry_badge_today(v.tax_due)),
            Column::new("active", "In service")
                .render(|v: &Vehicle| yes_no_badge(v.active))
                .not_sortable(),
        ]
    }

    fn rules() -> FieldRules {
        FieldRules::new()
            .rule("registration", |value| match value.as_text() {
                Some(reg) if is_registration(&reg.to_uppercase()) => Ok(()),
                _ => Err("Enter a registration such as AB12 CDE.".to_string()),
            })
            .rule("axles", whole_number)
    }
}

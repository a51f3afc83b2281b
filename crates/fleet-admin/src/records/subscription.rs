//! Service subscriptions.

use chrono::NaiveDate;
use fleet_forms::fields::{date_field, email_field, number_field, radio_field, switch_field};
use fleet_forms::{FieldConfig, FieldRules, FormBuilder};
use fleet_table::{Column, Row};
use serde::{Deserialize, Serialize};

use super::{
    date_cell, expiry_badge_today, number_cell, optional_number, whole_number, yes_no_badge,
    Collection, Resource,
};

/// Plans on offer.
pub const PLANS: &[(&str, &str)] = &[
    ("starter", "Starter"),
    ("fleet", "Fleet"),
    ("enterprise", "Enterprise"),
];

/// The operator's subscription to the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    /// One of [`PLANS`].
    pub plan: String,
    /// Number of user seats.
    #[serde(default, deserialize_with = "optional_number")]
    pub seats: Option<u32>,
    /// Renewal date.
    pub renews_on: NaiveDate,
    /// Where invoices go.
    pub billing_email: String,
    /// Whether the subscription renews by itself.
    #[serde(default)]
    pub auto_renew: bool,
}

impl Row for Subscription {
    fn cell(&self, key: &str) -> Option<String> {
        match key {
            "plan" => Some(
                PLANS
                    .iter()
                    .find(|(v, _)| *v == self.plan)
                    .map_or(self.plan.clone(), |(_, label)| label.to_string()),
            ),
            "seats" => Some(number_cell(self.seats)),
            "renews_on" => Some(date_cell(Some(self.renews_on))),
            "billing_email" => Some(self.billing_email.clone()),
            "auto_renew" => Some(self.auto_renew.to_string()),
            _ => None,
        }
    }
}

impl Resource for Subscription {
    const COLLECTION: Collection = Collection::Subscriptions;
    const TITLE: &'static str = "Subscription";
    const TITLE_PLURAL: &'static str = "Subscriptions";

    fn form_fields() -> fleet_forms::Result<Vec<FieldConfig>> {
        FormBuilder::new()
            .field(radio_field("plan", "Plan", PLANS.to_vec(), true))
            .field(number_field("seats", "Seats", Some(1.0), Some(500.0)).required())
            .field(date_field("renews_on", "Renews on", true, None, None))
            .field(email_field("billing_email", "Billing email", true))
            .field(switch_field("auto_renew", "Renew automatically"))
            .build()
    }

    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("plan", "Plan"),
            Column::new("seats", "Seats"),
            Column::new("renews_on", "Renews")
                .render(|s: &Subscription| expiry_badge_today(Some(s.renews_on))),
            Column::new("billing_email", "Billing email"),
            Column::new("auto_renew", "Auto-renew")
                .render(|s: &Subscription| yes_no_badge(s.auto_renew))
                .not_sortable(),
        ]
    }

    fn rules() -> FieldRules {
        FieldRules::new().rule("seats", whole_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleet_forms::{FormValues, Schema};

    #[test]
    fn test_subscription_from_form() {
        let fields = Subscription::form_fields().unwrap();
        let values = FormValues::new()
            .with("plan", "fleet")
            .with("seats", "12")
            .with("renews_on", NaiveDate::from_ymd_opt(2026, 4, 1).unwrap())
            .with("billing_email", "accounts@haulco.example")
            .with("auto_renew", true);
        let sub = Subscription::schema().validate(&values, &fields).unwrap();
        assert_eq!(sub.seats, Some(12));
        assert_eq!(sub.cell("plan").as_deref(), Some("Fleet"));
    }

    #[test]
    fn test_fractional_seats_are_rejected() {
        let fields = Subscription::form_fields().unwrap();
        let values = FormValues::new()
            .with("plan", "fleet")
            .with("seats", "2.5")
            .with("renews_on", NaiveDate::from_ymd_opt(2026, 4, 1).unwrap())
            .with("billing_email", "accounts@haulco.example");
        assert!(Subscription::schema().validate(&values, &fields).is_err());
    }
}

//! Subcontracted hauliers.

use chrono::NaiveDate;
use fleet_forms::fields::{char_field, checkbox_field, date_field, email_field, file_field};
use fleet_forms::{FieldConfig, FormBuilder, UploadedFile};
use fleet_table::{Column, Row};
use serde::{Deserialize, Serialize};

use super::{date_cell, expiry_badge_today, yes_no_badge, Collection, Resource};

/// A haulier the operator subcontracts work to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subcontractor {
    /// Registered company name.
    pub company_name: String,
    /// Contact email.
    pub contact_email: String,
    /// Contact phone number.
    #[serde(default)]
    pub phone: String,
    /// Their operator licence number.
    #[serde(default)]
    pub operator_licence: String,
    /// Goods-in-transit insurance expiry.
    pub insurance_expiry: NaiveDate,
    /// Copies of insurance certificates.
    #[serde(default)]
    pub documents: Vec<UploadedFile>,
    /// Whether the subcontractor passed vetting.
    #[serde(default)]
    pub approved: bool,
}

impl Row for Subcontractor {
    fn cell(&self, key: &str) -> Option<String> {
        match key {
            "company_name" => Some(self.company_name.clone()),
            "contact_email" => Some(self.contact_email.clone()),
            "phone" => Some(self.phone.clone()),
            "operator_licence" => Some(self.operator_licence.clone()),
            "insurance_expiry" => Some(date_cell(Some(self.insurance_expiry))),
            "documents" => Some(self.documents.len().to_string()),
            "approved" => Some(self.approved.to_string()),
            _ => None,
        }
    }
}

impl Resource for Subcontractor {
    const COLLECTION: Collection = Collection::Subcontractors;
    const TITLE: &'static str = "Subcontractor";
    const TITLE_PLURAL: &'static str = "Subcontractors";

    fn form_fields() -> fleet_forms::Result<Vec<FieldConfig>> {
        FormBuilder::new()
            .field(char_field("company_name", "Company name", 120, true))
            .field(email_field("contact_email", "Contact email", true))
            .field(char_field("phone", "Phone", 20, false))
            .field(char_field("operator_licence", "Operator licence", 12, false).placeholder("OB1234567"))
            .field(date_field("insurance_expiry", "Insurance expiry", true, None, None))
            .field(
                file_field("documents", "Insurance certificates", true, Some("image/*,application/pdf"), Some(5))
                    .help_text("Photos or PDFs, up to five files."),
            )
            .field(checkbox_field("approved", "Vetting passed", false))
            .build()
    }

    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("company_name", "Company"),
            Column::new("contact_email", "Email"),
            Column::new("operator_licence", "Licence"),
            Column::new("insurance_expiry", "Insurance")
                .render(|s: &Subcontractor| expiry_badge_today(Some(s.insurance_expiry))),
            Column::new("documents", "Documents"),
            Column::new("approved", "Approved")
                .render(|s: &Subcontractor| yes_no_badge(s.approved))
                .not_sortable(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleet_forms::FieldType;

    #[test]
    fn test_documents_field_is_multiple() {
        let fields = Subcontractor::form_fields().unwrap();
        let documents = fields.iter().find(|f| f.name == "documents").unwrap();
        assert_eq!(documents.field_type, FieldType::File);
        assert!(documents.multiple);
    }

    #[test]
    fn test_document_count_sorts_numerically() {
        let sub = Subcontractor {
            company_name: "Northway Haulage".to_string(),
            contact_email: "ops@northway.example".to_string(),
            phone: String::new(),
            operator_licence: "OB1234567".to_string(),
            insurance_expiry: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            documents: vec![UploadedFile::new("cert.pdf", "application/pdf", vec![1, 2])],
            approved: true,
        };
        assert_eq!(sub.cell("documents").as_deref(), Some("1"));
    }
}

//! Supplier records and the codec between form input, storage and export.
//!
//! Every write to a tenant's collection goes through [`SupplierRecord::normalize`],
//! so stored records always have the same shape. Export goes the other way
//! through [`dedupe`] and [`SupplierRecord::to_export_row`].

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Errors that can occur while normalizing supplier input.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// A required field was absent or blank.
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    /// An export row did not have one cell per export column.
    #[error("export row has {found} cells, expected {expected}")]
    RowShape {
        /// Number of export columns.
        expected: usize,
        /// Number of cells supplied.
        found: usize,
    },
}

/// Supplier fields as they arrive from the submission form.
///
/// Field names match the HTML form. Every field is optional here; presence
/// is checked by [`SupplierRecord::normalize`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSupplierFields {
    #[serde(rename = "supplierID", default)]
    pub supplier_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "company_phone_number", default)]
    pub company_phone: Option<String>,
    #[serde(rename = "mobile_phone_number", default)]
    pub mobile_phone: Option<String>,
    #[serde(default)]
    pub core_business: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub postcode: Option<String>,
}

/// A supplier's contact and business details, in canonical form.
///
/// Required fields are trimmed and non-empty. Optional fields are `None`
/// rather than blank strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierRecord {
    pub supplier_id: String,
    pub name: String,
    pub company: String,
    pub email: String,
    pub company_phone: String,
    pub mobile_phone: Option<String>,
    pub core_business: String,
    pub website: Option<String>,
    pub postcode: Option<String>,
}

/// One column of the spreadsheet export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportColumn {
    /// Header text written in the first row.
    pub header: &'static str,
    /// Column width in spreadsheet character units.
    pub width: u16,
}

/// Fixed column schema of the export, in order.
pub const EXPORT_COLUMNS: [ExportColumn; 9] = [
    ExportColumn { header: "Supplier ID", width: 15 },
    ExportColumn { header: "Name", width: 20 },
    ExportColumn { header: "Company", width: 20 },
    ExportColumn { header: "Email", width: 25 },
    ExportColumn { header: "Phone 1", width: 15 },
    ExportColumn { header: "Phone 2", width: 15 },
    ExportColumn { header: "Products", width: 20 },
    ExportColumn { header: "Website", width: 25 },
    ExportColumn { header: "Postal Code", width: 10 },
];

/// One export row; `None` is an empty cell.
pub type ExportRow<'a> = [Option<&'a str>; EXPORT_COLUMNS.len()];

impl SupplierRecord {
    /// Normalize raw form input into a canonical record.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::MissingField` naming the first required field
    /// (in export column order) that is absent or blank.
    pub fn normalize(raw: RawSupplierFields) -> Result<Self, RecordError> {
        Ok(Self {
            supplier_id: required(raw.supplier_id, "supplierID")?,
            name: required(raw.name, "name")?,
            company: required(raw.company, "company")?,
            email: required(raw.email, "email")?,
            company_phone: required(raw.company_phone, "company_phone_number")?,
            mobile_phone: optional(raw.mobile_phone),
            core_business: required(raw.core_business, "core_business")?,
            website: optional(raw.website),
            postcode: optional(raw.postcode),
        })
    }

    /// The logical identity used by [`dedupe`]: supplier ID plus
    /// case-folded email.
    #[must_use]
    pub fn dedupe_key(&self) -> (String, String) {
        (self.supplier_id.clone(), self.email.to_lowercase())
    }

    /// Cells for the spreadsheet export, in [`EXPORT_COLUMNS`] order.
    #[must_use]
    pub fn to_export_row(&self) -> ExportRow<'_> {
        [
            Some(self.supplier_id.as_str()),
            Some(self.name.as_str()),
            Some(self.company.as_str()),
            Some(self.email.as_str()),
            Some(self.company_phone.as_str()),
            self.mobile_phone.as_deref(),
            Some(self.core_business.as_str()),
            self.website.as_deref(),
            self.postcode.as_deref(),
        ]
    }

    /// Rebuild a record from exported cells.
    ///
    /// The cells go through [`SupplierRecord::normalize`], so a row produced
    /// by [`SupplierRecord::to_export_row`] yields the same record back.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::RowShape` if the row does not have one cell per
    /// export column, or `RecordError::MissingField` for blank required cells.
    pub fn from_export_row<S: AsRef<str>>(row: &[Option<S>]) -> Result<Self, RecordError> {
        let [
            supplier_id,
            name,
            company,
            email,
            company_phone,
            mobile_phone,
            core_business,
            website,
            postcode,
        ] = row
        else {
            return Err(RecordError::RowShape {
                expected: EXPORT_COLUMNS.len(),
                found: row.len(),
            });
        };

        let cell = |value: &Option<S>| value.as_ref().map(|s| s.as_ref().to_owned());

        Self::normalize(RawSupplierFields {
            supplier_id: cell(supplier_id),
            name: cell(name),
            company: cell(company),
            email: cell(email),
            company_phone: cell(company_phone),
            mobile_phone: cell(mobile_phone),
            core_business: cell(core_business),
            website: cell(website),
            postcode: cell(postcode),
        })
    }
}

/// Keep one record per distinct (supplier ID, email) pair.
///
/// The first occurrence wins and input order is preserved.
#[must_use]
pub fn dedupe<I>(records: I) -> Vec<SupplierRecord>
where
    I: IntoIterator<Item = SupplierRecord>,
{
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|record| seen.insert(record.dedupe_key()))
        .collect()
}

fn required(value: Option<String>, field: &'static str) -> Result<String, RecordError> {
    optional(value).ok_or(RecordError::MissingField(field))
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn raw() -> RawSupplierFields {
        RawSupplierFields {
            supplier_id: Some("S-001".to_owned()),
            name: Some("Jane Doe".to_owned()),
            company: Some("Doe Fasteners".to_owned()),
            email: Some("jane@doe.example".to_owned()),
            company_phone: Some("0161 496 0000".to_owned()),
            mobile_phone: None,
            core_business: Some("Bolts and rivets".to_owned()),
            website: None,
            postcode: None,
        }
    }

    fn record(id: &str, email: &str, name: &str) -> SupplierRecord {
        SupplierRecord::normalize(RawSupplierFields {
            supplier_id: Some(id.to_owned()),
            email: Some(email.to_owned()),
            name: Some(name.to_owned()),
            ..raw()
        })
        .unwrap()
    }

    #[test]
    fn test_normalize_trims_and_defaults_optionals() {
        let record = SupplierRecord::normalize(RawSupplierFields {
            name: Some("  Jane Doe  ".to_owned()),
            website: Some("   ".to_owned()),
            postcode: Some(" M1 1AA ".to_owned()),
            ..raw()
        })
        .unwrap();

        assert_eq!(record.name, "Jane Doe");
        assert_eq!(record.mobile_phone, None);
        assert_eq!(record.website, None);
        assert_eq!(record.postcode.as_deref(), Some("M1 1AA"));
    }

    #[test]
    fn test_normalize_missing_required_field() {
        let missing = RawSupplierFields {
            core_business: None,
            ..raw()
        };
        assert_eq!(
            SupplierRecord::normalize(missing),
            Err(RecordError::MissingField("core_business"))
        );

        let blank = RawSupplierFields {
            supplier_id: Some("   ".to_owned()),
            ..raw()
        };
        assert_eq!(
            SupplierRecord::normalize(blank),
            Err(RecordError::MissingField("supplierID"))
        );
    }

    #[test]
    fn test_normalize_reports_first_missing_field_in_column_order() {
        assert_eq!(
            SupplierRecord::normalize(RawSupplierFields::default()),
            Err(RecordError::MissingField("supplierID"))
        );
    }

    #[test]
    fn test_raw_fields_use_form_names() {
        let raw: RawSupplierFields = serde_json::from_str(
            r#"{"supplierID":"7","company_phone_number":"123","mobile_phone_number":"456"}"#,
        )
        .unwrap();
        assert_eq!(raw.supplier_id.as_deref(), Some("7"));
        assert_eq!(raw.company_phone.as_deref(), Some("123"));
        assert_eq!(raw.mobile_phone.as_deref(), Some("456"));
        assert!(raw.website.is_none());
    }

    #[test]
    fn test_dedupe_keeps_first_occurrence() {
        let first = record("1", "a@example.com", "Original");
        let duplicate = record("1", "a@example.com", "X");
        let other = record("2", "b@example.com", "Other");

        let result = dedupe(vec![first.clone(), duplicate, other.clone()]);
        assert_eq!(result, vec![first, other]);
    }

    #[test]
    fn test_dedupe_email_case_insensitive() {
        let first = record("1", "a@example.com", "Original");
        let shouting = record("1", "A@EXAMPLE.COM", "Shouting");
        assert_eq!(dedupe(vec![first.clone(), shouting]), vec![first]);
    }

    #[test]
    fn test_dedupe_same_id_different_email_is_distinct() {
        let a = record("1", "a@example.com", "A");
        let b = record("1", "b@example.com", "B");
        assert_eq!(dedupe(vec![a.clone(), b.clone()]), vec![a, b]);
    }

    #[test]
    fn test_dedupe_empty() {
        assert!(dedupe(Vec::new()).is_empty());
    }

    #[test]
    fn test_export_row_matches_columns() {
        let record = SupplierRecord::normalize(RawSupplierFields {
            website: Some("https://doe.example".to_owned()),
            ..raw()
        })
        .unwrap();
        let row = record.to_export_row();

        assert_eq!(row.len(), EXPORT_COLUMNS.len());
        assert_eq!(row[0], Some("S-001"));
        assert_eq!(row[4], Some("0161 496 0000"));
        assert_eq!(row[5], None);
        assert_eq!(row[6], Some("Bolts and rivets"));
        assert_eq!(row[7], Some("https://doe.example"));
        assert_eq!(EXPORT_COLUMNS[7].header, "Website");
    }

    #[test]
    fn test_export_row_reimports_identically() {
        let original = SupplierRecord::normalize(RawSupplierFields {
            mobile_phone: Some("07700 900000".to_owned()),
            postcode: Some("M1 1AA".to_owned()),
            ..raw()
        })
        .unwrap();

        let cells: Vec<Option<String>> = original
            .to_export_row()
            .iter()
            .map(|cell| cell.map(str::to_owned))
            .collect();
        let reimported = SupplierRecord::from_export_row(cells.as_slice()).unwrap();

        assert_eq!(reimported, original);
    }

    #[test]
    fn test_from_export_row_wrong_shape() {
        let cells = [Some("only"), Some("two")];
        assert_eq!(
            SupplierRecord::from_export_row(&cells),
            Err(RecordError::RowShape {
                expected: 9,
                found: 2
            })
        );
    }
}

//! Field and record validation for imported rows

use serde::Serialize;

use super::parser::CsvRow;
use crate::models::{ErrorCategory, ImportErrorRecord, PropertyInput, PropertyStatus};

/// Columns that must carry a non-blank value
pub const REQUIRED_FIELDS: [(&str, &str); 5] = [
    ("title", "Title"),
    ("status", "Status"),
    ("state", "State"),
    ("municipality", "Municipality"),
    ("patent", "Patent"),
];

/// A single failed rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub row: usize,
    pub field: &'static str,
    pub value: String,
    pub message: String,
}

impl FieldError {
    fn new(row: usize, field: &'static str, value: &str, message: impl Into<String>) -> Self {
        Self {
            row,
            field,
            value: value.to_string(),
            message: message.into(),
        }
    }

    /// Convert into an import error record, snapshotting the row title
    pub fn into_record(self, title: &str) -> ImportErrorRecord {
        ImportErrorRecord {
            row: self.row,
            title: title.to_string(),
            field: self.field.to_string(),
            value: self.value,
            message: self.message,
            category: ErrorCategory::Validation,
        }
    }
}

/// Validate one raw row. An empty result means the row is importable.
pub fn validate_row(row: &CsvRow, row_number: usize) -> Vec<FieldError> {
    let mut errors = Vec::new();

    for (field, label) in REQUIRED_FIELDS {
        if row.get(field).trim().is_empty() {
            errors.push(FieldError::new(
                row_number,
                field,
                row.get(field),
                format!("{} is required", label),
            ));
        }
    }

    let status = row.get("status");
    if !status.trim().is_empty() {
        if let Err(e) = status.parse::<PropertyStatus>() {
            errors.push(FieldError::new(row_number, "status", status, e.to_string()));
        }
    }

    errors.extend(check_price(row.get("price"), row_number));
    errors.extend(check_postal_code(row.get("postal_code"), row_number));
    errors.extend(check_map_url(row.get("google_maps"), row_number));

    errors
}

/// Validate a sequence of rows; the first row is numbered `start_row`
pub fn validate_rows(rows: &[CsvRow], start_row: usize) -> Vec<FieldError> {
    rows.iter()
        .enumerate()
        .flat_map(|(idx, row)| validate_row(row, start_row + idx))
        .collect()
}

/// Record-level invariants for a property about to be created or updated
pub fn validate_input(input: &PropertyInput) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if input.title.trim().is_empty() {
        errors.push(FieldError::new(0, "title", &input.title, "Title is required"));
    }
    if input.patent.trim().is_empty() {
        errors.push(FieldError::new(0, "patent", &input.patent, "Patent is required"));
    }
    if let Some(price) = input.price {
        if !price.is_finite() || price < 0.0 {
            errors.push(FieldError::new(
                0,
                "price",
                &price.to_string(),
                "Price must be a non-negative number",
            ));
        }
    }
    errors.extend(check_postal_code(&input.postal_code, 0));
    if let Some(url) = &input.google_maps {
        errors.extend(check_map_url(url, 0));
    }

    errors
}

fn check_price(value: &str, row: usize) -> Option<FieldError> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    match value.parse::<f64>() {
        Ok(price) if price.is_finite() && price >= 0.0 => None,
        Ok(price) if price.is_finite() => Some(FieldError::new(
            row,
            "price",
            value,
            "Price must be a non-negative number",
        )),
        _ => Some(FieldError::new(row, "price", value, "Price must be a number")),
    }
}

fn check_postal_code(value: &str, row: usize) -> Option<FieldError> {
    let value = value.trim();
    if value.is_empty() || (value.len() == 5 && value.chars().all(|c| c.is_ascii_digit())) {
        return None;
    }
    Some(FieldError::new(
        row,
        "postal_code",
        value,
        "Postal code must be exactly 5 digits",
    ))
}

fn check_map_url(value: &str, row: usize) -> Option<FieldError> {
    let value = value.trim();
    if value.is_empty() || value.starts_with("http://") || value.starts_with("https://") {
        return None;
    }
    Some(FieldError::new(
        row,
        "google_maps",
        value,
        "Map URL must start with http:// or https://",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> CsvRow {
        let mut row = CsvRow::default();
        for (k, v) in pairs {
            row.set(k, *v);
        }
        row
    }

    fn valid_row() -> CsvRow {
        row(&[
            ("title", "Casa Centro"),
            ("status", "available"),
            ("state", "jalisco"),
            ("municipality", "Guadalajara"),
            ("patent", "P-100"),
        ])
    }

    #[test]
    fn test_valid_row_has_no_errors() {
        assert!(validate_row(&valid_row(), 2).is_empty());
    }

    #[test]
    fn test_missing_required_fields() {
        let errors = validate_row(&row(&[("neighborhood", "Centro")]), 4);
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["title", "status", "state", "municipality", "patent"]);
        assert!(errors.iter().all(|e| e.row == 4));
        assert_eq!(errors[0].message, "Title is required");
    }

    #[test]
    fn test_unknown_status_is_single_error() {
        let mut r = valid_row();
        r.set("status", "leased");
        let errors = validate_row(&r, 3);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "status");
        assert_eq!(errors[0].value, "leased");
    }

    #[test]
    fn test_status_must_match_exactly() {
        let mut r = valid_row();
        r.set("status", "SOLD");
        let errors = validate_row(&r, 2);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "status");

        r.set("status", "sold");
        assert!(validate_row(&r, 2).is_empty());
    }

    #[test]
    fn test_price_rules() {
        let mut r = valid_row();
        r.set("price", "abc");
        assert_eq!(validate_row(&r, 2)[0].message, "Price must be a number");

        r.set("price", "-5");
        assert_eq!(
            validate_row(&r, 2)[0].message,
            "Price must be a non-negative number"
        );

        r.set("price", "1500000.50");
        assert!(validate_row(&r, 2).is_empty());

        r.set("price", "NaN");
        assert_eq!(validate_row(&r, 2).len(), 1);
    }

    #[test]
    fn test_postal_code_and_url() {
        let mut r = valid_row();
        r.set("postal_code", "4410");
        r.set("google_maps", "maps.google.com/?q=1");
        let errors = validate_row(&r, 2);
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["postal_code", "google_maps"]);

        r.set("postal_code", "44100");
        r.set("google_maps", "https://maps.google.com/?q=1");
        assert!(validate_row(&r, 2).is_empty());
    }

    #[test]
    fn test_batch_offsets_row_numbers() {
        let rows = vec![valid_row(), row(&[("title", "Sin datos")]), valid_row()];
        let errors = validate_rows(&rows, 2);
        assert!(!errors.is_empty());
        assert!(errors.iter().all(|e| e.row == 3));
    }

    #[test]
    fn test_validate_input_requires_title_and_patent() {
        let input = PropertyInput {
            price: Some(-1.0),
            postal_code: "123456".to_string(),
            ..PropertyInput::default()
        };
        let fields: Vec<_> = validate_input(&input).iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["title", "patent", "price", "postal_code"]);
    }
}

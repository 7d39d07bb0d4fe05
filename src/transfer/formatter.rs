//! CSV serialization of property records and export file helpers

use chrono::{Local, NaiveDate};
use std::borrow::Cow;

use super::parser::ALLOWED_HEADERS;
use crate::models::labels::state_label;
use crate::models::{ImportErrorRecord, Property};

const UTF8_BOM: &str = "\u{feff}";
const EXPORT_PREFIX: &str = "properties";

/// A column in an export: record key plus header text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub key: &'static str,
    pub label: &'static str,
}

impl Column {
    pub const fn new(key: &'static str, label: &'static str) -> Self {
        Self { key, label }
    }
}

/// Columns of the dashboard export
pub const EXPORT_COLUMNS: &[Column] = &[
    Column::new("id", "ID"),
    Column::new("title", "Título"),
    Column::new("status", "Estado de la propiedad"),
    Column::new("state", "Estado"),
    Column::new("municipality", "Municipio"),
    Column::new("neighborhood", "Colonia"),
    Column::new("postal_code", "Código postal"),
    Column::new("street", "Calle"),
    Column::new("patent", "Patente"),
    Column::new("price", "Precio"),
    Column::new("google_maps", "Google Maps"),
    Column::new("description", "Descripción"),
    Column::new("created_at", "Fecha de creación"),
];

/// Columns whose header text is the import key itself, so the output can be
/// fed straight back into an import
pub const IMPORT_COLUMNS: &[Column] = &[
    Column::new("title", "title"),
    Column::new("status", "status"),
    Column::new("state", "state"),
    Column::new("municipality", "municipality"),
    Column::new("neighborhood", "neighborhood"),
    Column::new("postal_code", "postal_code"),
    Column::new("street", "street"),
    Column::new("patent", "patent"),
    Column::new("price", "price"),
    Column::new("google_maps", "google_maps"),
    Column::new("description", "description"),
];

const TEMPLATE_EXAMPLE: [&str; 11] = [
    "Casa en Providencia",
    "available",
    "jalisco",
    "Guadalajara",
    "Providencia",
    "44630",
    "Av. Pablo Neruda 2345",
    "PAT-001",
    "3500000",
    "https://maps.google.com/?q=20.6866,-103.3875",
    "Casa de 3 recámaras, 2 baños, jardín",
];

/// Quote a field if and only if it contains a comma, a quote or a newline
pub fn escape_csv(value: &str) -> Cow<'_, str> {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

/// Render one field of a record for export
pub fn format_field(property: &Property, key: &str) -> String {
    match key {
        "id" => property.id.to_string(),
        "title" => property.title.clone(),
        "status" => property.status.label().to_string(),
        "state" => state_label(&property.state)
            .map(str::to_string)
            .unwrap_or_else(|| property.state.clone()),
        "municipality" => property.municipality.clone(),
        "neighborhood" => property.neighborhood.clone(),
        "postal_code" => property.postal_code.clone(),
        "street" => property.street.clone(),
        "patent" => property.patent.clone(),
        "price" => format_price(property.price),
        "google_maps" => property.google_maps.clone().unwrap_or_default(),
        "description" => property.description.clone(),
        "attachment_id" => property
            .attachment_id
            .map(|id| id.to_string())
            .unwrap_or_default(),
        "created_at" => property
            .created_at
            .map(|ts| ts.with_timezone(&Local).format("%d/%m/%Y").to_string())
            .unwrap_or_default(),
        _ => String::new(),
    }
}

fn format_price(price: Option<f64>) -> String {
    match price {
        Some(p) if p.fract() == 0.0 => format!("{:.0}", p),
        Some(p) => p.to_string(),
        None => "0".to_string(),
    }
}

/// Serialize records to CSV text: a header row, then one line per record
pub fn to_csv(records: &[Property], columns: &[Column]) -> String {
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(
        columns
            .iter()
            .map(|c| escape_csv(c.label).into_owned())
            .collect::<Vec<_>>()
            .join(","),
    );
    for property in records {
        lines.push(
            columns
                .iter()
                .map(|c| escape_csv(&format_field(property, c.key)).into_owned())
                .collect::<Vec<_>>()
                .join(","),
        );
    }
    lines.join("\n")
}

/// Export filename: prefix, optional `_<field>_<value>` for an active
/// filter, then the date; slugified.
pub fn export_filename(active_filter: Option<(&str, &str)>, date: NaiveDate) -> String {
    let suffix = active_filter
        .map(|(field, value)| format!("_{}_{}", field, value))
        .unwrap_or_default();
    slugify(&format!(
        "{}{}_{}.csv",
        EXPORT_PREFIX,
        suffix,
        date.format("%Y-%m-%d")
    ))
}

/// Lowercase and replace anything outside `[a-z0-9_.-]` with underscores
pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '_' | '.' | '-' => c,
            _ => '_',
        })
        .collect()
}

/// Prepend a UTF-8 byte-order mark so spreadsheets detect the encoding
pub fn with_bom(content: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(UTF8_BOM.len() + content.len());
    bytes.extend_from_slice(UTF8_BOM.as_bytes());
    bytes.extend_from_slice(content.as_bytes());
    bytes
}

/// The import template: header line plus one example row
pub fn template_csv() -> String {
    let example: Vec<_> = TEMPLATE_EXAMPLE
        .iter()
        .map(|v| escape_csv(v).into_owned())
        .collect();
    format!("{}\n{}\n", ALLOWED_HEADERS.join(","), example.join(","))
}

/// Downloadable report of import errors
pub fn error_report_csv(errors: &[ImportErrorRecord]) -> String {
    let mut lines = vec!["row,title,field,value,message,type".to_string()];
    for e in errors {
        let row = e.row.to_string();
        let fields = [
            row.as_str(),
            e.title.as_str(),
            e.field.as_str(),
            e.value.as_str(),
            e.message.as_str(),
            e.category.as_str(),
        ];
        lines.push(
            fields
                .iter()
                .map(|f| escape_csv(f).into_owned())
                .collect::<Vec<_>>()
                .join(","),
        );
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ErrorCategory, PropertyStatus};

    fn property() -> Property {
        Property {
            id: 42,
            title: "Casa, \"grande\"".to_string(),
            status: PropertyStatus::Rented,
            state: "nuevo_leon".to_string(),
            municipality: "Monterrey".to_string(),
            neighborhood: "Centro".to_string(),
            postal_code: "64000".to_string(),
            street: "Morelos 1".to_string(),
            patent: "P-9".to_string(),
            price: None,
            description: "linea 1\nlinea 2".to_string(),
            google_maps: None,
            attachment_id: None,
            created_by: Some(1),
            created_at: None,
            updated_by: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("simple"), "simple");
        assert_eq!(escape_csv("with,comma"), "\"with,comma\"");
        assert_eq!(escape_csv("with\"quote"), "\"with\"\"quote\"");
        assert_eq!(escape_csv("with\nnewline"), "\"with\nnewline\"");
        assert_eq!(escape_csv("tab\there\r"), "tab\there\r");
        assert_eq!(escape_csv("Casa, \"grande\""), "\"Casa, \"\"grande\"\"\"");
    }

    #[test]
    fn test_format_field_labels_and_defaults() {
        let p = property();
        assert_eq!(format_field(&p, "status"), "Rentada");
        assert_eq!(format_field(&p, "state"), "Nuevo León");
        assert_eq!(format_field(&p, "price"), "0");
        assert_eq!(format_field(&p, "google_maps"), "");
        assert_eq!(format_field(&p, "created_at"), "");
        assert_eq!(format_field(&p, "unknown"), "");
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(Some(3_500_000.0)), "3500000");
        assert_eq!(format_price(Some(99.5)), "99.5");
    }

    #[test]
    fn test_to_csv_header_and_rows() {
        let csv = to_csv(&[property()], &EXPORT_COLUMNS[..3]);
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("ID,Título,Estado de la propiedad"));
        assert_eq!(lines.next(), Some("42,\"Casa, \"\"grande\"\"\",Rentada"));
    }

    #[test]
    fn test_export_filename() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(export_filename(None, date), "properties_2024-03-09.csv");
        assert_eq!(
            export_filename(Some(("patent", "Lic. Pérez")), date),
            "properties_patent_lic._p_rez_2024-03-09.csv"
        );
    }

    #[test]
    fn test_with_bom() {
        let bytes = with_bom("a,b");
        assert_eq!(&bytes[..3], &[0xEF, 0xBB, 0xBF]);
        assert_eq!(&bytes[3..], b"a,b");
    }

    #[test]
    fn test_template_has_fixed_header() {
        let template = template_csv();
        assert!(template.starts_with(
            "title,status,state,municipality,neighborhood,postal_code,street,patent,price,google_maps,description\n"
        ));
        assert_eq!(template.lines().count(), 2);
    }

    #[test]
    fn test_error_report() {
        let report = error_report_csv(&[ImportErrorRecord {
            row: 3,
            title: "Casa".to_string(),
            field: "status".to_string(),
            value: "leased".to_string(),
            message: "invalid, try again".to_string(),
            category: ErrorCategory::Validation,
        }]);
        assert_eq!(
            report,
            "row,title,field,value,message,type\n3,Casa,status,leased,\"invalid, try again\",validation"
        );
    }
}

//! Export formatting fed back through the import parser

mod common;

use chrono::NaiveDate;
use common::{sample_property, FakeApi};
use property_admin::api::{Filters, ListParams};
use property_admin::bulk::{export_properties, export_selected};
use property_admin::error::StoreError;
use property_admin::models::labels::normalize_state;
use property_admin::models::permissions::{Permissions, Role};
use property_admin::models::{Property, PropertyStatus};
use property_admin::selection::MemoryStorage;
use property_admin::transfer::formatter::format_field;
use property_admin::transfer::{
    escape_csv, parse_csv, to_csv, ParseOptions, ALLOWED_HEADERS, IMPORT_COLUMNS,
};
use property_admin::SelectionTracker;

fn export_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
}

fn tricky_records() -> Vec<Property> {
    let mut first = sample_property(1, "Casa, \"grande\"", 1);
    first.description = "Tres recámaras\nJardín, cochera".to_string();
    first.state = "nuevo_leon".to_string();
    first.status = PropertyStatus::Reserved;
    first.price = Some(1_750_000.5);

    let mut second = sample_property(2, "Terreno", 1);
    second.street = String::new();
    second.google_maps = None;
    second.state = "ciudad_de_mexico".to_string();

    vec![first, second]
}

#[test]
fn test_export_then_parse_preserves_fields() {
    let records = tricky_records();
    let text = to_csv(&records, IMPORT_COLUMNS);
    let parsed = parse_csv(&text, &ParseOptions::default()).unwrap();

    assert_eq!(parsed.total_rows, 2);
    for (record, row) in records.iter().zip(&parsed.data) {
        for key in ALLOWED_HEADERS {
            match key {
                "status" => assert_eq!(row.get("status"), record.status.label()),
                "state" => assert_eq!(normalize_state(row.get("state")), record.state),
                other => assert_eq!(row.get(other), format_field(record, other), "{}", other),
            }
        }
    }
    assert_eq!(parsed.data[0].get("title"), "Casa, \"grande\"");
    assert_eq!(parsed.data[0].get("description"), "Tres recámaras\nJardín, cochera");
    assert_eq!(parsed.data[0].get("price"), "1750000.5");
}

#[test]
fn test_escaping_survives_a_quote_aware_parser() {
    let value = "Casa, \"grande\"";
    assert_eq!(escape_csv(value), "\"Casa, \"\"grande\"\"\"");

    let text = format!(
        "title,status,state,municipality,patent\n{},available,jalisco,Zapopan,P-1\n",
        escape_csv(value)
    );
    let parsed = parse_csv(&text, &ParseOptions::default()).unwrap();
    assert_eq!(parsed.data[0].get("title"), value);
}

#[tokio::test]
async fn test_export_walks_every_page_of_the_filter() {
    let api = FakeApi::with_properties(250, 1);
    let params = ListParams {
        page: 2,
        filters: Filters {
            patent: Some("P-1".into()),
            ..Filters::default()
        },
        ..ListParams::default()
    };

    let file = export_properties(&api, &params, &Permissions::new(9, Role::Subscriber), export_date())
        .await
        .unwrap();

    assert_eq!(file.count, 250);
    assert_eq!(file.filename, "properties_patent_p-1_2024-03-09.csv");
    assert_eq!(*api.requested_pages.lock().unwrap(), vec![1, 2, 3]);

    assert!(file.bytes.starts_with(&[0xEF, 0xBB, 0xBF]));
    let text = String::from_utf8(file.bytes[3..].to_vec()).unwrap();
    let mut lines = text.lines();
    assert!(lines.next().unwrap().starts_with("ID,Título,Estado de la propiedad,Estado"));
    let first = lines.next().unwrap();
    assert!(first.starts_with("1,Casa 1,Disponible,Jalisco,Guadalajara"));
    assert_eq!(text.lines().count(), 251);
}

#[tokio::test]
async fn test_export_without_filter_and_write_to_disk() {
    let api = FakeApi::with_properties(3, 1);
    let file = export_properties(&api, &ListParams::default(), &Permissions::default(), export_date())
        .await
        .unwrap();
    assert_eq!(file.filename, "properties_2024-03-09.csv");

    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("exports");
    let path = file.write_to(&target).await.unwrap();

    assert_eq!(path, target.join("properties_2024-03-09.csv"));
    assert_eq!(std::fs::read(&path).unwrap(), file.bytes);
}

#[test]
fn test_export_selected_only_includes_selected_rows() {
    let records = tricky_records();
    let mut selection = SelectionTracker::new(MemoryStorage::new());

    let err = export_selected(&records, &selection, &Permissions::default(), export_date()).unwrap_err();
    assert!(matches!(err, StoreError::EmptySelection));

    selection.select(2);
    let file = export_selected(&records, &selection, &Permissions::default(), export_date()).unwrap();
    assert_eq!(file.count, 1);
    let text = String::from_utf8_lossy(&file.bytes).into_owned();
    assert!(text.contains("Terreno"));
    assert!(!text.contains("grande"));
    assert!(text.contains("Ciudad de México"));
}

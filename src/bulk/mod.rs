//! Multi-record operations: CSV import and export

pub mod export;
pub mod import;

pub use export::{export_properties, export_records, export_selected, ExportFile};
pub use import::{input_from_row, CsvImporter, ImportOutcome, ImportPhase, ImportProgress};

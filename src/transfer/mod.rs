//! CSV import/export: parsing, validation and formatting

pub mod formatter;
pub mod parser;
pub mod validator;

pub use formatter::{
    error_report_csv, escape_csv, export_filename, template_csv, to_csv, with_bom, Column,
    EXPORT_COLUMNS, IMPORT_COLUMNS,
};
pub use parser::{parse_csv, CsvRow, ParseOptions, ParsedCsv, ALLOWED_HEADERS, REQUIRED_HEADERS};
pub use validator::{validate_input, validate_row, validate_rows, FieldError};

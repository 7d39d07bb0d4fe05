//! Quote-aware CSV parsing with a header allow-list

use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::CsvError;

/// Every column an import may carry. Anything else aborts the import.
pub const ALLOWED_HEADERS: [&str; 11] = [
    "title",
    "status",
    "state",
    "municipality",
    "neighborhood",
    "postal_code",
    "street",
    "patent",
    "price",
    "google_maps",
    "description",
];

/// Columns that must be present in the header line
pub const REQUIRED_HEADERS: [&str; 5] = ["title", "status", "state", "municipality", "patent"];

/// Parser settings
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Drop data lines that are blank once trimmed
    pub skip_empty_lines: bool,
    pub required_headers: &'static [&'static str],
    pub allowed_headers: &'static [&'static str],
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            skip_empty_lines: true,
            required_headers: &REQUIRED_HEADERS,
            allowed_headers: &ALLOWED_HEADERS,
        }
    }
}

/// One data row keyed by allow-listed header names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvRow {
    fields: BTreeMap<&'static str, String>,
}

impl CsvRow {
    /// Field value, or an empty string when the column is absent
    pub fn get(&self, key: &str) -> &str {
        self.fields.get(key).map(String::as_str).unwrap_or("")
    }

    /// Overwrite an allow-listed field. Unknown keys are ignored.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        if let Some(known) = ALLOWED_HEADERS.iter().find(|h| **h == key) {
            self.fields.insert(*known, value.into());
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.keys().copied()
    }
}

/// Result of a successful parse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCsv {
    pub data: Vec<CsvRow>,
    /// Normalized (trimmed, lowercased) header names in file order
    pub headers: Vec<String>,
    pub total_rows: usize,
    pub skipped_rows: usize,
}

/// Parse CSV text into allow-listed rows.
///
/// Quoted fields may contain commas, doubled quotes and newlines. Every
/// field is trimmed. Rows shorter than the header yield empty strings for
/// the missing columns. Blank data lines are skipped and counted when
/// `skip_empty_lines` is set, otherwise each becomes a row of empty fields.
pub fn parse_csv(text: &str, options: &ParseOptions) -> Result<ParsedCsv, CsvError> {
    let text = text.trim_start_matches('\u{feff}');

    let non_blank_lines = text.lines().filter(|l| !l.trim().is_empty()).count();
    if non_blank_lines < 2 {
        return Err(CsvError::EmptyFile);
    }

    let mut builder = ReaderBuilder::new();
    builder.has_headers(false).flexible(true).trim(Trim::All);

    let mut lines = logical_lines(text).into_iter().enumerate();

    let header_record = loop {
        match lines.next() {
            Some((_, line)) if line.trim().is_empty() => continue,
            Some((idx, line)) => break read_record(&builder, line, idx + 1)?,
            None => return Err(CsvError::EmptyFile),
        }
    };

    let headers: Vec<String> = header_record
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();
    validate_headers(&headers, options)?;

    let columns: Vec<Option<&'static str>> = headers
        .iter()
        .map(|h| options.allowed_headers.iter().copied().find(|a| *a == h.as_str()))
        .collect();

    let mut data = Vec::new();
    let mut skipped_rows = 0;

    for (idx, line) in lines {
        let record = if line.trim().is_empty() {
            StringRecord::new()
        } else {
            read_record(&builder, line, idx + 1)?
        };

        if record_is_blank(&record) && options.skip_empty_lines {
            skipped_rows += 1;
            continue;
        }

        let mut row = CsvRow::default();
        for (col, column) in columns.iter().enumerate() {
            if let Some(key) = column {
                row.fields
                    .insert(*key, record.get(col).unwrap_or("").to_string());
            }
        }
        data.push(row);
    }

    debug!(
        rows = data.len(),
        skipped = skipped_rows,
        "Parsed CSV with headers {:?}",
        headers
    );

    Ok(ParsedCsv {
        total_rows: data.len(),
        data,
        headers,
        skipped_rows,
    })
}

/// Check required headers first, then the allow-list
pub fn validate_headers(headers: &[String], options: &ParseOptions) -> Result<(), CsvError> {
    let missing: Vec<String> = options
        .required_headers
        .iter()
        .filter(|required| !headers.iter().any(|h| h.as_str() == **required))
        .map(|s| s.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(CsvError::MissingRequiredHeaders(missing));
    }

    let invalid: Vec<String> = headers
        .iter()
        .filter(|h| !options.allowed_headers.contains(&h.as_str()))
        .cloned()
        .collect();
    if !invalid.is_empty() {
        return Err(CsvError::InvalidHeaders(invalid));
    }

    Ok(())
}

fn record_is_blank(record: &StringRecord) -> bool {
    record.iter().all(|f| f.trim().is_empty())
}

/// Split on line breaks that fall outside quoted fields. A trailing line
/// break does not produce an extra empty line.
fn logical_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;

    for (idx, c) in text.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            '\n' if !in_quotes => {
                lines.push(text[start..idx].trim_end_matches('\r'));
                start = idx + 1;
            }
            _ => {}
        }
    }
    if start < text.len() {
        lines.push(text[start..].trim_end_matches('\r'));
    }
    lines
}

/// Tokenize one logical line
fn read_record(builder: &ReaderBuilder, line: &str, line_no: usize) -> Result<StringRecord, CsvError> {
    let mut rdr = builder.from_reader(line.as_bytes());
    match rdr.records().next() {
        Some(Ok(record)) => Ok(record),
        Some(Err(e)) => Err(CsvError::Malformed {
            line: line_no as u64,
            message: e.to_string(),
        }),
        None => Ok(StringRecord::new()),
    }
}

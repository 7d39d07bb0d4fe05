//! Export of properties to a spreadsheet-friendly CSV file

use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::api::{ListParams, PropertyApi};
use crate::error::StoreError;
use crate::models::permissions::{Capability, Permissions};
use crate::models::Property;
use crate::selection::SelectionTracker;
use crate::transfer::{export_filename, to_csv, with_bom, EXPORT_COLUMNS};

const EXPORT_PAGE_SIZE: u32 = 100;

/// A generated export, ready to be written or offered for download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub filename: String,
    /// CSV bytes, starting with a UTF-8 byte-order mark
    pub bytes: Vec<u8>,
    pub count: usize,
}

impl ExportFile {
    /// Write into `dir` under the generated filename
    pub async fn write_to(&self, dir: &Path) -> std::io::Result<PathBuf> {
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(&self.filename);
        tokio::fs::write(&path, &self.bytes).await?;
        Ok(path)
    }
}

/// Format records as an export file named after the active filter
pub fn export_records(
    records: &[Property],
    active_filter: Option<(&str, &str)>,
    date: NaiveDate,
) -> ExportFile {
    ExportFile {
        filename: export_filename(active_filter, date),
        bytes: with_bom(&to_csv(records, EXPORT_COLUMNS)),
        count: records.len(),
    }
}

/// Export every record matching the filters in `params`, ignoring its page
pub async fn export_properties<A>(
    api: &A,
    params: &ListParams,
    permissions: &Permissions,
    date: NaiveDate,
) -> Result<ExportFile, StoreError>
where
    A: PropertyApi + ?Sized,
{
    if !permissions.can(Capability::Export) {
        return Err(StoreError::Forbidden(Capability::Export));
    }

    let mut query = params.clone();
    query.page = 1;
    query.per_page = EXPORT_PAGE_SIZE;

    let mut records = Vec::new();
    loop {
        let page = api.list(&query).await?;
        let fetched = page.items.len();
        records.extend(page.items);
        if fetched == 0 || query.page >= page.total_pages {
            break;
        }
        query.page += 1;
    }

    let active = params.filters.active();
    let file = export_records(
        &records,
        active.as_ref().map(|(field, value)| (*field, value.as_str())),
        date,
    );
    info!("Exported {} properties to {}", file.count, file.filename);
    Ok(file)
}

/// Export only the selected records of the loaded page
pub fn export_selected(
    records: &[Property],
    selection: &SelectionTracker,
    permissions: &Permissions,
    date: NaiveDate,
) -> Result<ExportFile, StoreError> {
    if !permissions.can(Capability::Export) {
        return Err(StoreError::Forbidden(Capability::Export));
    }
    if selection.is_empty() {
        return Err(StoreError::EmptySelection);
    }
    let chosen: Vec<Property> = records
        .iter()
        .filter(|p| selection.is_selected(p.id))
        .cloned()
        .collect();
    Ok(export_records(&chosen, None, date))
}

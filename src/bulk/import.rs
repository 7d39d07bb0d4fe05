//! CSV import: parse, validate, then create rows one at a time

use serde::Serialize;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::PropertyApi;
use crate::error::ImportAbort;
use crate::models::labels::normalize_state;
use crate::models::permissions::Capability;
use crate::models::{ErrorCategory, ImportErrorRecord, PropertyInput};
use crate::store::PropertyStore;
use crate::transfer::{parse_csv, validate_row, CsvRow, ParseOptions};

/// Where the import dialog is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportPhase {
    Selecting,
    Importing,
    Completed,
    Cancelled,
}

/// Cumulative progress, reported after every row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportProgress {
    pub current: usize,
    pub total: usize,
    pub success: usize,
    /// Rows that failed validation or creation
    pub errors: usize,
}

/// Final state of a finished or cancelled import
#[derive(Debug, Clone, Serialize)]
pub struct ImportOutcome {
    pub phase: ImportPhase,
    pub progress: ImportProgress,
    pub errors: Vec<ImportErrorRecord>,
    /// Whether the property list was reloaded afterwards
    pub reloaded: bool,
}

impl ImportOutcome {
    /// Summary line for the completion notification
    pub fn notification(&self) -> String {
        let p = &self.progress;
        if self.phase == ImportPhase::Cancelled {
            return format!("Import cancelled after {} of {} rows", p.current, p.total);
        }
        match (p.success, p.errors) {
            (created, 0) => format!("Import completed: {} properties created", created),
            (0, errors) => format!("Import failed: {} errors, no properties created", errors),
            (created, errors) => format!(
                "Import completed with errors: {} created, {} errors",
                created, errors
            ),
        }
    }
}

/// A file picked by the user, held until the import is confirmed
#[derive(Debug, Clone)]
struct ImportSource {
    name: String,
    bytes: Vec<u8>,
}

/// Import state machine: `Selecting -> Importing -> Completed | Cancelled`
pub struct CsvImporter {
    phase: ImportPhase,
    source: Option<ImportSource>,
    progress: ImportProgress,
    errors: Vec<ImportErrorRecord>,
    options: ParseOptions,
}

impl CsvImporter {
    pub fn new() -> Self {
        Self::with_options(ParseOptions::default())
    }

    pub fn with_options(options: ParseOptions) -> Self {
        Self {
            phase: ImportPhase::Selecting,
            source: None,
            progress: ImportProgress::default(),
            errors: Vec::new(),
            options,
        }
    }

    pub fn phase(&self) -> ImportPhase {
        self.phase
    }

    pub fn progress(&self) -> ImportProgress {
        self.progress
    }

    pub fn errors(&self) -> &[ImportErrorRecord] {
        &self.errors
    }

    pub fn file_name(&self) -> Option<&str> {
        self.source.as_ref().map(|s| s.name.as_str())
    }

    /// Pick file contents for the next run
    pub fn select_file(&mut self, name: impl Into<String>, bytes: Vec<u8>) {
        self.source = Some(ImportSource {
            name: name.into(),
            bytes,
        });
    }

    /// Read a file from disk and pick it
    pub async fn select_path(&mut self, path: &Path) -> Result<(), ImportAbort> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.select_file(name, bytes);
        Ok(())
    }

    /// Back to file selection, forgetting the previous run
    pub fn reset(&mut self) {
        self.phase = ImportPhase::Selecting;
        self.source = None;
        self.progress = ImportProgress::default();
        self.errors.clear();
    }

    /// Run the import against the store's API.
    ///
    /// Structural problems (unreadable headers, empty file) abort with an
    /// error and return to `Selecting`. Row problems are collected as data.
    /// `cancel` is checked before each row; a row already in flight finishes.
    pub async fn run<A, F>(
        &mut self,
        store: &mut PropertyStore<A>,
        cancel: &CancellationToken,
        mut on_progress: F,
    ) -> Result<ImportOutcome, ImportAbort>
    where
        A: PropertyApi,
        F: FnMut(&ImportProgress),
    {
        if self.phase == ImportPhase::Importing {
            return Err(ImportAbort::AlreadyRunning);
        }
        if !store.permissions().can(Capability::Import) {
            return Err(ImportAbort::Forbidden(Capability::Import));
        }
        let source = self.source.clone().ok_or(ImportAbort::NoFile)?;

        self.phase = ImportPhase::Importing;
        self.progress = ImportProgress::default();
        self.errors.clear();

        info!("Importing {} ({} bytes)", source.name, source.bytes.len());

        let text = String::from_utf8_lossy(&source.bytes);
        let text = text.strip_prefix('\u{feff}').unwrap_or(&text[..]);

        let mut parsed = match parse_csv(text, &self.options) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Import aborted: {}", e);
                self.phase = ImportPhase::Selecting;
                return Err(e.into());
            }
        };
        for row in &mut parsed.data {
            let state = normalize_state(row.get("state"));
            row.set("state", state);
        }

        self.progress.total = parsed.data.len();
        let mut cancelled = false;

        for (idx, row) in parsed.data.iter().enumerate() {
            if cancel.is_cancelled() {
                info!("Import cancelled before row {}", idx + 1);
                cancelled = true;
                break;
            }

            // Header is row 1
            let row_number = idx + 2;
            let title = row.get("title");

            let field_errors = validate_row(row, row_number);
            if !field_errors.is_empty() {
                debug!("Row {} failed validation ({} errors)", row_number, field_errors.len());
                self.errors
                    .extend(field_errors.into_iter().map(|e| e.into_record(title)));
                self.progress.errors += 1;
            } else {
                match store.api().create(&input_from_row(row)).await {
                    Ok(created) => {
                        debug!("Row {} created property {}", row_number, created.id);
                        self.progress.success += 1;
                    }
                    Err(e) => {
                        debug!("Row {} rejected by API: {}", row_number, e);
                        let category = if e.is_duplicate() {
                            ErrorCategory::Duplicate
                        } else {
                            ErrorCategory::Api
                        };
                        self.errors.push(ImportErrorRecord {
                            row: row_number,
                            title: title.to_string(),
                            field: String::new(),
                            value: String::new(),
                            message: e.to_string(),
                            category,
                        });
                        self.progress.errors += 1;
                    }
                }
            }

            self.progress.current = idx + 1;
            on_progress(&self.progress);
        }

        self.phase = if cancelled {
            ImportPhase::Cancelled
        } else {
            ImportPhase::Completed
        };

        let reloaded = if self.progress.success > 0 {
            match store.load_properties(None).await {
                Ok(_) => true,
                Err(e) => {
                    warn!("Reload after import failed: {}", e);
                    false
                }
            }
        } else {
            false
        };

        let outcome = ImportOutcome {
            phase: self.phase,
            progress: self.progress,
            errors: self.errors.clone(),
            reloaded,
        };
        info!("{}", outcome.notification());
        Ok(outcome)
    }
}

impl Default for CsvImporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the create payload from a row that passed validation
pub fn input_from_row(row: &CsvRow) -> PropertyInput {
    let optional = |key: &str| {
        let value = row.get(key).trim();
        (!value.is_empty()).then(|| value.to_string())
    };

    PropertyInput {
        title: row.get("title").to_string(),
        status: row.get("status").parse().unwrap_or_default(),
        state: row.get("state").to_string(),
        municipality: row.get("municipality").to_string(),
        neighborhood: row.get("neighborhood").to_string(),
        postal_code: row.get("postal_code").to_string(),
        street: row.get("street").to_string(),
        patent: row.get("patent").to_string(),
        price: optional("price").and_then(|p| p.parse().ok()),
        description: row.get("description").to_string(),
        google_maps: optional("google_maps"),
        attachment_id: None,
    }
}

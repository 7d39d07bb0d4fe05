//! Property listing administration: CSV import/export, bulk actions and
//! selection tracking over the WordPress properties REST API.

pub mod api;
pub mod bulk;
pub mod config;
pub mod error;
pub mod models;
pub mod selection;
pub mod store;
pub mod transfer;

pub use api::{PropertyApi, WpRestClient};
pub use config::SiteConfig;
pub use error::{ApiError, CsvError, ImportAbort, StoreError};
pub use models::{Property, PropertyInput, PropertyStatus};
pub use selection::SelectionTracker;
pub use store::PropertyStore;

pub mod client;
pub mod traits;
pub mod types;

pub use client::WpRestClient;
pub use traits::PropertyApi;
pub use types::{BatchFailure, BatchResponse, Filters, ListParams, PropertyPage, SortField, SortOrder};

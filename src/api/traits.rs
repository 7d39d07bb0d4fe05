use async_trait::async_trait;

use super::types::{BatchResponse, ListParams, PropertyPage};
use crate::error::ApiError;
use crate::models::{Property, PropertyInput, PropertyStatus};

/// Operations the property REST API offers.
/// The WordPress client is one implementation; tests supply in-memory ones.
#[async_trait]
pub trait PropertyApi: Send + Sync {
    async fn list(&self, params: &ListParams) -> Result<PropertyPage, ApiError>;

    async fn get(&self, id: i64) -> Result<Property, ApiError>;

    async fn create(&self, input: &PropertyInput) -> Result<Property, ApiError>;

    async fn update(&self, id: i64, input: &PropertyInput) -> Result<Property, ApiError>;

    async fn delete(&self, id: i64) -> Result<(), ApiError>;

    async fn bulk_delete(&self, ids: &[i64]) -> Result<BatchResponse, ApiError>;

    async fn bulk_update_status(
        &self,
        ids: &[i64],
        status: PropertyStatus,
    ) -> Result<BatchResponse, ApiError>;

    async fn bulk_update_patent(&self, ids: &[i64], patent: &str)
        -> Result<BatchResponse, ApiError>;

    /// Distinct patents across all properties
    async fn list_patents(&self) -> Result<Vec<String>, ApiError>;

    /// Upload a file and return its attachment id
    async fn upload_attachment(&self, filename: &str, bytes: Vec<u8>) -> Result<i64, ApiError>;

    /// Download the technical sheets of several properties as one archive
    async fn download_sheets(&self, ids: &[i64]) -> Result<Vec<u8>, ApiError>;
}

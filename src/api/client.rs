use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

use super::traits::PropertyApi;
use super::types::{BatchResponse, ListParams, PropertyPage};
use crate::config::SiteConfig;
use crate::error::ApiError;
use crate::models::{Property, PropertyInput, PropertyStatus};

const NONCE_HEADER: &str = "X-WP-Nonce";
const TOTAL_HEADER: &str = "X-WP-Total";
const TOTAL_PAGES_HEADER: &str = "X-WP-TotalPages";

/// Error body WordPress returns for failed REST calls
#[derive(Debug, Deserialize)]
struct WpErrorBody {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    id: i64,
}

/// WordPress REST client authenticated by the page nonce
pub struct WpRestClient {
    client: Client,
    config: SiteConfig,
}

impl WpRestClient {
    pub fn new(config: SiteConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("property-admin/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, config })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.config.endpoint(path);
        debug!("{} {}", method, url);
        self.client
            .request(method, url)
            .header(NONCE_HEADER, &self.config.nonce)
    }

    /// Send and turn non-success statuses into `ApiError::Http`
    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<WpErrorBody>(&body)
            .map(|b| b.message)
            .ok()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
        warn!("API returned status {}: {}", status, message);

        Err(ApiError::Http {
            status: status.as_u16(),
            message,
        })
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = self.send(request).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

fn header_number(response: &Response, name: &str) -> Option<u64> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

#[async_trait]
impl PropertyApi for WpRestClient {
    async fn list(&self, params: &ListParams) -> Result<PropertyPage, ApiError> {
        let request = self
            .request(Method::GET, "properties")
            .query(&params.to_query());
        let response = self.send(request).await?;

        let total = header_number(&response, TOTAL_HEADER);
        let total_pages = header_number(&response, TOTAL_PAGES_HEADER);
        let items: Vec<Property> = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;

        let total = total.unwrap_or(items.len() as u64);
        let total_pages = total_pages
            .map(|n| n as u32)
            .unwrap_or_else(|| pages_for(total, params.per_page));

        Ok(PropertyPage {
            items,
            total,
            total_pages,
        })
    }

    async fn get(&self, id: i64) -> Result<Property, ApiError> {
        self.send_json(self.request(Method::GET, &format!("properties/{}", id)))
            .await
    }

    async fn create(&self, input: &PropertyInput) -> Result<Property, ApiError> {
        self.send_json(self.request(Method::POST, "properties").json(input))
            .await
    }

    async fn update(&self, id: i64, input: &PropertyInput) -> Result<Property, ApiError> {
        self.send_json(
            self.request(Method::PUT, &format!("properties/{}", id))
                .json(input),
        )
        .await
    }

    async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.send(self.request(Method::DELETE, &format!("properties/{}", id)))
            .await?;
        Ok(())
    }

    async fn bulk_delete(&self, ids: &[i64]) -> Result<BatchResponse, ApiError> {
        self.send_json(
            self.request(Method::POST, "properties/bulk-delete")
                .json(&json!({ "ids": ids })),
        )
        .await
    }

    async fn bulk_update_status(
        &self,
        ids: &[i64],
        status: PropertyStatus,
    ) -> Result<BatchResponse, ApiError> {
        self.send_json(
            self.request(Method::POST, "properties/bulk-status")
                .json(&json!({ "ids": ids, "status": status })),
        )
        .await
    }

    async fn bulk_update_patent(
        &self,
        ids: &[i64],
        patent: &str,
    ) -> Result<BatchResponse, ApiError> {
        self.send_json(
            self.request(Method::POST, "properties/bulk-patent")
                .json(&json!({ "ids": ids, "patent": patent })),
        )
        .await
    }

    async fn list_patents(&self) -> Result<Vec<String>, ApiError> {
        self.send_json(self.request(Method::GET, "properties/patents"))
            .await
    }

    async fn upload_attachment(&self, filename: &str, bytes: Vec<u8>) -> Result<i64, ApiError> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);
        let uploaded: UploadResponse = self
            .send_json(self.request(Method::POST, "media").multipart(form))
            .await?;
        Ok(uploaded.id)
    }

    async fn download_sheets(&self, ids: &[i64]) -> Result<Vec<u8>, ApiError> {
        let response = self
            .send(
                self.request(Method::POST, "properties/sheets")
                    .json(&json!({ "ids": ids })),
            )
            .await?;
        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}

/// Number of pages needed for `total` items
pub fn pages_for(total: u64, per_page: u32) -> u32 {
    if per_page == 0 {
        return 0;
    }
    total.div_ceil(per_page as u64) as u32
}

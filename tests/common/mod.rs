//! Shared test fixtures: an in-memory property API

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use property_admin::api::{BatchFailure, BatchResponse, ListParams, PropertyApi, PropertyPage};
use property_admin::api::client::pages_for;
use property_admin::error::ApiError;
use property_admin::models::{Property, PropertyInput, PropertyStatus};

/// In-memory stand-in for the WordPress REST API
#[derive(Default)]
pub struct FakeApi {
    pub properties: Mutex<Vec<Property>>,
    next_id: Mutex<i64>,
    /// Titles the server rejects as duplicates on create
    pub duplicate_titles: Mutex<HashSet<String>>,
    /// Titles the server rejects with a generic error on create
    pub failing_titles: Mutex<HashSet<String>>,
    /// Make every bulk endpoint fail
    pub fail_bulk: Mutex<bool>,
    pub create_calls: AtomicUsize,
    pub list_calls: AtomicUsize,
    pub bulk_calls: AtomicUsize,
    /// Pages requested, in order
    pub requested_pages: Mutex<Vec<u32>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            next_id: Mutex::new(1),
            ..Self::default()
        }
    }

    /// Seed `count` properties owned by `owner`
    pub fn with_properties(count: usize, owner: i64) -> Self {
        let api = Self::new();
        for i in 0..count {
            api.insert(sample_property(0, &format!("Casa {}", i + 1), owner));
        }
        api
    }

    pub fn insert(&self, mut property: Property) -> i64 {
        let mut next = self.next_id.lock().unwrap();
        property.id = *next;
        *next += 1;
        let id = property.id;
        self.properties.lock().unwrap().push(property);
        id
    }

    pub fn titles(&self) -> Vec<String> {
        self.properties
            .lock()
            .unwrap()
            .iter()
            .map(|p| p.title.clone())
            .collect()
    }

    pub fn get_local(&self, id: i64) -> Option<Property> {
        self.properties
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    pub fn count(&self) -> usize {
        self.properties.lock().unwrap().len()
    }

    pub fn created(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn lists(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    fn check_bulk(&self) -> Result<(), ApiError> {
        self.bulk_calls.fetch_add(1, Ordering::SeqCst);
        if *self.fail_bulk.lock().unwrap() {
            return Err(ApiError::Http {
                status: 500,
                message: "Internal Server Error".to_string(),
            });
        }
        Ok(())
    }

    fn apply<F: Fn(&mut Property)>(&self, ids: &[i64], f: F) -> BatchResponse {
        let mut props = self.properties.lock().unwrap();
        let mut response = BatchResponse::default();
        for &id in ids {
            match props.iter_mut().find(|p| p.id == id) {
                Some(p) => {
                    f(p);
                    response.succeeded.push(id);
                }
                None => response.failed.push(BatchFailure {
                    id,
                    message: "not found".to_string(),
                }),
            }
        }
        response
    }
}

pub fn sample_property(id: i64, title: &str, owner: i64) -> Property {
    Property {
        id,
        title: title.to_string(),
        status: PropertyStatus::Available,
        state: "jalisco".to_string(),
        municipality: "Guadalajara".to_string(),
        neighborhood: "Americana".to_string(),
        postal_code: "44160".to_string(),
        street: "Av. Chapultepec 100".to_string(),
        patent: "P-1".to_string(),
        price: Some(2_500_000.0),
        description: "Casa amplia".to_string(),
        google_maps: Some("https://maps.google.com/?q=1".to_string()),
        attachment_id: None,
        created_by: Some(owner),
        created_at: Some(Utc::now()),
        updated_by: None,
        updated_at: None,
    }
}

/// Edit payload carrying a record's current values
pub fn input_from(property: &Property) -> PropertyInput {
    PropertyInput {
        title: property.title.clone(),
        status: property.status,
        state: property.state.clone(),
        municipality: property.municipality.clone(),
        neighborhood: property.neighborhood.clone(),
        postal_code: property.postal_code.clone(),
        street: property.street.clone(),
        patent: property.patent.clone(),
        price: property.price,
        description: property.description.clone(),
        google_maps: property.google_maps.clone(),
        attachment_id: property.attachment_id,
    }
}

fn not_found(id: i64) -> ApiError {
    ApiError::Http {
        status: 404,
        message: format!("Property {} not found", id),
    }
}

#[async_trait]
impl PropertyApi for FakeApi {
    async fn list(&self, params: &ListParams) -> Result<PropertyPage, ApiError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.requested_pages.lock().unwrap().push(params.page);

        let props = self.properties.lock().unwrap();
        let matching: Vec<Property> = props
            .iter()
            .filter(|p| params.filters.status.map_or(true, |s| p.status == s))
            .filter(|p| params.filters.state.as_ref().map_or(true, |s| &p.state == s))
            .filter(|p| params.filters.patent.as_ref().map_or(true, |s| &p.patent == s))
            .filter(|p| {
                params
                    .filters
                    .search
                    .as_ref()
                    .map_or(true, |s| p.title.to_lowercase().contains(&s.to_lowercase()))
            })
            .cloned()
            .collect();

        let total = matching.len() as u64;
        let per_page = params.per_page.max(1) as usize;
        let start = (params.page.max(1) as usize - 1) * per_page;
        let items = matching.into_iter().skip(start).take(per_page).collect();

        Ok(PropertyPage {
            items,
            total,
            total_pages: pages_for(total, params.per_page.max(1)),
        })
    }

    async fn get(&self, id: i64) -> Result<Property, ApiError> {
        self.get_local(id).ok_or_else(|| not_found(id))
    }

    async fn create(&self, input: &PropertyInput) -> Result<Property, ApiError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if self.duplicate_titles.lock().unwrap().contains(&input.title) {
            return Err(ApiError::Http {
                status: 409,
                message: format!("A property titled '{}' already exists", input.title),
            });
        }
        if self.failing_titles.lock().unwrap().contains(&input.title) {
            return Err(ApiError::Http {
                status: 500,
                message: "Database error".to_string(),
            });
        }

        let mut property = sample_property(0, &input.title, 0);
        input.apply_to(&mut property);
        let id = self.insert(property);
        Ok(self.get_local(id).unwrap())
    }

    async fn update(&self, id: i64, input: &PropertyInput) -> Result<Property, ApiError> {
        let mut props = self.properties.lock().unwrap();
        let property = props.iter_mut().find(|p| p.id == id).ok_or_else(|| not_found(id))?;
        input.apply_to(property);
        property.updated_at = Some(Utc::now());
        Ok(property.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), ApiError> {
        let mut props = self.properties.lock().unwrap();
        let before = props.len();
        props.retain(|p| p.id != id);
        if props.len() == before {
            return Err(not_found(id));
        }
        Ok(())
    }

    async fn bulk_delete(&self, ids: &[i64]) -> Result<BatchResponse, ApiError> {
        self.check_bulk()?;
        let mut props = self.properties.lock().unwrap();
        let mut response = BatchResponse::default();
        for &id in ids {
            if props.iter().any(|p| p.id == id) {
                props.retain(|p| p.id != id);
                response.succeeded.push(id);
            } else {
                response.failed.push(BatchFailure {
                    id,
                    message: "not found".to_string(),
                });
            }
        }
        Ok(response)
    }

    async fn bulk_update_status(
        &self,
        ids: &[i64],
        status: PropertyStatus,
    ) -> Result<BatchResponse, ApiError> {
        self.check_bulk()?;
        Ok(self.apply(ids, |p| p.status = status))
    }

    async fn bulk_update_patent(
        &self,
        ids: &[i64],
        patent: &str,
    ) -> Result<BatchResponse, ApiError> {
        self.check_bulk()?;
        Ok(self.apply(ids, |p| p.patent = patent.to_string()))
    }

    async fn list_patents(&self) -> Result<Vec<String>, ApiError> {
        Ok(self
            .properties
            .lock()
            .unwrap()
            .iter()
            .map(|p| p.patent.clone())
            .collect())
    }

    async fn upload_attachment(&self, filename: &str, bytes: Vec<u8>) -> Result<i64, ApiError> {
        if bytes.is_empty() {
            return Err(ApiError::Http {
                status: 400,
                message: format!("{} is empty", filename),
            });
        }
        Ok(900 + bytes.len() as i64)
    }

    async fn download_sheets(&self, ids: &[i64]) -> Result<Vec<u8>, ApiError> {
        Ok(format!("sheets:{:?}", ids).into_bytes())
    }
}

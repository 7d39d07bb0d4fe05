//! Client-side state of the property list and the actions that mutate it

use tracing::{debug, info, warn};

use crate::api::{BatchResponse, Filters, ListParams, PropertyApi, SortField, SortOrder};
use crate::error::{ApiError, StoreError};
use crate::models::permissions::{Capability, Permissions};
use crate::models::{BulkResult, Property, PropertyInput, PropertyStatus};
use crate::selection::SelectionTracker;
use crate::transfer::validate_input;

/// Current page of records plus the parameters that produced it.
///
/// All mutation goes through the action methods. Single-record actions patch
/// the loaded page in place; bulk actions always reload from the server.
pub struct PropertyStore<A> {
    api: A,
    permissions: Permissions,
    records: Vec<Property>,
    params: ListParams,
    total: u64,
    total_pages: u32,
    loading: bool,
    error: Option<String>,
}

impl<A: PropertyApi> PropertyStore<A> {
    pub fn new(api: A, permissions: Permissions) -> Self {
        Self::with_params(api, permissions, ListParams::default())
    }

    pub fn with_params(api: A, permissions: Permissions, params: ListParams) -> Self {
        Self {
            api,
            permissions,
            records: Vec::new(),
            params,
            total: 0,
            total_pages: 0,
            loading: false,
            error: None,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn permissions(&self) -> &Permissions {
        &self.permissions
    }

    pub fn records(&self) -> &[Property] {
        &self.records
    }

    pub fn record_ids(&self) -> Vec<i64> {
        self.records.iter().map(|p| p.id).collect()
    }

    pub fn params(&self) -> &ListParams {
        &self.params
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Message of the last failed action, cleared by the next success
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Fetch the current page, optionally replacing the list parameters first
    pub async fn load_properties(
        &mut self,
        params_override: Option<ListParams>,
    ) -> Result<&[Property], StoreError> {
        if let Some(params) = params_override {
            self.params = params;
        }

        self.loading = true;
        let result = self.api.list(&self.params).await;
        self.loading = false;

        match result {
            Ok(page) => {
                debug!(
                    page = self.params.page,
                    items = page.items.len(),
                    total = page.total,
                    "Loaded properties"
                );
                self.records = page.items;
                self.total = page.total;
                self.total_pages = page.total_pages;
                self.error = None;
                Ok(self.records.as_slice())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Reload and prune the selection against the new page
    pub async fn load_and_sync(&mut self, selection: &mut SelectionTracker) -> Result<(), StoreError> {
        self.load_properties(None).await?;
        selection.prune(&self.record_ids());
        Ok(())
    }

    /// Change filters and go back to page 1
    pub async fn set_filters(&mut self, filters: Filters) -> Result<(), StoreError> {
        self.params.filters = filters;
        self.params.page = 1;
        self.load_properties(None).await.map(|_| ())
    }

    /// Change ordering and go back to page 1
    pub async fn set_sort(&mut self, orderby: SortField, order: SortOrder) -> Result<(), StoreError> {
        self.params.orderby = orderby;
        self.params.order = order;
        self.params.page = 1;
        self.load_properties(None).await.map(|_| ())
    }

    /// Change page size and go back to page 1
    pub async fn set_per_page(&mut self, per_page: u32) -> Result<(), StoreError> {
        self.params.per_page = per_page.max(1);
        self.params.page = 1;
        self.load_properties(None).await.map(|_| ())
    }

    /// Plain page navigation; filters and ordering are kept
    pub async fn set_page(&mut self, page: u32) -> Result<(), StoreError> {
        self.params.page = page.max(1);
        self.load_properties(None).await.map(|_| ())
    }

    pub async fn create_property(&mut self, input: &PropertyInput) -> Result<Property, StoreError> {
        self.require(Capability::Create)?;
        check_input(input)?;

        let created = self.api.create(input).await.map_err(|e| self.fail(e))?;
        info!("Created property {} ({})", created.id, created.title);

        self.records.insert(0, created.clone());
        self.total += 1;
        self.error = None;
        Ok(created)
    }

    pub async fn update_property(
        &mut self,
        id: i64,
        input: &PropertyInput,
    ) -> Result<Property, StoreError> {
        self.require(Capability::Edit)?;
        self.require_owner(id)?;
        check_input(input)?;

        let updated = self.api.update(id, input).await.map_err(|e| self.fail(e))?;
        if let Some(slot) = self.records.iter_mut().find(|p| p.id == id) {
            *slot = updated.clone();
        }
        self.error = None;
        Ok(updated)
    }

    pub async fn delete_property(&mut self, id: i64) -> Result<(), StoreError> {
        self.require(Capability::Delete)?;
        self.require_owner(id)?;

        self.api.delete(id).await.map_err(|e| self.fail(e))?;
        let before = self.records.len();
        self.records.retain(|p| p.id != id);
        if self.records.len() < before {
            self.total = self.total.saturating_sub(1);
        }
        self.error = None;
        Ok(())
    }

    pub async fn bulk_update_status(
        &mut self,
        selection: &mut SelectionTracker,
        status: PropertyStatus,
    ) -> Result<BulkResult, StoreError> {
        let (allowed, denied) = self.prepare_bulk(selection, Capability::BulkEdit)?;
        info!("Setting status '{}' on {} properties", status, allowed.len());
        let response = if allowed.is_empty() {
            BatchResponse::default()
        } else {
            self.api
                .bulk_update_status(&allowed, status)
                .await
                .map_err(|e| self.fail(e))?
        };
        self.finish_bulk(selection, response, denied).await
    }

    pub async fn bulk_update_patent(
        &mut self,
        selection: &mut SelectionTracker,
        patent: &str,
    ) -> Result<BulkResult, StoreError> {
        let patent = patent.trim();
        if patent.is_empty() {
            return Err(StoreError::Invalid(vec!["Patent is required".to_string()]));
        }
        let (allowed, denied) = self.prepare_bulk(selection, Capability::BulkEdit)?;
        info!("Reassigning {} properties to patent '{}'", allowed.len(), patent);
        let response = if allowed.is_empty() {
            BatchResponse::default()
        } else {
            self.api
                .bulk_update_patent(&allowed, patent)
                .await
                .map_err(|e| self.fail(e))?
        };
        self.finish_bulk(selection, response, denied).await
    }

    pub async fn bulk_delete(
        &mut self,
        selection: &mut SelectionTracker,
    ) -> Result<BulkResult, StoreError> {
        self.require(Capability::Delete)?;
        let (allowed, denied) = self.prepare_bulk(selection, Capability::BulkEdit)?;
        info!("Deleting {} properties", allowed.len());
        let response = if allowed.is_empty() {
            BatchResponse::default()
        } else {
            self.api
                .bulk_delete(&allowed)
                .await
                .map_err(|e| self.fail(e))?
        };
        self.finish_bulk(selection, response, denied).await
    }

    pub async fn fetch_patents(&mut self) -> Result<Vec<String>, StoreError> {
        let mut patents = self.api.list_patents().await.map_err(|e| self.fail(e))?;
        patents.retain(|p| !p.trim().is_empty());
        patents.sort();
        patents.dedup();
        Ok(patents)
    }

    pub async fn upload_attachment(
        &mut self,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<i64, StoreError> {
        self.require(Capability::Edit)?;
        self.api
            .upload_attachment(filename, bytes)
            .await
            .map_err(|e| self.fail(e))
    }

    /// Technical sheets of the selected properties as one archive
    pub async fn download_sheets(&mut self, ids: &[i64]) -> Result<Vec<u8>, StoreError> {
        self.require(Capability::Export)?;
        if ids.is_empty() {
            return Err(StoreError::EmptySelection);
        }
        self.api.download_sheets(ids).await.map_err(|e| self.fail(e))
    }

    /// Gate a bulk action. The selection is pruned to the loaded page first,
    /// so only identifiers the user can currently see are ever sent.
    fn prepare_bulk(
        &self,
        selection: &mut SelectionTracker,
        capability: Capability,
    ) -> Result<(Vec<i64>, Vec<(i64, String)>), StoreError> {
        self.require(capability)?;
        let stale = selection.prune(&self.record_ids());
        if !stale.is_empty() {
            warn!("Ignoring {} selected properties not on the loaded page", stale.len());
        }
        let ids = selection.ids();
        if ids.is_empty() {
            return Err(StoreError::EmptySelection);
        }
        let (allowed, denied) = self.permissions.partition(&ids, &self.records);
        if !denied.is_empty() {
            warn!("{} selected properties are outside your permissions", denied.len());
        }
        Ok((allowed, denied))
    }

    /// Clear the selection, reload, and step back if the page emptied out
    async fn finish_bulk(
        &mut self,
        selection: &mut SelectionTracker,
        response: BatchResponse,
        denied: Vec<(i64, String)>,
    ) -> Result<BulkResult, StoreError> {
        let mut result = BulkResult {
            succeeded: response.succeeded,
            failed: response
                .failed
                .into_iter()
                .map(|f| (f.id, f.message))
                .collect(),
        };
        result.failed.extend(denied);

        selection.clear();
        self.reload_after_bulk().await?;
        selection.prune(&self.record_ids());
        Ok(result)
    }

    async fn reload_after_bulk(&mut self) -> Result<(), StoreError> {
        self.load_properties(None).await?;
        if self.records.is_empty() && self.params.page > 1 {
            let last = self.total_pages.max(1);
            debug!(
                "Page {} is empty after bulk action, retreating to page {}",
                self.params.page, last
            );
            self.params.page = last;
            self.load_properties(None).await?;
        }
        Ok(())
    }

    fn require(&self, capability: Capability) -> Result<(), StoreError> {
        if self.permissions.can(capability) {
            Ok(())
        } else {
            Err(StoreError::Forbidden(capability))
        }
    }

    fn require_owner(&self, id: i64) -> Result<(), StoreError> {
        match self.records.iter().find(|p| p.id == id) {
            Some(property) if self.permissions.can_modify(property) => Ok(()),
            Some(_) => Err(StoreError::Forbidden(Capability::Edit)),
            None => Err(StoreError::NotFound(id)),
        }
    }

    fn fail(&mut self, e: ApiError) -> StoreError {
        warn!("Property API call failed: {}", e);
        self.error = Some(e.to_string());
        StoreError::Api(e)
    }
}

fn check_input(input: &PropertyInput) -> Result<(), StoreError> {
    let errors = validate_input(input);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(StoreError::Invalid(
            errors.into_iter().map(|e| e.message).collect(),
        ))
    }
}

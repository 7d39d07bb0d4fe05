use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_PER_PAGE;
use crate::models::{Property, PropertyStatus};

/// Sortable columns of the property list
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    Date,
    Title,
    Price,
    Status,
    Patent,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Date => "date",
            SortField::Title => "title",
            SortField::Price => "price",
            SortField::Status => "status",
            SortField::Patent => "patent",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Filters of the property list. `None` means "all".
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Filters {
    pub search: Option<String>,
    pub status: Option<PropertyStatus>,
    pub state: Option<String>,
    pub patent: Option<String>,
}

impl Filters {
    /// The first non-default filter as `(field, value)`, used to name exports
    pub fn active(&self) -> Option<(&'static str, String)> {
        if let Some(status) = self.status {
            return Some(("status", status.as_str().to_string()));
        }
        [
            ("state", &self.state),
            ("patent", &self.patent),
            ("search", &self.search),
        ]
        .into_iter()
        .find_map(|(field, value)| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| (field, v.to_string()))
        })
    }
}

/// List query: filters, sorting and pagination
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListParams {
    /// 1-based page number
    pub page: u32,
    pub per_page: u32,
    pub filters: Filters,
    pub orderby: SortField,
    pub order: SortOrder,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
            filters: Filters::default(),
            orderby: SortField::default(),
            order: SortOrder::default(),
        }
    }
}

impl ListParams {
    /// Query-string pairs for the REST list endpoint
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("page", self.page.to_string()),
            ("per_page", self.per_page.to_string()),
            ("orderby", self.orderby.as_str().to_string()),
            ("order", self.order.as_str().to_string()),
        ];
        if let Some(status) = self.filters.status {
            query.push(("status", status.as_str().to_string()));
        }
        for (key, value) in [
            ("search", &self.filters.search),
            ("state", &self.filters.state),
            ("patent", &self.filters.patent),
        ] {
            if let Some(v) = value.as_deref().filter(|v| !v.trim().is_empty()) {
                query.push((key, v.trim().to_string()));
            }
        }
        query
    }
}

/// One page of the property list
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PropertyPage {
    pub items: Vec<Property>,
    pub total: u64,
    pub total_pages: u32,
}

/// A per-identifier failure reported by a batch endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BatchFailure {
    pub id: i64,
    pub message: String,
}

/// Response body of the bulk delete/status/patent endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BatchResponse {
    #[serde(default)]
    pub succeeded: Vec<i64>,
    #[serde(default)]
    pub failed: Vec<BatchFailure>,
}

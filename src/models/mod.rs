pub mod labels;
pub mod permissions;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::InvalidStatus;

/// Listing status of a property
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PropertyStatus {
    #[default]
    Available,
    Sold,
    Rented,
    Reserved,
}

impl PropertyStatus {
    pub const ALL: [PropertyStatus; 4] = [
        PropertyStatus::Available,
        PropertyStatus::Sold,
        PropertyStatus::Rented,
        PropertyStatus::Reserved,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyStatus::Available => "available",
            PropertyStatus::Sold => "sold",
            PropertyStatus::Rented => "rented",
            PropertyStatus::Reserved => "reserved",
        }
    }

    /// Human-readable label used in exports
    pub fn label(&self) -> &'static str {
        match self {
            PropertyStatus::Available => "Disponible",
            PropertyStatus::Sold => "Vendida",
            PropertyStatus::Rented => "Rentada",
            PropertyStatus::Reserved => "Apartada",
        }
    }
}

impl fmt::Display for PropertyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        PropertyStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| InvalidStatus(s.trim().to_string()))
    }
}

/// Core property record as returned by the REST API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Property {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub status: PropertyStatus,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub municipality: String,
    #[serde(default)]
    pub neighborhood: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub patent: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub google_maps: Option<String>,
    #[serde(default)]
    pub attachment_id: Option<i64>,
    #[serde(default)]
    pub created_by: Option<i64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_by: Option<i64>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Payload for creating or updating a property
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PropertyInput {
    pub title: String,
    pub status: PropertyStatus,
    pub state: String,
    pub municipality: String,
    pub neighborhood: String,
    pub postal_code: String,
    pub street: String,
    pub patent: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_maps: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment_id: Option<i64>,
}

impl PropertyInput {
    /// Apply this input to an existing record, keeping its identity and audit fields
    pub fn apply_to(&self, property: &mut Property) {
        property.title = self.title.clone();
        property.status = self.status;
        property.state = self.state.clone();
        property.municipality = self.municipality.clone();
        property.neighborhood = self.neighborhood.clone();
        property.postal_code = self.postal_code.clone();
        property.street = self.street.clone();
        property.patent = self.patent.clone();
        property.price = self.price;
        property.description = self.description.clone();
        property.google_maps = self.google_maps.clone();
        property.attachment_id = self.attachment_id;
    }
}

/// Category of an import error
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Validation,
    Api,
    Duplicate,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Validation => "validation",
            ErrorCategory::Api => "api",
            ErrorCategory::Duplicate => "duplicate",
        }
    }
}

/// One problem found while importing a CSV row. Never sent to the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImportErrorRecord {
    /// 1-based source row, counting the header as row 1
    pub row: usize,
    pub title: String,
    pub field: String,
    pub value: String,
    pub message: String,
    pub category: ErrorCategory,
}

/// Outcome of a bulk status/patent/delete call
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct BulkResult {
    pub succeeded: Vec<i64>,
    pub failed: Vec<(i64, String)>,
}

impl BulkResult {
    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Short summary for a notification line
    pub fn summary(&self, action: &str) -> String {
        match (self.succeeded.len(), self.failed.len()) {
            (ok, 0) => format!("{}: {} properties updated", action, ok),
            (0, failed) => format!("{} failed for all {} properties", action, failed),
            (ok, failed) => format!("{}: {} properties updated, {} failed", action, ok, failed),
        }
    }
}

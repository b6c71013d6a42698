use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::inventory::InventoryRecord;
use crate::models::pharmacy::{LatLng, PharmacySummary};

/// Raw query parameters of the availability search.
///
/// Kept as strings so missing and unparsable values are reported as typed
/// search errors instead of extractor rejections.
#[derive(Debug, Default, Deserialize)]
pub struct AvailabilitySearchParams {
    pub q: Option<String>,
    pub lat: Option<String>,
    pub lng: Option<String>,
}

/// One ranked entry per pharmacy.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub pharmacy_id: Uuid,
    pub name: String,
    pub username: String,
    pub is_open: bool,
    pub medicine: String,
    pub batch_number: String,
    pub expiry_date: NaiveDate,
    pub price: Decimal,
    pub stock: i32,
    /// Kilometers from the search origin
    pub distance: f64,
    pub location: LatLng,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct CatalogSearchParams {
    pub q: Option<String>,
    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    pub limit: Option<i64>,
}

/// Unranked catalog hit: the stocked batch plus who holds it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    #[serde(flatten)]
    pub record: InventoryRecord,
    pub pharmacy: PharmacySummary,
}

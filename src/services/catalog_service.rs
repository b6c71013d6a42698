use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::middleware::error_handling::{AppError, Result};
use crate::models::{CatalogEntry, CatalogSearchParams, InventoryRecord, Pharmacy, PharmacyProfile, PharmacySummary};
use crate::repositories::{InventoryStore, PharmacyStore};
use crate::services::availability_service::validate_query;
use crate::utils::log_sanitizer::sanitize_for_log;

pub const DEFAULT_CATALOG_LIMIT: i64 = 50;

/// Unranked catalog search and read-only pharmacy lookups.
#[derive(Clone)]
pub struct CatalogService {
    inventory: Arc<dyn InventoryStore>,
    pharmacies: Arc<dyn PharmacyStore>,
}

impl CatalogService {
    pub fn new(inventory: Arc<dyn InventoryStore>, pharmacies: Arc<dyn PharmacyStore>) -> Self {
        Self { inventory, pharmacies }
    }

    /// Name search across every stocked batch, zero quantities included.
    ///
    /// A `limit` outside `1..=100` is a validation error, raised before any
    /// store read.
    pub async fn search_catalog(&self, medicine_query: &str, limit: Option<i64>) -> Result<Vec<CatalogEntry>> {
        let query = validate_query(medicine_query)?;
        CatalogSearchParams { q: Some(query.to_string()), limit }.validate()?;
        let limit = limit.unwrap_or(DEFAULT_CATALOG_LIMIT);

        let records = self.inventory.search_by_name(query, limit).await?;

        let mut pharmacies: HashMap<Uuid, Option<Pharmacy>> = HashMap::new();
        let mut entries = Vec::with_capacity(records.len());
        for record in records {
            let pharmacy = match pharmacies.get(&record.pharmacy_id) {
                Some(cached) => cached.clone(),
                None => {
                    let found = self.pharmacies.find_by_id(record.pharmacy_id).await?;
                    pharmacies.insert(record.pharmacy_id, found.clone());
                    found
                }
            };

            match pharmacy {
                Some(pharmacy) => entries.push(CatalogEntry {
                    pharmacy: PharmacySummary::from(&pharmacy),
                    record,
                }),
                None => {
                    tracing::warn!(pharmacy_id = %record.pharmacy_id, "Inventory references a missing pharmacy");
                }
            }
        }

        tracing::info!(
            query = %sanitize_for_log(query),
            results = entries.len(),
            "Catalog search completed"
        );

        Ok(entries)
    }

    pub async fn get_pharmacy(&self, pharmacy_id: Uuid) -> Result<PharmacyProfile> {
        let pharmacy = self
            .pharmacies
            .find_by_id(pharmacy_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Pharmacy not found".to_string()))?;
        let location = self.pharmacies.get_location(pharmacy_id).await?;

        Ok(PharmacyProfile::new(pharmacy, location))
    }

    /// Every batch the pharmacy holds, most recently updated first.
    pub async fn list_medicines(&self, pharmacy_id: Uuid) -> Result<Vec<InventoryRecord>> {
        if self.pharmacies.find_by_id(pharmacy_id).await?.is_none() {
            return Err(AppError::NotFound("Pharmacy not found".to_string()));
        }

        self.inventory.list_by_pharmacy(pharmacy_id).await
    }
}

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::middleware::error_handling::{AppError, Result};
use crate::models::{InventoryRecord, Location, Pharmacy};
use crate::repositories::{InventoryStore, PharmacyStore};

#[derive(Debug, Default)]
struct CatalogData {
    pharmacies: HashMap<Uuid, Pharmacy>,
    locations: HashMap<Uuid, Location>,
    // Insertion order is the iteration order of find_matching
    inventory: Vec<InventoryRecord>,
}

/// In-process catalog implementing both store traits.
///
/// Can be switched into an "unavailable" mode in which every read fails with
/// `StoreUnavailable`, and counts the reads it served.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    data: RwLock<CatalogData>,
    unavailable: AtomicBool,
    reads: AtomicUsize,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_pharmacy(&self, pharmacy: Pharmacy, location: Option<Location>) {
        let mut data = self.write();
        match location {
            Some(location) => {
                data.locations.insert(pharmacy.id, location);
            }
            None => {
                data.locations.remove(&pharmacy.id);
            }
        }
        data.pharmacies.insert(pharmacy.id, pharmacy);
    }

    /// Stores a location with no pharmacy row behind it, as left over when a
    /// pharmacy is deleted without its location.
    pub fn insert_orphan_location(&self, pharmacy_id: Uuid, location: Location) {
        self.write().locations.insert(pharmacy_id, location);
    }

    /// Inserts a record, replacing any existing record with the same
    /// (pharmacy, medicine name, batch number) key in place.
    pub fn upsert_inventory(&self, record: InventoryRecord) {
        let mut data = self.write();
        let existing = data.inventory.iter().position(|r| {
            r.pharmacy_id == record.pharmacy_id
                && r.medicine_name == record.medicine_name
                && r.batch_number == record.batch_number
        });

        match existing {
            Some(index) => data.inventory[index] = record,
            None => data.inventory.push(record),
        }
    }

    /// Registers an open pharmacy named `name` and returns its id. The
    /// username is derived from the name.
    pub fn add_pharmacy(&self, name: &str, location: Option<Location>) -> Uuid {
        let now = Utc::now();
        let username = name
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-");
        let pharmacy = Pharmacy {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: format!("{}@pharmacies.test", username),
            username,
            phone: String::new(),
            address: String::new(),
            is_open: true,
            created_at: now,
            updated_at: now,
        };
        let id = pharmacy.id;
        self.insert_pharmacy(pharmacy, location);
        id
    }

    /// Stocks a batch expiring one year from today.
    pub fn add_stock(
        &self,
        pharmacy_id: Uuid,
        medicine_name: &str,
        batch_number: &str,
        quantity: i32,
        price_per_unit: Decimal,
    ) {
        let now = Utc::now();
        self.upsert_inventory(InventoryRecord {
            pharmacy_id,
            medicine_name: medicine_name.to_string(),
            batch_number: batch_number.to_string(),
            expiry_date: now.date_naive() + Duration::days(365),
            quantity,
            price_per_unit,
            created_at: now,
            updated_at: now,
        });
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of store reads served (or refused) so far.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn begin_read(&self) -> Result<RwLockReadGuard<'_, CatalogData>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::StoreUnavailable("in-memory catalog marked unavailable".to_string()));
        }
        Ok(self.data.read().unwrap_or_else(|poisoned| poisoned.into_inner()))
    }

    fn write(&self) -> RwLockWriteGuard<'_, CatalogData> {
        self.data.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl InventoryStore for InMemoryCatalog {
    async fn find_matching(&self, name_pattern: &str, min_quantity: i32) -> Result<Vec<InventoryRecord>> {
        let data = self.begin_read()?;
        Ok(data
            .inventory
            .iter()
            .filter(|r| r.quantity >= min_quantity && r.name_matches(name_pattern))
            .cloned()
            .collect())
    }

    async fn search_by_name(&self, name_pattern: &str, limit: i64) -> Result<Vec<InventoryRecord>> {
        let data = self.begin_read()?;
        let mut records: Vec<InventoryRecord> = data
            .inventory
            .iter()
            .filter(|r| r.name_matches(name_pattern))
            .cloned()
            .collect();

        records.sort_by(|a, b| {
            a.medicine_name
                .cmp(&b.medicine_name)
                .then_with(|| a.pharmacy_id.cmp(&b.pharmacy_id))
                .then_with(|| a.batch_number.cmp(&b.batch_number))
        });
        records.truncate(usize::try_from(limit).unwrap_or(0));

        Ok(records)
    }

    async fn list_by_pharmacy(&self, pharmacy_id: Uuid) -> Result<Vec<InventoryRecord>> {
        let data = self.begin_read()?;
        let mut records: Vec<InventoryRecord> = data
            .inventory
            .iter()
            .filter(|r| r.pharmacy_id == pharmacy_id)
            .cloned()
            .collect();

        records.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(records)
    }
}

#[async_trait]
impl PharmacyStore for InMemoryCatalog {
    async fn find_by_id(&self, pharmacy_id: Uuid) -> Result<Option<Pharmacy>> {
        let data = self.begin_read()?;
        Ok(data.pharmacies.get(&pharmacy_id).cloned())
    }

    async fn get_location(&self, pharmacy_id: Uuid) -> Result<Option<Location>> {
        let data = self.begin_read()?;
        Ok(data.locations.get(&pharmacy_id).copied())
    }
}

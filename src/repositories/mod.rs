pub mod inventory_repo;
pub mod pharmacy_repo;
pub mod memory;

pub use inventory_repo::*;
pub use pharmacy_repo::*;
pub use memory::*;

use async_trait::async_trait;
use uuid::Uuid;

use crate::middleware::error_handling::Result;
use crate::models::{InventoryRecord, Location, Pharmacy};

/// Read access to the medicine inventory catalog.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Records whose medicine name contains `name_pattern` (case-insensitive)
    /// and whose quantity is at least `min_quantity`. Unbounded.
    async fn find_matching(&self, name_pattern: &str, min_quantity: i32) -> Result<Vec<InventoryRecord>>;

    /// Case-insensitive name search over all quantities, ordered by medicine
    /// name then pharmacy id.
    async fn search_by_name(&self, name_pattern: &str, limit: i64) -> Result<Vec<InventoryRecord>>;

    /// Every record held by one pharmacy, most recently updated first.
    async fn list_by_pharmacy(&self, pharmacy_id: Uuid) -> Result<Vec<InventoryRecord>>;
}

/// Read access to pharmacies and their coordinates.
#[async_trait]
pub trait PharmacyStore: Send + Sync {
    async fn find_by_id(&self, pharmacy_id: Uuid) -> Result<Option<Pharmacy>>;

    async fn get_location(&self, pharmacy_id: Uuid) -> Result<Option<Location>>;
}

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::middleware::error_handling::{AppError, Result};
use crate::models::{InventoryRecord, LatLng, Location, Pharmacy, SearchResult};
use crate::repositories::{InventoryStore, PharmacyStore};
use crate::services::distance_service::{haversine_km, Coordinate};
use crate::utils::log_sanitizer::sanitize_for_log;

/// Page size of a ranked availability search.
pub const DEFAULT_RESULT_LIMIT: usize = 20;

/// Only records with at least this many units on hand are candidates.
const MIN_IN_STOCK_QUANTITY: i32 = 1;

/// Trims the query and rejects blank input.
pub fn validate_query(raw: &str) -> Result<&str> {
    let query = raw.trim();
    if query.is_empty() {
        return Err(AppError::InvalidQuery("Query is required".to_string()));
    }
    Ok(query)
}

fn parse_degrees(field: &str, raw: &str) -> Result<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AppError::InvalidCoordinates(format!("{} is required", field)));
    }

    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(AppError::InvalidCoordinates(format!("{} must be a number", field))),
    }
}

/// Parses an origin from its wire form. Range is not checked.
pub fn parse_origin(raw_lat: &str, raw_lon: &str) -> Result<Coordinate> {
    Ok(Coordinate::new(
        parse_degrees("lat", raw_lat)?,
        parse_degrees("lng", raw_lon)?,
    ))
}

/// When a pharmacy holds several matching batches, the one with the most
/// units on hand is shown; on equal quantity the first one seen stays.
fn prefer_batch(candidate: &InventoryRecord, current: &InventoryRecord) -> bool {
    candidate.quantity > current.quantity
}

/// Keeps one record per pharmacy, in the order pharmacies were first seen.
fn best_batch_per_pharmacy(candidates: Vec<InventoryRecord>) -> Vec<InventoryRecord> {
    let mut order: Vec<Uuid> = Vec::new();
    let mut best: HashMap<Uuid, InventoryRecord> = HashMap::new();

    for record in candidates {
        match best.entry(record.pharmacy_id) {
            Entry::Vacant(slot) => {
                order.push(record.pharmacy_id);
                slot.insert(record);
            }
            Entry::Occupied(mut slot) => {
                if prefer_batch(&record, slot.get()) {
                    slot.insert(record);
                }
            }
        }
    }

    order
        .into_iter()
        .filter_map(|pharmacy_id| best.remove(&pharmacy_id))
        .collect()
}

fn to_search_result(
    record: InventoryRecord,
    pharmacy: Pharmacy,
    location: Location,
    distance: f64,
) -> SearchResult {
    SearchResult {
        pharmacy_id: pharmacy.id,
        name: pharmacy.name,
        username: pharmacy.username,
        is_open: pharmacy.is_open,
        medicine: record.medicine_name,
        batch_number: record.batch_number,
        expiry_date: record.expiry_date,
        price: record.price_per_unit,
        stock: record.quantity,
        distance,
        location: LatLng::from(location),
    }
}

/// Ranks pharmacies that stock a medicine by distance from an origin.
#[derive(Clone)]
pub struct AvailabilityService {
    inventory: Arc<dyn InventoryStore>,
    pharmacies: Arc<dyn PharmacyStore>,
    result_limit: usize,
}

impl AvailabilityService {
    pub fn new(inventory: Arc<dyn InventoryStore>, pharmacies: Arc<dyn PharmacyStore>) -> Self {
        Self {
            inventory,
            pharmacies,
            result_limit: DEFAULT_RESULT_LIMIT,
        }
    }

    pub fn with_result_limit(mut self, result_limit: usize) -> Self {
        self.result_limit = result_limit;
        self
    }

    pub fn result_limit(&self) -> usize {
        self.result_limit
    }

    /// Validates wire input, then runs [`search_near`](Self::search_near).
    ///
    /// Both validation errors are raised before any store is read.
    pub async fn search(&self, medicine_query: &str, origin_lat: &str, origin_lon: &str) -> Result<Vec<SearchResult>> {
        let query = validate_query(medicine_query)?;
        let origin = parse_origin(origin_lat, origin_lon)?;
        self.search_near(query, origin).await
    }

    pub async fn search_near(&self, medicine_query: &str, origin: Coordinate) -> Result<Vec<SearchResult>> {
        let query = validate_query(medicine_query)?;

        let candidates = self
            .inventory
            .find_matching(query, MIN_IN_STOCK_QUANTITY)
            .await?;
        let candidate_count = candidates.len();

        let retained = best_batch_per_pharmacy(candidates);
        tracing::debug!(
            candidates = candidate_count,
            pharmacies = retained.len(),
            "Availability candidates collapsed per pharmacy"
        );

        let mut results = Vec::with_capacity(retained.len());
        for record in retained {
            let pharmacy_id = record.pharmacy_id;

            let Some(location) = self.pharmacies.get_location(pharmacy_id).await? else {
                tracing::debug!(pharmacy_id = %pharmacy_id, "Skipping pharmacy without location");
                continue;
            };

            let Some(pharmacy) = self.pharmacies.find_by_id(pharmacy_id).await? else {
                tracing::warn!(pharmacy_id = %pharmacy_id, "Inventory references a missing pharmacy");
                continue;
            };

            let distance = haversine_km(origin, location.into());
            if !distance.is_finite() {
                tracing::warn!(pharmacy_id = %pharmacy_id, "Skipping pharmacy with unusable coordinates");
                continue;
            }

            results.push(to_search_result(record, pharmacy, location, distance));
        }

        // sort_by is stable: equal distances keep first-seen order
        results.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        results.truncate(self.result_limit);

        tracing::info!(
            query = %sanitize_for_log(query),
            candidates = candidate_count,
            results = results.len(),
            "Availability search completed"
        );

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::InMemoryCatalog;
    use rust_decimal_macros::dec;

    const KM_PER_DEGREE: f64 = 111.194_926_644_558_73;

    fn service(catalog: &Arc<InMemoryCatalog>) -> AvailabilityService {
        AvailabilityService::new(catalog.clone(), catalog.clone())
    }

    /// A point `km` kilometers due north of the equator/meridian origin.
    fn north_of_origin(km: f64) -> Location {
        Location { latitude: km / KM_PER_DEGREE, longitude: 0.0 }
    }

    fn origin() -> Coordinate {
        Coordinate::new(0.0, 0.0)
    }

    #[tokio::test]
    async fn test_case_insensitive_match() {
        let catalog = Arc::new(InMemoryCatalog::new());
        let p = catalog.add_pharmacy("Apollo", Some(north_of_origin(1.0)));
        catalog.add_stock(p, "Aspirin 500mg", "A1", 10, dec!(0.50));

        let results = service(&catalog).search_near("aspirin", origin()).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].medicine, "Aspirin 500mg");
    }

    #[tokio::test]
    async fn test_zero_stock_excluded() {
        let catalog = Arc::new(InMemoryCatalog::new());
        let empty = catalog.add_pharmacy("Empty Shelves", Some(north_of_origin(1.0)));
        let stocked = catalog.add_pharmacy("Stocked", Some(north_of_origin(3.0)));
        catalog.add_stock(empty, "Aspirin", "A1", 0, dec!(0.50));
        catalog.add_stock(stocked, "Aspirin", "A2", 4, dec!(0.55));

        let results = service(&catalog).search_near("aspirin", origin()).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].pharmacy_id, stocked);
    }

    #[tokio::test]
    async fn test_missing_location_excluded() {
        let catalog = Arc::new(InMemoryCatalog::new());
        let unmapped = catalog.add_pharmacy("Unmapped", None);
        catalog.add_stock(unmapped, "Aspirin", "A1", 10, dec!(0.50));

        let results = service(&catalog).search_near("aspirin", origin()).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_deleted_pharmacy_skipped() {
        let catalog = Arc::new(InMemoryCatalog::new());
        let far = catalog.add_pharmacy("Far", Some(north_of_origin(6.0)));
        let near = catalog.add_pharmacy("Near", Some(north_of_origin(2.0)));
        let deleted = Uuid::new_v4();
        catalog.insert_orphan_location(deleted, north_of_origin(1.0));

        catalog.add_stock(far, "Aspirin", "F1", 3, dec!(0.50));
        catalog.add_stock(deleted, "Aspirin", "D1", 20, dec!(0.40));
        catalog.add_stock(near, "Aspirin", "N1", 7, dec!(0.60));

        let results = service(&catalog).search_near("aspirin", origin()).await.unwrap();
        let ids: Vec<Uuid> = results.iter().map(|r| r.pharmacy_id).collect();
        assert_eq!(ids, vec![near, far]);
    }

    #[tokio::test]
    async fn test_unusable_coordinates_skipped() {
        let catalog = Arc::new(InMemoryCatalog::new());
        let far = catalog.add_pharmacy("Far", Some(north_of_origin(9.0)));
        let broken = catalog.add_pharmacy(
            "Broken Pin",
            Some(Location { latitude: f64::NAN, longitude: 0.0 }),
        );
        let near = catalog.add_pharmacy("Near", Some(north_of_origin(4.0)));

        catalog.add_stock(far, "Aspirin", "F1", 3, dec!(0.50));
        catalog.add_stock(broken, "Aspirin", "B1", 12, dec!(0.45));
        catalog.add_stock(near, "Aspirin", "N1", 7, dec!(0.60));

        let results = service(&catalog).search_near("aspirin", origin()).await.unwrap();
        let ids: Vec<Uuid> = results.iter().map(|r| r.pharmacy_id).collect();
        assert_eq!(ids, vec![near, far]);
        assert!(results.iter().all(|r| r.distance.is_finite() && r.distance >= 0.0));
    }

    #[tokio::test]
    async fn test_one_result_per_pharmacy_keeps_largest_batch() {
        let catalog = Arc::new(InMemoryCatalog::new());
        let p = catalog.add_pharmacy("Two Batches", Some(north_of_origin(2.0)));
        catalog.add_stock(p, "Amoxicillin", "AX-1", 3, dec!(4.00));
        catalog.add_stock(p, "Amoxicillin", "AX-2", 9, dec!(4.20));

        let results = service(&catalog).search_near("amoxi", origin()).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].batch_number, "AX-2");
        assert_eq!(results[0].stock, 9);
    }

    #[tokio::test]
    async fn test_equal_quantity_keeps_first_batch() {
        let catalog = Arc::new(InMemoryCatalog::new());
        let p = catalog.add_pharmacy("Two Batches", Some(north_of_origin(2.0)));
        catalog.add_stock(p, "Amoxicillin", "AX-1", 5, dec!(4.00));
        catalog.add_stock(p, "Amoxicillin", "AX-2", 5, dec!(3.90));

        let results = service(&catalog).search_near("amoxicillin", origin()).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].batch_number, "AX-1");
    }

    #[tokio::test]
    async fn test_results_sorted_by_distance() {
        let catalog = Arc::new(InMemoryCatalog::new());
        for (name, km) in [("Five", 5.0), ("One", 1.0), ("Ten", 10.0)] {
            let p = catalog.add_pharmacy(name, Some(north_of_origin(km)));
            catalog.add_stock(p, "Cetirizine", "C1", 1, dec!(2.00));
        }

        let results = service(&catalog).search_near("cetirizine", origin()).await.unwrap();
        let names: Vec<&str> = results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["One", "Five", "Ten"]);
        assert!((results[0].distance - 1.0).abs() < 1e-6);
        assert!((results[2].distance - 10.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_equal_distances_keep_first_seen_order() {
        let catalog = Arc::new(InMemoryCatalog::new());
        let first = catalog.add_pharmacy("First", Some(north_of_origin(4.0)));
        let second = catalog.add_pharmacy("Second", Some(north_of_origin(4.0)));
        catalog.add_stock(first, "Cetirizine", "C1", 1, dec!(2.00));
        catalog.add_stock(second, "Cetirizine", "C2", 1, dec!(2.00));

        let results = service(&catalog).search_near("cetirizine", origin()).await.unwrap();
        assert_eq!(results[0].pharmacy_id, first);
        assert_eq!(results[1].pharmacy_id, second);
    }

    #[tokio::test]
    async fn test_truncates_to_twenty_nearest() {
        let catalog = Arc::new(InMemoryCatalog::new());
        // Insert farthest first so truncation cannot rely on insertion order
        for km in (1..=25).rev() {
            let p = catalog.add_pharmacy(&format!("Pharmacy {km}"), Some(north_of_origin(km as f64)));
            catalog.add_stock(p, "Metformin", "M1", 30, dec!(1.10));
        }

        let results = service(&catalog).search_near("metformin", origin()).await.unwrap();
        assert_eq!(results.len(), DEFAULT_RESULT_LIMIT);
        assert_eq!(results[0].name, "Pharmacy 1");
        assert_eq!(results[19].name, "Pharmacy 20");
        assert!(results.windows(2).all(|w| w[0].distance <= w[1].distance));
    }

    #[tokio::test]
    async fn test_result_limit_is_configurable() {
        let catalog = Arc::new(InMemoryCatalog::new());
        for km in 1..=5 {
            let p = catalog.add_pharmacy(&format!("Pharmacy {km}"), Some(north_of_origin(km as f64)));
            catalog.add_stock(p, "Metformin", "M1", 30, dec!(1.10));
        }

        let results = service(&catalog)
            .with_result_limit(2)
            .search_near("metformin", origin())
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn test_blank_query_never_touches_store() {
        let catalog = Arc::new(InMemoryCatalog::new());
        let svc = service(&catalog);

        for query in ["", "   ", "\t\n"] {
            let err = svc.search(query, "12.97", "77.59").await.unwrap_err();
            assert!(matches!(err, AppError::InvalidQuery(_)));
        }
        assert_eq!(catalog.read_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_coordinates_never_touch_store() {
        let catalog = Arc::new(InMemoryCatalog::new());
        let svc = service(&catalog);

        for (lat, lng) in [("", "77.59"), ("12.97", ""), ("north", "77.59"), ("NaN", "77.59"), ("12.97", "inf")] {
            let err = svc.search("aspirin", lat, lng).await.unwrap_err();
            assert!(matches!(err, AppError::InvalidCoordinates(_)), "{lat}/{lng}");
        }
        assert_eq!(catalog.read_count(), 0);
    }

    #[test]
    fn test_parse_origin_allows_out_of_range() {
        let origin = parse_origin(" 95.5 ", "-200").unwrap();
        assert_eq!(origin, Coordinate::new(95.5, -200.0));
    }

    #[tokio::test]
    async fn test_no_match_is_empty_not_error() {
        let catalog = Arc::new(InMemoryCatalog::new());
        let results = service(&catalog).search("insulin", "0", "0").await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let catalog = Arc::new(InMemoryCatalog::new());
        let p = catalog.add_pharmacy("Apollo", Some(north_of_origin(1.0)));
        catalog.add_stock(p, "Aspirin", "A1", 10, dec!(0.50));
        catalog.set_unavailable(true);

        let err = service(&catalog).search("aspirin", "0", "0").await.unwrap_err();
        assert!(matches!(err, AppError::StoreUnavailable(_)));
    }

    #[tokio::test]
    async fn test_bangalore_end_to_end() {
        let catalog = Arc::new(InMemoryCatalog::new());
        let origin = Coordinate::new(12.9716, 77.5946);
        let a_location = Location { latitude: 12.9923, longitude: 77.5946 };
        let b_location = Location { latitude: 13.0444, longitude: 77.5946 };

        // Farther pharmacy stocked first
        let b = catalog.add_pharmacy("Pharmacy B", Some(b_location));
        let a = catalog.add_pharmacy("Pharmacy A", Some(a_location));
        catalog.add_stock(b, "Paracetamol", "PB-1", 5, dec!(1.80));
        catalog.add_stock(a, "Paracetamol", "PA-1", 10, dec!(2.00));

        let results = service(&catalog).search("paracet", "12.9716", "77.5946").await.unwrap();
        assert_eq!(results.len(), 2);

        assert_eq!(results[0].pharmacy_id, a);
        assert_eq!(results[0].stock, 10);
        assert_eq!(results[0].price, dec!(2.00));
        assert!((results[0].distance - haversine_km(origin, a_location.into())).abs() < 0.01);
        assert!((results[0].distance - 2.3).abs() < 0.05);

        assert_eq!(results[1].pharmacy_id, b);
        assert_eq!(results[1].stock, 5);
        assert_eq!(results[1].price, dec!(1.80));
        assert!((results[1].distance - haversine_km(origin, b_location.into())).abs() < 0.01);
        assert!((results[1].distance - 8.1).abs() < 0.05);
    }
}

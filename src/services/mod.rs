pub mod distance_service;
pub mod availability_service;
pub mod catalog_service;

pub use distance_service::{haversine_km, Coordinate, EARTH_RADIUS_KM};
pub use availability_service::{AvailabilityService, DEFAULT_RESULT_LIMIT};
pub use catalog_service::CatalogService;

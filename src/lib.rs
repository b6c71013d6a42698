pub mod config;
pub mod models;
pub mod repositories;
pub mod services;
pub mod handlers;
pub mod middleware;
pub mod utils;

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::get,
    Router,
};
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::SearchConfig;
use crate::repositories::{InventoryRepository, InventoryStore, PharmacyRepository, PharmacyStore};
use crate::services::{AvailabilityService, CatalogService};

/// Shared handler state. Services only hold store handles, so cloning per
/// request is cheap.
#[derive(Clone)]
pub struct AppState {
    pub availability: AvailabilityService,
    pub catalog: CatalogService,
}

impl AppState {
    pub fn new(
        inventory: Arc<dyn InventoryStore>,
        pharmacies: Arc<dyn PharmacyStore>,
        search: &SearchConfig,
    ) -> Self {
        Self {
            availability: AvailabilityService::new(inventory.clone(), pharmacies.clone())
                .with_result_limit(search.result_limit),
            catalog: CatalogService::new(inventory, pharmacies),
        }
    }

    /// State backed by the Postgres repositories.
    pub fn from_pool(pool: PgPool, search: &SearchConfig) -> Self {
        Self::new(
            Arc::new(InventoryRepository::new(pool.clone())),
            Arc::new(PharmacyRepository::new(pool)),
            search,
        )
    }
}

fn cors_layer(cors_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!("Invalid CORS origin '{}': {}", origin, e);
                None
            }
        })
        .collect();

    tracing::info!("CORS configured with {} allowed origins", origins.len());

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::ACCEPT, header::CONTENT_TYPE])
}

pub fn create_app(state: AppState, cors_origins: &[String]) -> Router {
    use crate::handlers::{
        health::health_check,
        pharmacy::{get_pharmacy, list_medicines},
        search::{search_medicines, search_pharmacies},
    };

    Router::new()
        .nest(
            "/api/search",
            Router::new()
                .route("/pharmacy", get(search_pharmacies))
                .route("/medicine", get(search_medicines)),
        )
        .nest(
            "/api/pharmacies",
            Router::new()
                .route("/:id", get(get_pharmacy))
                .route("/:id/medicines", get(list_medicines)),
        )
        .route("/api/health", get(health_check))
        .route("/metrics", get(middleware::metrics_handler))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(axum_middleware::from_fn(middleware::request_id_middleware))
                .layer(axum_middleware::from_fn(middleware::metrics_middleware))
                .layer(cors_layer(cors_origins)),
        )
}

use axum::{
    extract::{rejection::PathRejection, Path, State},
    Json,
};
use uuid::Uuid;

use crate::{
    middleware::error_handling::Result,
    models::{MedicineListResponse, PharmacyProfile},
    AppState,
};

pub async fn get_pharmacy(
    State(state): State<AppState>,
    path: std::result::Result<Path<Uuid>, PathRejection>,
) -> Result<Json<PharmacyProfile>> {
    let Path(pharmacy_id) = path?;
    let profile = state.catalog.get_pharmacy(pharmacy_id).await?;
    Ok(Json(profile))
}

pub async fn list_medicines(
    State(state): State<AppState>,
    path: std::result::Result<Path<Uuid>, PathRejection>,
) -> Result<Json<MedicineListResponse>> {
    let Path(pharmacy_id) = path?;
    let medicines = state.catalog.list_medicines(pharmacy_id).await?;
    Ok(Json(MedicineListResponse { medicines }))
}

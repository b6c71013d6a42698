use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Extension, Json,
};

use crate::{
    middleware::{error_handling::Result, metrics::record_search_results, RequestId},
    models::{AvailabilitySearchParams, CatalogEntry, CatalogSearchParams, SearchResponse},
    utils::sanitize_option_for_log,
    AppState,
};

/// `GET /api/search/pharmacy?q=&lat=&lng=`
pub async fn search_pharmacies(
    State(state): State<AppState>,
    request_id: Option<Extension<RequestId>>,
    query: std::result::Result<Query<AvailabilitySearchParams>, QueryRejection>,
) -> Result<Json<SearchResponse>> {
    let Query(params) = query?;
    if let Some(Extension(request_id)) = request_id {
        tracing::debug!(
            request_id = %request_id,
            query = %sanitize_option_for_log(params.q.as_deref()),
            "Availability search requested"
        );
    }

    let results = state
        .availability
        .search(
            params.q.as_deref().unwrap_or_default(),
            params.lat.as_deref().unwrap_or_default(),
            params.lng.as_deref().unwrap_or_default(),
        )
        .await?;

    record_search_results("availability", results.len());
    Ok(Json(SearchResponse { results }))
}

/// `GET /api/search/medicine?q=&limit=`
pub async fn search_medicines(
    State(state): State<AppState>,
    query: std::result::Result<Query<CatalogSearchParams>, QueryRejection>,
) -> Result<Json<Vec<CatalogEntry>>> {
    let Query(params) = query?;

    let entries = state
        .catalog
        .search_catalog(params.q.as_deref().unwrap_or_default(), params.limit)
        .await?;

    record_search_results("catalog", entries.len());
    Ok(Json(entries))
}

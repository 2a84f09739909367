use crate::error::ApiError;
use crate::state::AppState;
use api_shared::{ErrorRes, ListPersonasRes, MetricsRes};
use axum::{extract::State, Json};
use chrono::Utc;
use triage_core::metrics;

#[utoipa::path(
    get,
    path = "/personas",
    responses(
        (status = 200, description = "Every persona with its view and permitted actions", body = ListPersonasRes)
    )
)]
/// List personas
#[axum::debug_handler]
pub async fn list_personas(State(_state): State<AppState>) -> Json<ListPersonasRes> {
    Json(ListPersonasRes::all())
}

#[utoipa::path(
    get,
    path = "/metrics",
    responses(
        (status = 200, description = "Registry-wide management metrics", body = MetricsRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Management metrics over the whole registry
///
/// # Returns
/// * `Ok(Json<MetricsRes>)` - Counts by status, urgent volume, department split, booking
///   rate, average wait and the current bottleneck
#[axum::debug_handler]
pub async fn management_metrics(
    State(state): State<AppState>,
) -> Result<Json<MetricsRes>, ApiError> {
    let patients = state.repo.list()?;
    let today = Utc::now().date_naive();
    Ok(Json(metrics::compute(&patients, today).into()))
}

//! Server-side advisory sessions, one per patient.

use crate::error::ApiError;
use crate::extract::{ApiPath, ApiQuery};
use crate::routes::patients::patient_id;
use crate::state::AppState;
use api_shared::{AdvisoryStartQuery, AdvisoryStateRes, ErrorRes};
use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use triage_advisor::{AdvisoryState, AnalysisInput};

#[utoipa::path(
    post,
    path = "/patients/{id}/advisory",
    params(
        ("id" = String, Path, description = "Patient identifier"),
        ("refresh" = Option<bool>, Query, description = "Re-run even if a result is cached")
    ),
    responses(
        (status = 202, description = "Analysis started", body = AdvisoryStateRes),
        (status = 200, description = "Cached result for unchanged input", body = AdvisoryStateRes),
        (status = 404, description = "Patient not found", body = ErrorRes)
    )
)]
/// Start an advisory for a patient
///
/// Runs in the background; poll with `GET`. A finished advisory for the same narrative is
/// returned as is unless `refresh=true`.
#[axum::debug_handler]
pub async fn start_advisory(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiQuery(query): ApiQuery<AdvisoryStartQuery>,
) -> Result<(StatusCode, Json<AdvisoryStateRes>), ApiError> {
    let id = patient_id(&id)?;
    let patient = state.repo.get(&id)?;
    let advisory = state
        .advisories
        .start(id.as_str(), AnalysisInput::from(&patient), query.refresh);
    let status = if advisory.is_pending() {
        StatusCode::ACCEPTED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(advisory.into())))
}

#[utoipa::path(
    get,
    path = "/patients/{id}/advisory",
    params(("id" = String, Path, description = "Patient identifier")),
    responses(
        (status = 200, description = "Current advisory state", body = AdvisoryStateRes),
        (status = 404, description = "Patient not found", body = ErrorRes)
    )
)]
/// Poll a patient's advisory
#[axum::debug_handler]
pub async fn get_advisory(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<AdvisoryStateRes>, ApiError> {
    let id = patient_id(&id)?;
    state.repo.get(&id)?;
    Ok(Json(state.advisories.state(id.as_str()).into()))
}

#[utoipa::path(
    delete,
    path = "/patients/{id}/advisory",
    params(("id" = String, Path, description = "Patient identifier")),
    responses(
        (status = 200, description = "Advisory cancelled and forgotten", body = AdvisoryStateRes),
        (status = 404, description = "Patient not found", body = ErrorRes)
    )
)]
/// Cancel a patient's advisory
///
/// Aborts any in-flight analysis; the state returns to `idle`.
#[axum::debug_handler]
pub async fn cancel_advisory(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<AdvisoryStateRes>, ApiError> {
    let id = patient_id(&id)?;
    state.repo.get(&id)?;
    state.advisories.cancel(id.as_str());
    Ok(Json(AdvisoryState::Idle.into()))
}

//! `POST /api/analyze`: stateless proxy to the completion API.

use crate::error::{from_json_value, json_body, ApiError};
use crate::state::AppState;
use api_shared::{AdvisoryRes, AnalyzePatient, AnalyzeReq, ErrorRes};
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::{post, MethodRouter},
    Json,
};
use triage_advisor::AnalysisInput;

/// `POST` analyses, `OPTIONS` answers 200 with no body, anything else is 405.
pub fn method_router() -> MethodRouter<AppState> {
    post(analyze)
        .options(preflight)
        .fallback(method_not_allowed)
}

#[utoipa::path(
    post,
    path = "/api/analyze",
    request_body = AnalyzeReq,
    responses(
        (status = 200, description = "Validated advisory", body = AdvisoryRes),
        (status = 400, description = "Missing or malformed patient", body = ErrorRes),
        (status = 405, description = "Method not allowed", body = ErrorRes),
        (status = 500, description = "Completion call or advisory validation failed", body = ErrorRes)
    )
)]
/// Analyse a referral narrative
///
/// Builds the triage prompt from the posted patient, calls the completion API once and
/// returns the advisory after validating it.
///
/// # Returns
/// * `Ok(Json<AdvisoryRes>)` - The four advisory fields
///
/// # Errors
/// Returns `400 Bad Request` if:
/// - the body is not JSON,
/// - `patient` is missing or not an object, or
/// - `patient` lacks `name`, `gpNote` or `history`.
///
/// Returns `500 Internal Server Error` if the completion call fails or its reply is not a
/// valid advisory.
#[axum::debug_handler]
pub async fn analyze(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<AdvisoryRes>, ApiError> {
    let value = if body.iter().all(u8::is_ascii_whitespace) {
        serde_json::Value::Null
    } else {
        json_body(&body)?
    };
    let patient = match value.get("patient") {
        Some(patient) if patient.is_object() => patient.clone(),
        _ => return Err(ApiError::bad_request("Patient data is required")),
    };
    let patient: AnalyzePatient = from_json_value(patient, "Invalid patient data")?;
    let input = AnalysisInput::from(patient);

    tracing::info!(patient = %input.name, "analysing referral");
    let advisory = state.advisor.analyze(&input).await?;
    Ok(Json(advisory.into()))
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

use crate::error::{from_json_value, json_body, ApiError};
use crate::extract::{ApiPath, ApiQuery};
use crate::state::AppState;
use api_shared::{
    ClinicRes, ErrorRes, InsightsRes, ListClinicsRes, ListPatientsRes, PatientRes, TransitionReq,
    TransitionRes,
};
use axum::{
    body::Bytes,
    extract::State,
    Json,
};
use chrono::Utc;
use referral::PatientId;
use serde::Deserialize;
use triage_core::{clinics, insights, personas, ClinicFocus, Persona, TriageError};
use utoipa::IntoParams;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListPatientsQuery {
    /// Persona whose view to return, e.g. `clinician`. Omit for every patient.
    pub persona: Option<String>,
    /// `all`, `urgent` or `routine`.
    pub focus: Option<String>,
}

pub(crate) fn patient_id(id: &str) -> Result<PatientId, ApiError> {
    PatientId::new(id).map_err(|e| ApiError::Triage(TriageError::Referral(e)))
}

#[utoipa::path(
    get,
    path = "/patients",
    params(ListPatientsQuery),
    responses(
        (status = 200, description = "Patients visible to the persona", body = ListPatientsRes),
        (status = 400, description = "Unknown persona or focus", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// List patients, optionally as a persona sees them
///
/// # Returns
/// * `Ok(Json<ListPatientsRes>)` - Patients in registry order
///
/// # Errors
/// Returns `400 Bad Request` if `persona` or `focus` is not recognised.
#[axum::debug_handler]
pub async fn list_patients(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListPatientsQuery>,
) -> Result<Json<ListPatientsRes>, ApiError> {
    let focus: ClinicFocus = query.focus.as_deref().unwrap_or_default().parse()?;
    let patients = state.repo.list()?;

    let visible: Vec<PatientRes> = match query.persona.as_deref() {
        Some(persona) => {
            let persona: Persona = persona.parse()?;
            personas::filter_with_focus(persona, focus, &patients)
                .into_iter()
                .map(PatientRes::from)
                .collect()
        }
        None => patients
            .iter()
            .filter(|p| focus.admits(p.effective_urgency()))
            .map(PatientRes::from)
            .collect(),
    };
    Ok(Json(ListPatientsRes { patients: visible }))
}

#[utoipa::path(
    get,
    path = "/patients/{id}",
    params(("id" = String, Path, description = "Patient identifier")),
    responses(
        (status = 200, description = "Patient record", body = PatientRes),
        (status = 404, description = "Patient not found", body = ErrorRes)
    )
)]
/// Read one patient
#[axum::debug_handler]
pub async fn get_patient(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<PatientRes>, ApiError> {
    let patient = state.repo.get(&patient_id(&id)?)?;
    Ok(Json(PatientRes::from(&patient)))
}

#[utoipa::path(
    post,
    path = "/patients/{id}/transitions",
    params(("id" = String, Path, description = "Patient identifier")),
    request_body = TransitionReq,
    responses(
        (status = 200, description = "Transition applied", body = TransitionRes),
        (status = 400, description = "Malformed request", body = ErrorRes),
        (status = 403, description = "Actor may not perform this transition", body = ErrorRes),
        (status = 404, description = "Patient not found", body = ErrorRes),
        (status = 409, description = "Transition not valid from the current status", body = ErrorRes)
    )
)]
/// Move a referral along the workflow
///
/// The body names either the edge (`kind`) or the proposed `status`, plus the persona
/// acting and any fields the edge needs (`urgency` and `procedure` to triage, `slot` to
/// book, `reason` to reject).
///
/// # Returns
/// * `Ok(Json<TransitionRes>)` - The updated patient and a confirmation message
///
/// # Errors
/// Returns `409 Conflict` if the edge does not leave the current status, and
/// `403 Forbidden` if the edge exists but the actor may not take it.
#[axum::debug_handler]
pub async fn transition_patient(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    body: Bytes,
) -> Result<Json<TransitionRes>, ApiError> {
    let id = patient_id(&id)?;
    let req: TransitionReq = from_json_value(json_body(&body)?, "Invalid transition request")?;
    let (actor, request) = req.into_request()?;
    let receipt = state.repo.apply(&id, &request, actor)?;
    Ok(Json(receipt.into()))
}

#[utoipa::path(
    get,
    path = "/patients/{id}/insights",
    params(("id" = String, Path, description = "Patient identifier")),
    responses(
        (status = 200, description = "Pathway timeline and risk assessment", body = InsightsRes),
        (status = 404, description = "Patient not found", body = ErrorRes)
    )
)]
/// Clinician insights for one patient, measured against today's date
#[axum::debug_handler]
pub async fn patient_insights(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<InsightsRes>, ApiError> {
    let patient = state.repo.get(&patient_id(&id)?)?;
    let today = Utc::now().date_naive();
    Ok(Json(insights::insights(&patient, today).into()))
}

#[utoipa::path(
    get,
    path = "/patients/{id}/clinics",
    params(("id" = String, Path, description = "Patient identifier")),
    responses(
        (status = 200, description = "Clinics with capacity for the patient's urgency", body = ListClinicsRes),
        (status = 404, description = "Patient not found", body = ErrorRes)
    )
)]
/// Suitable clinics for booking a patient
#[axum::debug_handler]
pub async fn patient_clinics(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<ListClinicsRes>, ApiError> {
    let patient = state.repo.get(&patient_id(&id)?)?;
    let clinics = clinics::for_patient(&patient)
        .into_iter()
        .map(ClinicRes::from)
        .collect();
    Ok(Json(ListClinicsRes { clinics }))
}

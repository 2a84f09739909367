//! # API REST
//!
//! REST API for the referral triage service.
//!
//! Handles:
//! - `POST /api/analyze`, the stateless proxy to the completion API
//! - patient listing, persona views and workflow transitions
//! - management metrics, clinician insights and clinic suggestions
//! - per-patient advisory sessions
//! - OpenAPI/Swagger documentation and CORS
//!
//! Uses `api-shared` for request/response types.

#![warn(rust_2018_idioms)]

mod error;
mod extract;
mod routes;
mod state;

pub use error::ApiError;
pub use state::AppState;

use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use routes::{advisory, analyze, health, patients, reports};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        analyze::analyze,
        reports::list_personas,
        reports::management_metrics,
        patients::list_patients,
        patients::get_patient,
        patients::transition_patient,
        patients::patient_insights,
        patients::patient_clinics,
        advisory::start_advisory,
        advisory::get_advisory,
        advisory::cancel_advisory,
    ),
    components(schemas(
        api_shared::HealthRes,
        api_shared::ErrorRes,
        api_shared::AnalyzeReq,
        api_shared::AnalyzePatient,
        api_shared::AdvisoryRes,
        api_shared::AdvisoryStateRes,
        api_shared::PatientRes,
        api_shared::ListPatientsRes,
        api_shared::TransitionReq,
        api_shared::TransitionRes,
        api_shared::PersonaRes,
        api_shared::ListPersonasRes,
        api_shared::MetricsRes,
        api_shared::reports::CountRes,
        api_shared::reports::DepartmentShareRes,
        api_shared::InsightsRes,
        api_shared::ClinicRes,
        api_shared::ListClinicsRes,
    ))
)]
pub struct ApiDoc;

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

/// Build the REST router over `state`, with Swagger UI at `/swagger-ui`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/analyze", analyze::method_router())
        .route("/personas", get(reports::list_personas))
        .route("/metrics", get(reports::management_metrics))
        .route("/patients", get(patients::list_patients))
        .route("/patients/:id", get(patients::get_patient))
        .route("/patients/:id/transitions", post(patients::transition_patient))
        .route("/patients/:id/insights", get(patients::patient_insights))
        .route("/patients/:id/clinics", get(patients::patient_clinics))
        .route(
            "/patients/:id/advisory",
            post(advisory::start_advisory)
                .get(advisory::get_advisory)
                .delete(advisory::cancel_advisory),
        )
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors())
        .with_state(state)
}

//! # API Shared
//!
//! Shared definitions for the triage APIs.
//!
//! Contains:
//! - Request/response DTOs with OpenAPI schemas (`patients`, `personas`, `advisory`, `reports`)
//! - Shared services like `HealthService`
//!
//! Used by `api-rest` and the `triage` CLI so both render the same shapes.

pub mod advisory;
pub mod health;
pub mod patients;
pub mod personas;
pub mod reports;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub use advisory::{AdvisoryRes, AdvisoryStartQuery, AdvisoryStateRes, AnalyzePatient, AnalyzeReq};
pub use health::{HealthRes, HealthService};
pub use patients::{ListPatientsRes, PatientRes, TransitionReq, TransitionRes};
pub use personas::{ListPersonasRes, PersonaRes};
pub use reports::{ClinicRes, InsightsRes, ListClinicsRes, MetricsRes};

/// JSON error body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorRes {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: None,
        }
    }

    pub fn with_message(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: Some(message.into()),
        }
    }
}

use api_shared::ErrorRes;
use axum::{
    extract::rejection::{PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use triage_advisor::AdvisorError;
use triage_core::TriageError;

#[derive(Debug)]
pub enum ApiError {
    /// Malformed or incomplete request body.
    BadRequest {
        error: &'static str,
        message: Option<String>,
    },
    MethodNotAllowed,
    Triage(TriageError),
    Analysis(AdvisorError),
}

impl ApiError {
    pub fn bad_request(error: &'static str) -> Self {
        ApiError::BadRequest {
            error,
            message: None,
        }
    }
}

impl From<TriageError> for ApiError {
    fn from(e: TriageError) -> Self {
        ApiError::Triage(e)
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest {
            error: "Invalid path",
            message: Some(rejection.body_text()),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest {
            error: "Invalid query",
            message: Some(rejection.body_text()),
        }
    }
}

impl From<AdvisorError> for ApiError {
    fn from(e: AdvisorError) -> Self {
        ApiError::Analysis(e)
    }
}

fn triage_status(e: &TriageError) -> (StatusCode, &'static str) {
    match e {
        TriageError::InvalidInput(_) | TriageError::Referral(_) => {
            (StatusCode::BAD_REQUEST, "Invalid input")
        }
        TriageError::Unauthorized { .. } => (StatusCode::FORBIDDEN, "Unauthorized"),
        TriageError::PatientNotFound(_) => (StatusCode::NOT_FOUND, "Patient not found"),
        TriageError::InvalidTransition { .. } => (StatusCode::CONFLICT, "Invalid transition"),
        TriageError::SeedRead { .. } | TriageError::StorePoisoned => {
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest { error, message } => (
                StatusCode::BAD_REQUEST,
                ErrorRes {
                    error: error.into(),
                    message,
                },
            ),
            ApiError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                ErrorRes::new("Method not allowed"),
            ),
            ApiError::Triage(e) => {
                let (status, error) = triage_status(&e);
                if status.is_server_error() {
                    tracing::error!("Triage error: {:?}", e);
                    (status, ErrorRes::new(error))
                } else {
                    (status, ErrorRes::with_message(error, e.to_string()))
                }
            }
            ApiError::Analysis(e) => {
                tracing::error!("Analysis error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorRes::with_message("Analysis failed", e.to_string()),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

/// Deserialize `value`, naming the offending field on failure.
pub fn from_json_value<T: DeserializeOwned>(
    value: serde_json::Value,
    error: &'static str,
) -> Result<T, ApiError> {
    serde_path_to_error::deserialize(value).map_err(|e| ApiError::BadRequest {
        error,
        message: Some(e.to_string()),
    })
}

/// Parse a raw request body as JSON.
pub fn json_body(bytes: &[u8]) -> Result<serde_json::Value, ApiError> {
    serde_json::from_slice(bytes).map_err(|e| ApiError::BadRequest {
        error: "Invalid request body",
        message: Some(e.to_string()),
    })
}

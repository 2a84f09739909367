use std::sync::Arc;
use triage_advisor::{Advisor, AdvisorySession};
use triage_core::PatientRepository;

/// Application state for the REST API server
///
/// Shared by every handler: the patient repository, the advisor used by the stateless
/// `/api/analyze` proxy, and the keyed advisory sessions behind `/patients/{id}/advisory`.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn PatientRepository>,
    pub advisor: Advisor,
    pub advisories: Arc<AdvisorySession>,
}

impl AppState {
    pub fn new(repo: Arc<dyn PatientRepository>, advisor: Advisor) -> Self {
        Self {
            repo,
            advisories: Arc::new(AdvisorySession::new(advisor.clone())),
            advisor,
        }
    }
}

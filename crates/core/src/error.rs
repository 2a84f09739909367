use crate::personas::Persona;
use crate::workflow::TransitionKind;
use referral::{PatientId, ReferralStatus};

#[derive(Debug, thiserror::Error)]
pub enum TriageError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("cannot {verb} a referral in {from}", verb = transition.verb())]
    InvalidTransition {
        from: ReferralStatus,
        transition: TransitionKind,
    },
    #[error("{actor} is not permitted to {verb} a referral", verb = transition.verb())]
    Unauthorized {
        actor: Persona,
        transition: TransitionKind,
    },

    #[error("patient not found: {0}")]
    PatientNotFound(PatientId),

    #[error("referral error: {0}")]
    Referral(#[from] referral::ReferralError),
    #[error(
        "failed to read seed registry {path}: {source}",
        path = path.display()
    )]
    SeedRead {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("patient store lock poisoned")]
    StorePoisoned,
}

pub type TriageResult<T> = std::result::Result<T, TriageError>;

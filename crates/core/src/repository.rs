//! Patient repository.
//!
//! Persona views and the API read and change patients only through [`PatientRepository`].
//! The in-memory implementation keeps registry order, never deletes, and replaces a record
//! atomically under its write lock (last write wins).

use crate::personas::Persona;
use crate::workflow::{self, TransitionReceipt, TransitionRequest};
use crate::{TriageError, TriageResult};
use chrono::Utc;
use referral::{Patient, PatientId};
use std::sync::RwLock;

pub trait PatientRepository: Send + Sync {
    /// All patients in registry order.
    fn list(&self) -> TriageResult<Vec<Patient>>;

    fn get(&self, id: &PatientId) -> TriageResult<Patient>;

    /// Validate and apply a transition to one patient.
    fn apply(
        &self,
        id: &PatientId,
        request: &TransitionRequest,
        actor: Persona,
    ) -> TriageResult<TransitionReceipt>;
}

#[derive(Debug, Default)]
pub struct InMemoryRepository {
    patients: RwLock<Vec<Patient>>,
}

impl InMemoryRepository {
    pub fn new(patients: Vec<Patient>) -> Self {
        Self {
            patients: RwLock::new(patients),
        }
    }
}

impl PatientRepository for InMemoryRepository {
    fn list(&self) -> TriageResult<Vec<Patient>> {
        let patients = self.patients.read().map_err(|_| TriageError::StorePoisoned)?;
        Ok(patients.clone())
    }

    fn get(&self, id: &PatientId) -> TriageResult<Patient> {
        let patients = self.patients.read().map_err(|_| TriageError::StorePoisoned)?;
        patients
            .iter()
            .find(|p| p.id() == id)
            .cloned()
            .ok_or_else(|| TriageError::PatientNotFound(id.clone()))
    }

    fn apply(
        &self,
        id: &PatientId,
        request: &TransitionRequest,
        actor: Persona,
    ) -> TriageResult<TransitionReceipt> {
        let mut patients = self.patients.write().map_err(|_| TriageError::StorePoisoned)?;
        let record = patients
            .iter_mut()
            .find(|p| p.id() == id)
            .ok_or_else(|| TriageError::PatientNotFound(id.clone()))?;

        let from = record.status();
        match workflow::apply_request(record, request, actor, Utc::now()) {
            Ok(receipt) => {
                tracing::info!(
                    patient_id = %id,
                    %actor,
                    %from,
                    to = %receipt.patient.status(),
                    "referral transitioned"
                );
                *record = receipt.patient.clone();
                Ok(receipt)
            }
            Err(e) => {
                tracing::warn!(patient_id = %id, %actor, %from, "transition refused: {e}");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::personas;
    use crate::seed;
    use crate::workflow::{Transition, TransitionParts};
    use referral::ReferralStatus;
    use std::sync::Arc;

    fn repo() -> InMemoryRepository {
        InMemoryRepository::new(seed::embedded().expect("seed"))
    }

    fn id(value: &str) -> PatientId {
        PatientId::new(value).expect("id")
    }

    #[test]
    fn validated_patient_appears_in_clinician_view() {
        let repo = repo();
        let receipt = repo
            .apply(&id("2"), &Transition::Validate.into(), Persona::Intake)
            .expect("validate");
        assert_eq!(receipt.patient.status(), ReferralStatus::TriagePending);

        let patients = repo.list().expect("list");
        let clinician: Vec<_> = personas::filter(Persona::Clinician, &patients)
            .into_iter()
            .map(|p| p.id().as_str().to_owned())
            .collect();
        assert_eq!(clinician, vec!["1", "2", "3"]);
    }

    #[test]
    fn list_preserves_order_after_update() {
        let repo = repo();
        repo.apply(&id("5"), &Transition::Validate.into(), Persona::Intake)
            .expect("validate");
        let ids: Vec<_> = repo
            .list()
            .expect("list")
            .iter()
            .map(|p| p.id().as_str().to_owned())
            .collect();
        assert_eq!(ids, vec!["1", "2", "3", "4", "5", "6"]);
    }

    #[test]
    fn refused_transition_leaves_record_untouched() {
        let repo = repo();
        let before = repo.get(&id("6")).expect("get");
        let request = TransitionRequest::ToStatus {
            status: ReferralStatus::TriagePending,
            parts: TransitionParts::default(),
        };
        let err = repo
            .apply(&id("6"), &request, Persona::Intake)
            .expect_err("confirmed is terminal");
        assert!(matches!(err, TriageError::InvalidTransition { .. }));
        assert_eq!(repo.get(&id("6")).expect("get"), before);
    }

    #[test]
    fn unknown_patient_is_not_found() {
        let repo = repo();
        assert!(matches!(
            repo.get(&id("99")),
            Err(TriageError::PatientNotFound(_))
        ));
        assert!(matches!(
            repo.apply(&id("99"), &Transition::Validate.into(), Persona::Intake),
            Err(TriageError::PatientNotFound(_))
        ));
    }

    #[test]
    fn concurrent_validations_apply_once() {
        let repo = Arc::new(repo());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let repo = Arc::clone(&repo);
                std::thread::spawn(move || {
                    repo.apply(&id("2"), &Transition::Validate.into(), Persona::Intake)
                        .is_ok()
                })
            })
            .collect();
        let successes = handles
            .into_iter()
            .map(|h| h.join().expect("thread"))
            .filter(|ok| *ok)
            .count();
        assert_eq!(successes, 1);
        assert_eq!(
            repo.get(&id("2")).expect("get").status(),
            ReferralStatus::TriagePending
        );
    }
}

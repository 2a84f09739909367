//! Patient and transition DTOs.

use referral::{Patient, ReferralStatus, Urgency};
use serde::{Deserialize, Serialize};
use triage_core::{
    Persona, TransitionKind, TransitionParts, TransitionReceipt, TransitionRequest, TriageError,
    TriageResult,
};
use utoipa::ToSchema;

/// Flat view of a patient record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientRes {
    pub id: String,
    pub name: String,
    pub dob: String,
    pub mrn: String,
    /// ISO calendar date.
    pub referral_date: String,
    pub department: Option<String>,
    pub gp_note: String,
    pub history: String,
    pub comorbidities: Vec<String>,
    pub status: String,
    /// Urgency suggested by the GP at intake.
    pub suggested_urgency: String,
    /// Urgency assigned at triage.
    pub assigned_urgency: Option<String>,
    /// Assigned urgency if triaged, else the GP suggestion.
    pub urgency: String,
    pub requested_procedure: Option<String>,
    pub procedure: Option<String>,
    pub slot: Option<String>,
    pub waiting_days: Option<u32>,
    /// RFC 3339 timestamp of the last transition.
    pub last_updated: Option<String>,
}

impl From<&Patient> for PatientRes {
    fn from(p: &Patient) -> Self {
        Self {
            id: p.id().to_string(),
            name: p.name().to_string(),
            dob: p.dob().to_string(),
            mrn: p.mrn().to_string(),
            referral_date: p.referral_date().to_string(),
            department: p.department().map(|d| d.to_string()),
            gp_note: p.gp_note().to_string(),
            history: p.history().to_string(),
            comorbidities: p.comorbidities().to_strings(),
            status: p.status().to_string(),
            suggested_urgency: p.suggested_urgency().to_string(),
            assigned_urgency: p.assigned_urgency().map(|u| u.to_string()),
            urgency: p.effective_urgency().to_string(),
            requested_procedure: p.requested_procedure().map(|s| s.to_string()),
            procedure: p.procedure().map(|s| s.to_string()),
            slot: p.stage().slot().map(|s| s.to_string()),
            waiting_days: p.waiting_days(),
            last_updated: p.last_updated().map(|t| t.to_rfc3339()),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ListPatientsRes {
    pub patients: Vec<PatientRes>,
}

/// Request to move a referral along the workflow.
///
/// Name the edge with `kind`, or propose a target `status` and let the service resolve the
/// edge from the referral's current stage. Exactly one of the two is required.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TransitionReq {
    /// Persona performing the transition, e.g. `clinician` or `waiting-list`.
    pub actor: String,
    /// `validate`, `triage`, `book`, `confirm`, `request-form`, `return-form` or `reject`.
    #[serde(default)]
    pub kind: Option<String>,
    /// Proposed status, e.g. `Triage Pending`.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub urgency: Option<String>,
    #[serde(default)]
    pub procedure: Option<String>,
    #[serde(default)]
    pub slot: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

impl TransitionReq {
    /// Parse into the acting persona and a workflow request.
    ///
    /// # Errors
    ///
    /// Returns [`TriageError::InvalidInput`] for unknown names, or when `kind` and `status`
    /// are both or neither present.
    pub fn into_request(self) -> TriageResult<(Persona, TransitionRequest)> {
        let actor: Persona = self.actor.parse()?;
        let urgency = self
            .urgency
            .as_deref()
            .map(str::parse::<Urgency>)
            .transpose()
            .map_err(|e| TriageError::InvalidInput(e.to_string()))?;
        let parts = TransitionParts {
            urgency,
            procedure: self.procedure,
            slot: self.slot,
            reason: self.reason,
        };

        let request = match (self.kind, self.status) {
            (Some(kind), None) => {
                let kind: TransitionKind = kind.parse()?;
                TransitionRequest::Edge(triage_core::Transition::from_parts(kind, &parts)?)
            }
            (None, Some(status)) => {
                let status: ReferralStatus = status
                    .parse()
                    .map_err(|e: referral::ReferralError| TriageError::InvalidInput(e.to_string()))?;
                TransitionRequest::ToStatus { status, parts }
            }
            _ => {
                return Err(TriageError::InvalidInput(
                    "exactly one of kind or status is required".into(),
                ))
            }
        };
        Ok((actor, request))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct TransitionRes {
    pub patient: PatientRes,
    /// Confirmation message for display.
    pub message: String,
}

impl From<TransitionReceipt> for TransitionRes {
    fn from(receipt: TransitionReceipt) -> Self {
        Self {
            patient: PatientRes::from(&receipt.patient),
            message: receipt.message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use triage_core::seed;

    #[test]
    fn patient_res_uses_display_strings() {
        let patients = seed::embedded().expect("seed");
        let harrison = PatientRes::from(&patients[3]);
        assert_eq!(harrison.status, "Awaiting Scheduling");
        assert_eq!(harrison.department.as_deref(), Some("Plastic Surgery"));
        assert_eq!(harrison.assigned_urgency.as_deref(), Some("Urgent"));
        assert_eq!(harrison.referral_date, "2024-05-10");

        let smith = PatientRes::from(&patients[1]);
        let value = serde_json::to_value(&smith).expect("serialise");
        assert_eq!(value["comorbidities"], serde_json::json!([]));
        assert_eq!(value["gpNote"], smith.gp_note);
    }

    #[test]
    fn transition_req_by_kind() {
        let req = TransitionReq {
            actor: "clinician".into(),
            kind: Some("triage".into()),
            urgency: Some("2WW".into()),
            procedure: Some("Two Week Wait Clinic".into()),
            ..TransitionReq::default()
        };
        let (actor, request) = req.into_request().expect("request");
        assert_eq!(actor, Persona::Clinician);
        match request {
            TransitionRequest::Edge(edge) => assert_eq!(edge.kind(), TransitionKind::Triage),
            other => panic!("expected edge, got {other:?}"),
        }
    }

    #[test]
    fn transition_req_by_status() {
        let req = TransitionReq {
            actor: "intake".into(),
            status: Some("Triage Pending".into()),
            ..TransitionReq::default()
        };
        let (_, request) = req.into_request().expect("request");
        assert!(matches!(
            request,
            TransitionRequest::ToStatus {
                status: ReferralStatus::TriagePending,
                ..
            }
        ));
    }

    #[test]
    fn transition_req_rejects_ambiguous_or_unknown() {
        let both = TransitionReq {
            actor: "intake".into(),
            kind: Some("validate".into()),
            status: Some("Triage Pending".into()),
            ..TransitionReq::default()
        };
        assert!(matches!(both.into_request(), Err(TriageError::InvalidInput(_))));

        let unknown = TransitionReq {
            actor: "porter".into(),
            kind: Some("validate".into()),
            ..TransitionReq::default()
        };
        assert!(matches!(unknown.into_request(), Err(TriageError::InvalidInput(_))));

        let bad_urgency = TransitionReq {
            actor: "clinician".into(),
            kind: Some("triage".into()),
            urgency: Some("Whenever".into()),
            procedure: Some("Clinic".into()),
            ..TransitionReq::default()
        };
        assert!(matches!(
            bad_urgency.into_request(),
            Err(TriageError::InvalidInput(_))
        ));
    }
}

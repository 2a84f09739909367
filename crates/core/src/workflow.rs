//! Referral status workflow.
//!
//! Every change to a referral goes through [`transition`], which checks two things in order:
//!
//! 1. the edge: the requested [`Transition`] must leave the record's current stage
//!    ([`TriageError::InvalidTransition`] otherwise),
//! 2. the actor: the persona must hold the permission attached to that edge
//!    ([`TriageError::Unauthorized`] otherwise).
//!
//! Checking the edge first means a terminal record always reports `InvalidTransition`,
//! whoever asks. A successful transition returns a new record in which only the stage and
//! `last_updated` differ from the input.
//!
//! Edges:
//!
//! | Transition    | From                                  | To                  | Actors                          |
//! |---------------|---------------------------------------|---------------------|---------------------------------|
//! | `Validate`    | Intake Review                         | Triage Pending      | Intake                          |
//! | `Triage`      | Triage Pending                        | Awaiting Scheduling | Clinician                       |
//! | `Book`        | Awaiting Scheduling                   | Scheduled           | PAC, Waiting List               |
//! | `Confirm`     | Scheduled                             | Confirmed           | Waiting List                    |
//! | `RequestForm` | any non-terminal except Form Pending  | Form Pending        | Intake, Clinician, Waiting List |
//! | `ReturnForm`  | Form Pending                          | the parked stage    | Intake, Waiting List            |
//! | `Reject`      | any non-terminal                      | Rejected            | Intake, Clinician, Waiting List |

use crate::personas::Persona;
use crate::{TriageError, TriageResult};
use chrono::{DateTime, Utc};
use referral::{Patient, ReferralStatus, Stage, TriageOutcome, Urgency};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use triage_types::NonEmptyText;

/// One workflow edge, carrying exactly the fields that edge sets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Transition {
    Validate,
    Triage { outcome: TriageOutcome },
    Book { slot: NonEmptyText },
    Confirm,
    RequestForm,
    ReturnForm,
    Reject { reason: NonEmptyText },
}

/// Field-free name of a [`Transition`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransitionKind {
    Validate,
    Triage,
    Book,
    Confirm,
    RequestForm,
    ReturnForm,
    Reject,
}

impl TransitionKind {
    pub const ALL: [TransitionKind; 7] = [
        TransitionKind::Validate,
        TransitionKind::Triage,
        TransitionKind::Book,
        TransitionKind::Confirm,
        TransitionKind::RequestForm,
        TransitionKind::ReturnForm,
        TransitionKind::Reject,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TransitionKind::Validate => "validate",
            TransitionKind::Triage => "triage",
            TransitionKind::Book => "book",
            TransitionKind::Confirm => "confirm",
            TransitionKind::RequestForm => "request-form",
            TransitionKind::ReturnForm => "return-form",
            TransitionKind::Reject => "reject",
        }
    }

    /// Verb phrase used in error messages ("cannot {verb} a referral ...").
    pub fn verb(self) -> &'static str {
        match self {
            TransitionKind::Validate => "validate",
            TransitionKind::Triage => "triage",
            TransitionKind::Book => "book",
            TransitionKind::Confirm => "confirm",
            TransitionKind::RequestForm => "request a form for",
            TransitionKind::ReturnForm => "return the form for",
            TransitionKind::Reject => "reject",
        }
    }

    /// Whether `actor` may perform this transition.
    pub fn permits(self, actor: Persona) -> bool {
        use Persona::*;
        let allowed: &[Persona] = match self {
            TransitionKind::Validate => &[Intake],
            TransitionKind::Triage => &[Clinician],
            TransitionKind::Book => &[Pac, WaitingList],
            TransitionKind::Confirm => &[WaitingList],
            TransitionKind::RequestForm => &[Intake, Clinician, WaitingList],
            TransitionKind::ReturnForm => &[Intake, WaitingList],
            TransitionKind::Reject => &[Intake, Clinician, WaitingList],
        };
        allowed.contains(&actor)
    }

    /// Status this transition leads to from `stage`, or `None` if the edge does not exist.
    pub fn target_from(self, stage: &Stage) -> Option<ReferralStatus> {
        match (self, stage) {
            (TransitionKind::Validate, Stage::IntakeReview) => Some(ReferralStatus::TriagePending),
            (TransitionKind::Triage, Stage::TriagePending) => {
                Some(ReferralStatus::AwaitingScheduling)
            }
            (TransitionKind::Book, Stage::AwaitingScheduling { .. }) => {
                Some(ReferralStatus::Scheduled)
            }
            (TransitionKind::Confirm, Stage::Scheduled { .. }) => Some(ReferralStatus::Confirmed),
            (TransitionKind::ReturnForm, Stage::FormPending { resume_to }) => {
                Some(resume_to.status())
            }
            (TransitionKind::RequestForm, Stage::FormPending { .. }) => None,
            (TransitionKind::RequestForm, s) if !s.is_terminal() => {
                Some(ReferralStatus::FormPending)
            }
            (TransitionKind::Reject, s) if !s.is_terminal() => Some(ReferralStatus::Rejected),
            _ => None,
        }
    }

    /// The edge from `stage` that lands in `proposed`, if any.
    pub fn resolve(stage: &Stage, proposed: ReferralStatus) -> Option<TransitionKind> {
        TransitionKind::ALL
            .into_iter()
            .find(|kind| kind.target_from(stage) == Some(proposed))
    }

    /// The transition that normally leads into `status`; used to name a refused move.
    pub fn leading_to(status: ReferralStatus) -> TransitionKind {
        match status {
            ReferralStatus::TriagePending => TransitionKind::Validate,
            ReferralStatus::AwaitingScheduling => TransitionKind::Triage,
            ReferralStatus::Scheduled => TransitionKind::Book,
            ReferralStatus::Confirmed => TransitionKind::Confirm,
            ReferralStatus::FormPending => TransitionKind::RequestForm,
            ReferralStatus::Rejected => TransitionKind::Reject,
            ReferralStatus::IntakeReview => TransitionKind::ReturnForm,
        }
    }
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransitionKind {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = s.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        TransitionKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalised)
            .ok_or_else(|| TriageError::InvalidInput(format!("unknown transition: {s}")))
    }
}

/// Loose transition fields as they arrive from the API or CLI.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransitionParts {
    pub urgency: Option<Urgency>,
    pub procedure: Option<String>,
    pub slot: Option<String>,
    pub reason: Option<String>,
}

impl Transition {
    pub fn kind(&self) -> TransitionKind {
        match self {
            Transition::Validate => TransitionKind::Validate,
            Transition::Triage { .. } => TransitionKind::Triage,
            Transition::Book { .. } => TransitionKind::Book,
            Transition::Confirm => TransitionKind::Confirm,
            Transition::RequestForm => TransitionKind::RequestForm,
            Transition::ReturnForm => TransitionKind::ReturnForm,
            Transition::Reject { .. } => TransitionKind::Reject,
        }
    }

    /// Status this transition leads to from `from`, or `None` if the edge does not exist.
    pub fn target_status(&self, from: &Stage) -> Option<ReferralStatus> {
        self.kind().target_from(from)
    }

    /// Builds a transition of `kind` from loose fields.
    ///
    /// Each edge takes exactly its own fields: `Triage` needs urgency and procedure, `Book`
    /// needs a slot, `Reject` needs a reason, the rest take nothing.
    ///
    /// # Errors
    ///
    /// Returns [`TriageError::InvalidInput`] if a required field is missing or blank, if a
    /// field the edge does not set is supplied, or if the urgency is `Not Set`.
    pub fn from_parts(kind: TransitionKind, parts: &TransitionParts) -> TriageResult<Self> {
        let mut supplied = Vec::new();
        if parts.urgency.is_some() {
            supplied.push("urgency");
        }
        if parts.procedure.is_some() {
            supplied.push("procedure");
        }
        if parts.slot.is_some() {
            supplied.push("slot");
        }
        if parts.reason.is_some() {
            supplied.push("reason");
        }

        let accepted: &[&str] = match kind {
            TransitionKind::Triage => &["urgency", "procedure"],
            TransitionKind::Book => &["slot"],
            TransitionKind::Reject => &["reason"],
            _ => &[],
        };
        let unexpected: Vec<&str> = supplied
            .into_iter()
            .filter(|name| !accepted.contains(name))
            .collect();
        if !unexpected.is_empty() {
            return Err(TriageError::InvalidInput(format!(
                "{kind} does not accept field(s): {}",
                unexpected.join(", ")
            )));
        }

        let transition = match kind {
            TransitionKind::Validate => Transition::Validate,
            TransitionKind::Confirm => Transition::Confirm,
            TransitionKind::RequestForm => Transition::RequestForm,
            TransitionKind::ReturnForm => Transition::ReturnForm,
            TransitionKind::Triage => {
                let urgency = parts
                    .urgency
                    .ok_or_else(|| TriageError::InvalidInput("triage requires urgency".into()))?;
                let procedure = required(kind, "procedure", parts.procedure.as_deref())?;
                let outcome = TriageOutcome::new(urgency, procedure)
                    .map_err(|e| TriageError::InvalidInput(e.to_string()))?;
                Transition::Triage { outcome }
            }
            TransitionKind::Book => Transition::Book {
                slot: required(kind, "slot", parts.slot.as_deref())?,
            },
            TransitionKind::Reject => Transition::Reject {
                reason: required(kind, "reason", parts.reason.as_deref())?,
            },
        };
        Ok(transition)
    }
}

fn required(kind: TransitionKind, field: &str, value: Option<&str>) -> TriageResult<NonEmptyText> {
    value
        .and_then(|v| NonEmptyText::new(v).ok())
        .ok_or_else(|| TriageError::InvalidInput(format!("{kind} requires a non-empty {field}")))
}

/// A change requested of a referral: either an explicit edge or a proposed target status.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransitionRequest {
    Edge(Transition),
    /// The edge is resolved from the record's current stage; `parts` supplies its fields.
    ToStatus {
        status: ReferralStatus,
        parts: TransitionParts,
    },
}

impl From<Transition> for TransitionRequest {
    fn from(transition: Transition) -> Self {
        TransitionRequest::Edge(transition)
    }
}

/// Applies `transition` to `patient` on behalf of `actor`.
///
/// # Errors
///
/// - [`TriageError::InvalidTransition`] if the edge does not leave the current stage.
/// - [`TriageError::Unauthorized`] if `actor` may not perform the transition.
pub fn transition(
    patient: &Patient,
    transition: &Transition,
    actor: Persona,
    at: DateTime<Utc>,
) -> TriageResult<Patient> {
    let from = patient.status();
    let kind = transition.kind();

    let next = next_stage(patient.stage(), transition)?
        .ok_or(TriageError::InvalidTransition { from, transition: kind })?;
    if !kind.permits(actor) {
        return Err(TriageError::Unauthorized { actor, transition: kind });
    }

    Ok(patient.advanced_to(next, at))
}

/// Moves `patient` into `proposed`, resolving which edge that is from its current stage.
///
/// # Errors
///
/// As [`transition`]; additionally [`TriageError::InvalidInput`] if `parts` does not fit the
/// resolved edge. A status no edge reaches is reported as `InvalidTransition`, named after
/// the transition that normally leads there.
pub fn transition_to(
    patient: &Patient,
    proposed: ReferralStatus,
    parts: &TransitionParts,
    actor: Persona,
    at: DateTime<Utc>,
) -> TriageResult<Patient> {
    let edge = resolve_proposal(patient, proposed, parts, actor)?;
    transition(patient, &edge, actor, at)
}

/// Applies either form of [`TransitionRequest`] and describes the result.
pub fn apply_request(
    patient: &Patient,
    request: &TransitionRequest,
    actor: Persona,
    at: DateTime<Utc>,
) -> TriageResult<TransitionReceipt> {
    let edge = match request {
        TransitionRequest::Edge(edge) => edge.clone(),
        TransitionRequest::ToStatus { status, parts } => {
            resolve_proposal(patient, *status, parts, actor)?
        }
    };
    let updated = transition(patient, &edge, actor, at)?;
    Ok(TransitionReceipt::new(edge.kind(), updated))
}

fn resolve_proposal(
    patient: &Patient,
    proposed: ReferralStatus,
    parts: &TransitionParts,
    actor: Persona,
) -> TriageResult<Transition> {
    let from = patient.status();
    let kind = TransitionKind::resolve(patient.stage(), proposed).ok_or(
        TriageError::InvalidTransition {
            from,
            transition: TransitionKind::leading_to(proposed),
        },
    )?;
    if !kind.permits(actor) {
        return Err(TriageError::Unauthorized { actor, transition: kind });
    }
    Transition::from_parts(kind, parts)
}

/// Stage reached by taking `transition` from `stage`, or `None` if there is no such edge.
fn next_stage(stage: &Stage, transition: &Transition) -> TriageResult<Option<Stage>> {
    let next = match (stage, transition) {
        (Stage::IntakeReview, Transition::Validate) => Some(Stage::TriagePending),
        (Stage::TriagePending, Transition::Triage { outcome }) => {
            Some(Stage::AwaitingScheduling {
                outcome: outcome.clone(),
            })
        }
        (Stage::AwaitingScheduling { outcome }, Transition::Book { slot }) => {
            Some(Stage::Scheduled {
                outcome: outcome.clone(),
                slot: slot.clone(),
            })
        }
        (Stage::Scheduled { outcome, slot }, Transition::Confirm) => Some(Stage::Confirmed {
            outcome: outcome.clone(),
            slot: slot.clone(),
        }),
        (Stage::FormPending { resume_to }, Transition::ReturnForm) => {
            Some(resume_to.as_ref().clone())
        }
        (Stage::FormPending { .. }, Transition::RequestForm) => None,
        (s, Transition::RequestForm) if !s.is_terminal() => Some(Stage::form_pending(s.clone())?),
        (s, Transition::Reject { reason }) if !s.is_terminal() => Some(Stage::Rejected {
            reason: reason.clone(),
            from: s.status(),
        }),
        _ => None,
    };
    Ok(next)
}

/// Result of a successful transition: the new record and a confirmation message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransitionReceipt {
    pub patient: Patient,
    pub message: String,
}

impl TransitionReceipt {
    pub fn new(kind: TransitionKind, patient: Patient) -> Self {
        let message = receipt_message(kind, &patient);
        Self { patient, message }
    }
}

/// Confirmation text for a record that has just taken `kind`.
pub fn receipt_message(kind: TransitionKind, after: &Patient) -> String {
    let name = after.name();
    let procedure = after.procedure().map(|p| p.as_str()).unwrap_or("procedure");
    match kind {
        TransitionKind::Validate => format!("Referral for {name} validated and sent to Triage."),
        TransitionKind::Triage => format!(
            "Patient {name} triaged as {}. Outcome: {procedure}. Sent to List Office.",
            after.effective_urgency()
        ),
        TransitionKind::Book => format!(
            "{name} booked into {} ({} priority).",
            after.stage().slot().map(|s| s.as_str()).unwrap_or("clinic"),
            after.effective_urgency()
        ),
        TransitionKind::Confirm => {
            format!("Successfully scheduled {name} for their {procedure}.")
        }
        TransitionKind::RequestForm => {
            format!("Form requested for {name}. Referral on hold until it is returned.")
        }
        TransitionKind::ReturnForm => {
            format!("Form returned for {name}. Referral resumed at {}.", after.status())
        }
        TransitionKind::Reject => match after.stage() {
            Stage::Rejected { reason, .. } => format!("Referral for {name} rejected: {reason}."),
            _ => format!("Referral for {name} rejected."),
        },
    }
}

/// Clinician one-click triage decisions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TriagePreset {
    SeeAndTreat,
    TwoWeekWait,
    Routine,
}

impl TriagePreset {
    pub const ALL: [TriagePreset; 3] = [
        TriagePreset::SeeAndTreat,
        TriagePreset::TwoWeekWait,
        TriagePreset::Routine,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TriagePreset::SeeAndTreat => "See & Treat",
            TriagePreset::TwoWeekWait => "2WW",
            TriagePreset::Routine => "Routine",
        }
    }

    pub fn urgency(self) -> Urgency {
        match self {
            TriagePreset::SeeAndTreat => Urgency::Urgent,
            TriagePreset::TwoWeekWait => Urgency::TwoWeekWait,
            TriagePreset::Routine => Urgency::Routine,
        }
    }

    pub fn procedure(self) -> &'static str {
        match self {
            TriagePreset::SeeAndTreat => "Excision (See & Treat)",
            TriagePreset::TwoWeekWait => "Two Week Wait Clinic",
            TriagePreset::Routine => "Routine Clinic",
        }
    }

    /// The `Triage` transition this preset stands for.
    pub fn transition(self) -> TriageResult<Transition> {
        Transition::from_parts(
            TransitionKind::Triage,
            &TransitionParts {
                urgency: Some(self.urgency()),
                procedure: Some(self.procedure().to_owned()),
                ..TransitionParts::default()
            },
        )
    }
}

impl FromStr for TriagePreset {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['_', ' '], "-").as_str() {
            "see-and-treat" | "see-&-treat" => Ok(TriagePreset::SeeAndTreat),
            "2ww" | "two-week-wait" => Ok(TriagePreset::TwoWeekWait),
            "routine" => Ok(TriagePreset::Routine),
            _ => Err(TriageError::InvalidInput(format!("unknown triage preset: {s}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;
    use referral::PatientId;

    fn at() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-05-25T09:30:00Z")
            .expect("timestamp")
            .with_timezone(&Utc)
    }

    fn patient(id: &str) -> Patient {
        let id = PatientId::new(id).expect("id");
        seed::embedded()
            .expect("seed")
            .into_iter()
            .find(|p| p.id() == &id)
            .expect("seeded patient")
    }

    fn book(slot: &str) -> Transition {
        Transition::Book {
            slot: NonEmptyText::new(slot).expect("slot"),
        }
    }

    fn reject(reason: &str) -> Transition {
        Transition::Reject {
            reason: NonEmptyText::new(reason).expect("reason"),
        }
    }

    fn triage_routine() -> Transition {
        TriagePreset::Routine.transition().expect("preset")
    }

    #[test]
    fn full_forward_pipeline() {
        let p = patient("2");
        let p = transition(&p, &Transition::Validate, Persona::Intake, at()).expect("validate");
        assert_eq!(p.status(), ReferralStatus::TriagePending);
        let p = transition(&p, &triage_routine(), Persona::Clinician, at()).expect("triage");
        assert_eq!(p.status(), ReferralStatus::AwaitingScheduling);
        let p = transition(&p, &book("Dermatology Routine Clinic"), Persona::Pac, at())
            .expect("book");
        assert_eq!(p.status(), ReferralStatus::Scheduled);
        let p = transition(&p, &Transition::Confirm, Persona::WaitingList, at()).expect("confirm");
        assert_eq!(p.status(), ReferralStatus::Confirmed);
        assert_eq!(p.assigned_urgency(), Some(Urgency::Routine));
        assert_eq!(p.suggested_urgency(), Urgency::Routine);
        assert_eq!(
            p.stage().slot().map(|s| s.as_str()),
            Some("Dermatology Routine Clinic")
        );
    }

    #[test]
    fn transition_changes_only_stage_and_timestamp() {
        let before = patient("1");
        let after =
            transition(&before, &triage_routine(), Persona::Clinician, at()).expect("triage");
        assert_eq!(after.id(), before.id());
        assert_eq!(after.name(), before.name());
        assert_eq!(after.gp_note(), before.gp_note());
        assert_eq!(after.comorbidities(), before.comorbidities());
        assert_eq!(after.suggested_urgency(), Urgency::Urgent);
        assert_eq!(after.waiting_days(), before.waiting_days());
        assert_eq!(after.last_updated(), Some(at()));

        let restored = before.advanced_to(after.stage().clone(), at());
        assert_eq!(restored, after);
    }

    #[test]
    fn applying_same_transition_twice_is_refused() {
        let p = patient("2");
        let once = transition(&p, &Transition::Validate, Persona::Intake, at()).expect("first");
        let err = transition(&once, &Transition::Validate, Persona::Intake, at())
            .expect_err("second validate");
        assert!(matches!(
            err,
            TriageError::InvalidTransition {
                from: ReferralStatus::TriagePending,
                transition: TransitionKind::Validate
            }
        ));
    }

    #[test]
    fn wrong_actor_is_unauthorized() {
        let p = patient("1");
        let err = transition(&p, &triage_routine(), Persona::WaitingList, at())
            .expect_err("list office cannot triage");
        assert!(matches!(
            err,
            TriageError::Unauthorized {
                actor: Persona::WaitingList,
                transition: TransitionKind::Triage
            }
        ));
    }

    #[test]
    fn terminal_record_reports_invalid_transition_for_any_actor() {
        let confirmed = patient("6");
        for actor in Persona::ALL {
            for edge in [Transition::Validate, Transition::RequestForm, reject("late")] {
                let err = transition(&confirmed, &edge, actor, at()).expect_err("terminal");
                assert!(
                    matches!(err, TriageError::InvalidTransition { .. }),
                    "{actor} {:?}",
                    edge.kind()
                );
            }
        }
    }

    #[test]
    fn confirmed_cannot_move_back_to_triage_pending() {
        let confirmed = patient("6");
        let err = transition_to(
            &confirmed,
            ReferralStatus::TriagePending,
            &TransitionParts::default(),
            Persona::Intake,
            at(),
        )
        .expect_err("backwards");
        assert!(matches!(
            err,
            TriageError::InvalidTransition {
                from: ReferralStatus::Confirmed,
                ..
            }
        ));
        assert_eq!(err.to_string(), "cannot validate a referral in Confirmed");
    }

    #[test]
    fn proposed_status_resolves_the_edge() {
        let p = patient("1");
        let parts = TransitionParts {
            urgency: Some(Urgency::TwoWeekWait),
            procedure: Some("Two Week Wait Clinic".into()),
            ..TransitionParts::default()
        };
        let after = transition_to(
            &p,
            ReferralStatus::AwaitingScheduling,
            &parts,
            Persona::Clinician,
            at(),
        )
        .expect("triage by status");
        assert_eq!(after.assigned_urgency(), Some(Urgency::TwoWeekWait));
    }

    #[test]
    fn proposed_status_checks_actor_before_fields() {
        let p = patient("1");
        let err = transition_to(
            &p,
            ReferralStatus::AwaitingScheduling,
            &TransitionParts::default(),
            Persona::Pac,
            at(),
        )
        .expect_err("pac cannot triage");
        assert!(matches!(err, TriageError::Unauthorized { .. }));
    }

    #[test]
    fn form_pending_parks_and_resumes_stage() {
        let scheduling = patient("4");
        let parked = transition(&scheduling, &Transition::RequestForm, Persona::WaitingList, at())
            .expect("request form");
        assert_eq!(parked.status(), ReferralStatus::FormPending);
        assert_eq!(parked.assigned_urgency(), Some(Urgency::Urgent));

        let again = transition(&parked, &Transition::RequestForm, Persona::WaitingList, at())
            .expect_err("already parked");
        assert!(matches!(again, TriageError::InvalidTransition { .. }));

        let resumed = transition(&parked, &Transition::ReturnForm, Persona::WaitingList, at())
            .expect("return form");
        assert_eq!(resumed.stage(), scheduling.stage());
        assert_eq!(
            TransitionKind::resolve(parked.stage(), ReferralStatus::AwaitingScheduling),
            Some(TransitionKind::ReturnForm)
        );
    }

    #[test]
    fn form_pending_reachable_from_intake_and_scheduling() {
        let intake = patient("2");
        assert_eq!(
            Transition::RequestForm.target_status(intake.stage()),
            Some(ReferralStatus::FormPending)
        );
        let scheduling = patient("4");
        assert_eq!(
            Transition::RequestForm.target_status(scheduling.stage()),
            Some(ReferralStatus::FormPending)
        );
    }

    #[test]
    fn reject_records_origin_and_is_terminal() {
        let p = patient("5");
        let rejected =
            transition(&p, &reject("Referred to wrong service"), Persona::Intake, at())
                .expect("reject");
        assert!(rejected.stage().is_terminal());
        match rejected.stage() {
            Stage::Rejected { from, .. } => assert_eq!(*from, ReferralStatus::IntakeReview),
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[test]
    fn management_cannot_perform_any_transition() {
        let p = patient("2");
        let err = transition(&p, &Transition::Validate, Persona::Management, at())
            .expect_err("read-only persona");
        assert!(matches!(err, TriageError::Unauthorized { .. }));
    }

    #[test]
    fn target_from_agrees_with_next_stage() {
        let mut stages: Vec<Stage> = ["1", "2", "4", "6"]
            .into_iter()
            .map(|id| patient(id).stage().clone())
            .collect();
        let awaiting = patient("4").stage().clone();
        let scheduled = next_stage(&awaiting, &book("Plastic Surgery Trauma"))
            .expect("book")
            .expect("scheduled");
        let rejected = next_stage(&awaiting, &reject("duplicate"))
            .expect("reject")
            .expect("rejected");
        stages.extend([
            Stage::form_pending(scheduled.clone()).expect("parked scheduled"),
            Stage::form_pending(Stage::TriagePending).expect("parked triage"),
            scheduled,
            rejected,
        ]);
        let edges = [
            Transition::Validate,
            triage_routine(),
            book("Plastic Surgery Trauma"),
            Transition::Confirm,
            Transition::RequestForm,
            Transition::ReturnForm,
            reject("duplicate"),
        ];
        for stage in &stages {
            for edge in &edges {
                let next = next_stage(stage, edge).expect("next stage");
                assert_eq!(
                    next.map(|s| s.status()),
                    edge.target_status(stage),
                    "{:?} from {:?}",
                    edge.kind(),
                    stage.status()
                );
            }
        }
    }

    #[test]
    fn from_parts_is_strict() {
        let err = Transition::from_parts(
            TransitionKind::Validate,
            &TransitionParts {
                slot: Some("Main Theatre".into()),
                ..TransitionParts::default()
            },
        )
        .expect_err("validate takes no fields");
        assert!(matches!(err, TriageError::InvalidInput(_)));

        let err = Transition::from_parts(
            TransitionKind::Triage,
            &TransitionParts {
                urgency: Some(Urgency::NotSet),
                procedure: Some("Clinic".into()),
                ..TransitionParts::default()
            },
        )
        .expect_err("not set is not a decision");
        assert!(matches!(err, TriageError::InvalidInput(_)));

        let err = Transition::from_parts(
            TransitionKind::Book,
            &TransitionParts {
                slot: Some("   ".into()),
                ..TransitionParts::default()
            },
        )
        .expect_err("blank slot");
        assert!(matches!(err, TriageError::InvalidInput(_)));
    }

    #[test]
    fn receipt_messages_match_toasts() {
        let p = patient("2");
        let validated =
            transition(&p, &Transition::Validate, Persona::Intake, at()).expect("validate");
        assert_eq!(
            TransitionReceipt::new(TransitionKind::Validate, validated).message,
            "Referral for Smith, Jane validated and sent to Triage."
        );

        let triaged = transition(
            &patient("1"),
            &TriagePreset::SeeAndTreat.transition().expect("preset"),
            Persona::Clinician,
            at(),
        )
        .expect("triage");
        assert_eq!(
            receipt_message(TransitionKind::Triage, &triaged),
            "Patient Doe, John triaged as Urgent. Outcome: Excision (See & Treat). Sent to List Office."
        );

        let booked = transition(&patient("4"), &book("Plastic Surgery Trauma"), Persona::Pac, at())
            .expect("book");
        assert_eq!(
            receipt_message(TransitionKind::Book, &booked),
            "Harrison, Sarah booked into Plastic Surgery Trauma (Urgent priority)."
        );

        let confirmed = transition(&booked, &Transition::Confirm, Persona::WaitingList, at())
            .expect("confirm");
        assert_eq!(
            receipt_message(TransitionKind::Confirm, &confirmed),
            "Successfully scheduled Harrison, Sarah for their BCC Excision."
        );
    }

    #[test]
    fn kinds_parse_and_presets_resolve() {
        assert_eq!(
            "request_form".parse::<TransitionKind>().expect("kind"),
            TransitionKind::RequestForm
        );
        assert!("teleport".parse::<TransitionKind>().is_err());
        assert_eq!("2WW".parse::<TriagePreset>().expect("preset"), TriagePreset::TwoWeekWait);
        for preset in TriagePreset::ALL {
            assert_eq!(preset.transition().expect("preset").kind(), TransitionKind::Triage);
        }
    }
}

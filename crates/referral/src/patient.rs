//! Referral patient record: domain types, wire model and translation helpers.
//!
//! Responsibilities:
//! - Define the domain-level [`Patient`] and its lifecycle [`Stage`]
//! - Define a strict, flat wire model for serialisation/deserialisation
//! - Translate between the two, rejecting records whose status and stage fields disagree
//!
//! Notes:
//! - The GP-suggested urgency is kept separately from the clinician-assigned urgency, so the
//!   original referral signal is never overwritten by triage.
//! - `id` has no setter; a new stage is applied with [`Patient::advanced_to`], which copies every
//!   other field unchanged.

use crate::{Department, ReferralError, ReferralResult, ReferralStatus, Urgency};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use triage_types::{LabelList, NonEmptyText};

// ============================================================================
// Public domain-level types
// ============================================================================

/// Opaque, immutable patient identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatientId(NonEmptyText);

impl PatientId {
    pub fn new(id: impl AsRef<str>) -> ReferralResult<Self> {
        NonEmptyText::new(id)
            .map(Self)
            .map_err(|_| ReferralError::InvalidInput("patient id cannot be empty".into()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for PatientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The clinician's triage decision: an assigned urgency and the next procedure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TriageOutcome {
    urgency: Urgency,
    procedure: NonEmptyText,
}

impl TriageOutcome {
    /// Creates a triage outcome.
    ///
    /// # Errors
    ///
    /// Returns [`ReferralError::InvalidInput`] if `urgency` is `Not Set`; a triage decision
    /// must commit to a concrete urgency.
    pub fn new(urgency: Urgency, procedure: NonEmptyText) -> ReferralResult<Self> {
        if urgency == Urgency::NotSet {
            return Err(ReferralError::InvalidInput(
                "triage outcome requires a concrete urgency".into(),
            ));
        }
        Ok(Self { urgency, procedure })
    }

    pub fn urgency(&self) -> Urgency {
        self.urgency
    }

    pub fn procedure(&self) -> &NonEmptyText {
        &self.procedure
    }
}

/// Lifecycle stage of a referral, carrying exactly the data that stage requires.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Stage {
    /// Referral received, awaiting administrative validation.
    IntakeReview,
    /// Validated, waiting for a clinician to triage.
    TriagePending,
    /// Parked while a form is outstanding; resumes into `resume_to` once returned.
    FormPending { resume_to: Box<Stage> },
    /// Triaged and waiting for a slot.
    AwaitingScheduling { outcome: TriageOutcome },
    /// Booked into a clinic or theatre slot.
    Scheduled {
        outcome: TriageOutcome,
        slot: NonEmptyText,
    },
    /// Booking confirmed with the patient. Terminal.
    Confirmed {
        outcome: TriageOutcome,
        slot: NonEmptyText,
    },
    /// Referral rejected. Terminal.
    Rejected {
        reason: NonEmptyText,
        from: ReferralStatus,
    },
}

impl Stage {
    /// Parks `resume_to` behind an outstanding form.
    ///
    /// # Errors
    ///
    /// Returns [`ReferralError::InvalidInput`] if `resume_to` is terminal or already parked.
    pub fn form_pending(resume_to: Stage) -> ReferralResult<Self> {
        let status = resume_to.status();
        if status.is_terminal() || status == ReferralStatus::FormPending {
            return Err(ReferralError::InvalidInput(format!(
                "a form cannot be requested for a referral in {status}"
            )));
        }
        Ok(Stage::FormPending {
            resume_to: Box::new(resume_to),
        })
    }

    pub fn status(&self) -> ReferralStatus {
        match self {
            Stage::IntakeReview => ReferralStatus::IntakeReview,
            Stage::TriagePending => ReferralStatus::TriagePending,
            Stage::FormPending { .. } => ReferralStatus::FormPending,
            Stage::AwaitingScheduling { .. } => ReferralStatus::AwaitingScheduling,
            Stage::Scheduled { .. } => ReferralStatus::Scheduled,
            Stage::Confirmed { .. } => ReferralStatus::Confirmed,
            Stage::Rejected { .. } => ReferralStatus::Rejected,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status().is_terminal()
    }

    /// Triage outcome carried by this stage, looking through a parked form.
    pub fn outcome(&self) -> Option<&TriageOutcome> {
        match self {
            Stage::AwaitingScheduling { outcome }
            | Stage::Scheduled { outcome, .. }
            | Stage::Confirmed { outcome, .. } => Some(outcome),
            Stage::FormPending { resume_to } => resume_to.outcome(),
            _ => None,
        }
    }

    /// Booked slot carried by this stage, looking through a parked form.
    pub fn slot(&self) -> Option<&NonEmptyText> {
        match self {
            Stage::Scheduled { slot, .. } | Stage::Confirmed { slot, .. } => Some(slot),
            Stage::FormPending { resume_to } => resume_to.slot(),
            _ => None,
        }
    }
}

/// A referred patient and the current state of their referral.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Patient {
    id: PatientId,
    name: NonEmptyText,
    dob: String,
    mrn: String,
    referral_date: NaiveDate,
    department: Option<Department>,
    gp_note: String,
    history: String,
    comorbidities: LabelList,
    suggested_urgency: Urgency,
    requested_procedure: Option<NonEmptyText>,
    waiting_days: Option<u32>,
    stage: Stage,
    last_updated: Option<DateTime<Utc>>,
}

impl Patient {
    /// Returns a copy of this record in `stage`, stamped with `at`.
    ///
    /// Every other field, including `id`, is copied unchanged. No workflow rules are checked
    /// here; callers go through the workflow in `triage-core`.
    pub fn advanced_to(&self, stage: Stage, at: DateTime<Utc>) -> Self {
        Self {
            stage,
            last_updated: Some(at),
            ..self.clone()
        }
    }

    pub fn id(&self) -> &PatientId {
        &self.id
    }

    pub fn name(&self) -> &NonEmptyText {
        &self.name
    }

    pub fn dob(&self) -> &str {
        &self.dob
    }

    pub fn mrn(&self) -> &str {
        &self.mrn
    }

    pub fn referral_date(&self) -> NaiveDate {
        self.referral_date
    }

    pub fn department(&self) -> Option<Department> {
        self.department
    }

    pub fn gp_note(&self) -> &str {
        &self.gp_note
    }

    pub fn history(&self) -> &str {
        &self.history
    }

    pub fn comorbidities(&self) -> &LabelList {
        &self.comorbidities
    }

    /// Urgency suggested by the referring GP at intake.
    pub fn suggested_urgency(&self) -> Urgency {
        self.suggested_urgency
    }

    /// Urgency assigned by the clinician at triage, if triaged.
    pub fn assigned_urgency(&self) -> Option<Urgency> {
        self.stage.outcome().map(TriageOutcome::urgency)
    }

    /// Assigned urgency when triaged, otherwise the GP suggestion.
    pub fn effective_urgency(&self) -> Urgency {
        self.assigned_urgency().unwrap_or(self.suggested_urgency)
    }

    pub fn requested_procedure(&self) -> Option<&NonEmptyText> {
        self.requested_procedure.as_ref()
    }

    /// Assigned procedure when triaged, otherwise the GP's requested procedure.
    pub fn procedure(&self) -> Option<&NonEmptyText> {
        self.stage
            .outcome()
            .map(TriageOutcome::procedure)
            .or(self.requested_procedure.as_ref())
    }

    pub fn waiting_days(&self) -> Option<u32> {
        self.waiting_days
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn status(&self) -> ReferralStatus {
        self.stage.status()
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    pub(crate) fn to_wire(&self) -> PatientWire {
        let (status, fields) = StageFields::from_stage(&self.stage);
        PatientWire {
            id: self.id.as_str().to_owned(),
            name: self.name.as_str().to_owned(),
            dob: self.dob.clone(),
            mrn: self.mrn.clone(),
            referral_date: self.referral_date,
            department: self.department,
            gp_note: self.gp_note.clone(),
            history: self.history.clone(),
            comorbidities: self.comorbidities.to_strings(),
            suggested_urgency: self.suggested_urgency,
            requested_procedure: self
                .requested_procedure
                .as_ref()
                .map(|p| p.as_str().to_owned()),
            waiting_days: self.waiting_days,
            status,
            assigned_urgency: fields.assigned_urgency,
            procedure: fields.procedure,
            slot: fields.slot,
            resume_status: fields.resume_status,
            rejection_reason: fields.rejection_reason,
            rejected_from: fields.rejected_from,
            last_updated: self.last_updated,
        }
    }

    pub(crate) fn from_wire(wire: PatientWire) -> ReferralResult<Self> {
        let id = PatientId::new(&wire.id)?;
        let name = NonEmptyText::new(&wire.name).map_err(|_| {
            ReferralError::Translation(format!("patient {id}: name cannot be empty"))
        })?;
        let comorbidities = LabelList::from_labels(&wire.comorbidities).map_err(|_| {
            ReferralError::Translation(format!("patient {id}: comorbidity labels cannot be empty"))
        })?;
        let requested_procedure = wire
            .requested_procedure
            .as_deref()
            .and_then(|p| NonEmptyText::new(p).ok());

        let fields = StageFields {
            assigned_urgency: wire.assigned_urgency,
            procedure: wire.procedure,
            slot: wire.slot,
            resume_status: wire.resume_status,
            rejection_reason: wire.rejection_reason,
            rejected_from: wire.rejected_from,
        };
        let stage = stage_from_wire(wire.status, &fields)
            .map_err(|e| ReferralError::Translation(format!("patient {id}: {e}")))?;

        Ok(Self {
            id,
            name,
            dob: wire.dob,
            mrn: wire.mrn,
            referral_date: wire.referral_date,
            department: wire.department,
            gp_note: wire.gp_note,
            history: wire.history,
            comorbidities,
            suggested_urgency: wire.suggested_urgency,
            requested_procedure,
            waiting_days: wire.waiting_days,
            stage,
            last_updated: wire.last_updated,
        })
    }
}

// ============================================================================
// Wire types (internal)
// ============================================================================

/// Flat wire representation of a patient record.
///
/// The lifecycle stage is flattened into `status` plus the optional stage fields.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct PatientWire {
    pub id: String,
    pub name: String,
    pub dob: String,
    pub mrn: String,
    pub referral_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<Department>,
    pub gp_note: String,
    pub history: String,
    #[serde(default)]
    pub comorbidities: Vec<String>,
    pub suggested_urgency: Urgency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_procedure: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waiting_days: Option<u32>,
    pub status: ReferralStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_urgency: Option<Urgency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub procedure: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_status: Option<ReferralStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejected_from: Option<ReferralStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

// ============================================================================
// Helper functions (internal)
// ============================================================================

/// Stage-specific wire fields, used in both translation directions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct StageFields {
    assigned_urgency: Option<Urgency>,
    procedure: Option<String>,
    slot: Option<String>,
    resume_status: Option<ReferralStatus>,
    rejection_reason: Option<String>,
    rejected_from: Option<ReferralStatus>,
}

impl StageFields {
    fn from_stage(stage: &Stage) -> (ReferralStatus, StageFields) {
        let mut fields = StageFields::default();
        fields.fill_from(stage);
        (stage.status(), fields)
    }

    fn fill_from(&mut self, stage: &Stage) {
        if let Some(outcome) = stage.outcome() {
            self.assigned_urgency = Some(outcome.urgency());
            self.procedure = Some(outcome.procedure().as_str().to_owned());
        }
        if let Some(slot) = stage.slot() {
            self.slot = Some(slot.as_str().to_owned());
        }
        match stage {
            Stage::FormPending { resume_to } => self.resume_status = Some(resume_to.status()),
            Stage::Rejected { reason, from } => {
                self.rejection_reason = Some(reason.as_str().to_owned());
                self.rejected_from = Some(*from);
            }
            _ => {}
        }
    }

    fn present(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.assigned_urgency.is_some() {
            names.push("assignedUrgency");
        }
        if self.procedure.is_some() {
            names.push("procedure");
        }
        if self.slot.is_some() {
            names.push("slot");
        }
        if self.resume_status.is_some() {
            names.push("resumeStatus");
        }
        if self.rejection_reason.is_some() {
            names.push("rejectionReason");
        }
        if self.rejected_from.is_some() {
            names.push("rejectedFrom");
        }
        names
    }
}

/// Rebuild a [`Stage`] from a flat status and its fields, rejecting both missing and
/// superfluous fields.
fn stage_from_wire(status: ReferralStatus, fields: &StageFields) -> ReferralResult<Stage> {
    let stage = build_stage(status, fields)?;

    let (_, expected) = StageFields::from_stage(&stage);
    let allowed = expected.present();
    let unexpected: Vec<&str> = fields
        .present()
        .into_iter()
        .filter(|name| !allowed.contains(name))
        .collect();
    if !unexpected.is_empty() {
        return Err(ReferralError::Translation(format!(
            "status {status} does not carry field(s): {}",
            unexpected.join(", ")
        )));
    }

    Ok(stage)
}

fn build_stage(status: ReferralStatus, fields: &StageFields) -> ReferralResult<Stage> {
    let stage = match status {
        ReferralStatus::IntakeReview => Stage::IntakeReview,
        ReferralStatus::TriagePending => Stage::TriagePending,
        ReferralStatus::AwaitingScheduling => Stage::AwaitingScheduling {
            outcome: outcome_from(status, fields)?,
        },
        ReferralStatus::Scheduled => Stage::Scheduled {
            outcome: outcome_from(status, fields)?,
            slot: required_text(status, "slot", fields.slot.as_deref())?,
        },
        ReferralStatus::Confirmed => Stage::Confirmed {
            outcome: outcome_from(status, fields)?,
            slot: required_text(status, "slot", fields.slot.as_deref())?,
        },
        ReferralStatus::FormPending => {
            let resume = fields
                .resume_status
                .ok_or_else(|| missing(status, "resumeStatus"))?;
            if resume == ReferralStatus::FormPending || resume.is_terminal() {
                return Err(ReferralError::Translation(format!(
                    "resumeStatus cannot be {resume}"
                )));
            }
            Stage::form_pending(build_stage(resume, fields)?)?
        }
        ReferralStatus::Rejected => {
            let from = fields
                .rejected_from
                .ok_or_else(|| missing(status, "rejectedFrom"))?;
            if from.is_terminal() {
                return Err(ReferralError::Translation(format!(
                    "rejectedFrom cannot be {from}"
                )));
            }
            Stage::Rejected {
                reason: required_text(status, "rejectionReason", fields.rejection_reason.as_deref())?,
                from,
            }
        }
    };
    Ok(stage)
}

fn outcome_from(status: ReferralStatus, fields: &StageFields) -> ReferralResult<TriageOutcome> {
    let urgency = fields
        .assigned_urgency
        .ok_or_else(|| missing(status, "assignedUrgency"))?;
    let procedure = required_text(status, "procedure", fields.procedure.as_deref())?;
    TriageOutcome::new(urgency, procedure)
        .map_err(|e| ReferralError::Translation(format!("status {status}: {e}")))
}

fn required_text(
    status: ReferralStatus,
    field: &str,
    value: Option<&str>,
) -> ReferralResult<NonEmptyText> {
    value
        .and_then(|v| NonEmptyText::new(v).ok())
        .ok_or_else(|| missing(status, field))
}

fn missing(status: ReferralStatus, field: &str) -> ReferralError {
    ReferralError::Translation(format!("status {status} requires {field}"))
}

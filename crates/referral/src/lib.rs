//! Referral domain types and wire/boundary support for the triage registry.
//!
//! This crate provides:
//! - domain-level referral types ([`Patient`], [`Stage`], [`ReferralStatus`], [`Urgency`])
//! - a strict wire model for the YAML patient registry
//! - translation between the flat wire shape and the lifecycle-stage sum type
//!
//! Workflow rules (which transitions are allowed, and by whom) live in `triage-core`.
//! This crate only guarantees that a [`Patient`] is internally consistent: a record in
//! `Awaiting Scheduling` always carries a triage outcome, a `Scheduled` record always has a
//! slot, and so on.

pub mod patient;
pub mod registry;
pub mod status;

pub use patient::{Patient, PatientId, Stage, TriageOutcome};
pub use registry::Registry;
pub use status::{Department, ReferralStatus, Urgency};

/// Errors returned by the `referral` boundary crate.
#[derive(Debug, thiserror::Error)]
pub enum ReferralError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("translation error: {0}")]
    Translation(String),
}

/// Type alias for Results that can fail with a [`ReferralError`].
pub type ReferralResult<T> = Result<T, ReferralError>;

//! # Triage Core
//!
//! Core business logic for the referral triage service.
//!
//! This crate contains pure operations over the patient registry:
//! - the referral status workflow and its per-persona permissions
//! - persona-scoped views of the registry
//! - an in-memory patient repository seeded from YAML
//! - management metrics, clinician insights and the clinic catalogue
//!
//! **No API concerns**: HTTP servers, the AI advisor and CLI rendering belong in `api-rest`,
//! `triage-advisor` and `triage-cli`.

pub mod clinics;
pub mod config;
pub mod constants;
pub mod error;
pub mod insights;
pub mod metrics;
pub mod personas;
pub mod repository;
pub mod seed;
pub mod workflow;

pub use config::{CoreConfig, SeedSource};
pub use error::{TriageError, TriageResult};
pub use personas::{ClinicFocus, Persona, PersonaProfile};
pub use repository::{InMemoryRepository, PatientRepository};
pub use workflow::{
    Transition, TransitionKind, TransitionParts, TransitionReceipt, TransitionRequest,
    TriagePreset,
};

//! # Triage Advisor
//!
//! AI decision support for referral triage.
//!
//! - [`prompt`]: the fixed NHS analysis prompt built from a patient's narrative fields
//! - [`client`]: the [`CompletionClient`] seam, an OpenAI-compatible HTTP client and a canned
//!   client for tests
//! - [`advisory`]: validation of model output into an [`Advisory`], and the [`Advisor`]
//! - [`session`]: keyed, cancellable advisory requests with explicit [`AdvisoryState`]
//!
//! Advisories are display-only. Nothing in this crate changes a referral.

pub mod advisory;
pub mod client;
pub mod config;
pub mod error;
pub mod prompt;
pub mod session;

pub use advisory::{parse_advisory, Advisor, Advisory, AdvisoryState};
pub use client::{CompletionClient, OpenAiClient, StaticCompletionClient};
pub use config::AdvisorConfig;
pub use error::{AdvisorError, AdvisorResult};
pub use prompt::{build_prompt, AnalysisInput, SYSTEM_PROMPT};
pub use session::AdvisorySession;

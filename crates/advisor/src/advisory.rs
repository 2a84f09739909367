//! Advisory payloads and the analysis entry point.
//!
//! Model output is untrusted: the completion content is parsed as JSON and checked against
//! the advisory shape before anything is returned. Keys outside that shape are dropped.

use crate::client::CompletionClient;
use crate::prompt::{build_prompt, AnalysisInput, SYSTEM_PROMPT};
use crate::{AdvisorError, AdvisorResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Decision-support output for one referral. Advisory only; never applied to the workflow.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Advisory {
    pub summary: String,
    pub urgency_recommendation: String,
    pub suggested_pathway: String,
    #[serde(default)]
    pub safety_alerts: Vec<String>,
}

/// Parse and validate completion content as an [`Advisory`].
///
/// # Errors
///
/// - [`AdvisorError::MalformedJson`] if `content` is not JSON at all.
/// - [`AdvisorError::SchemaViolation`] if it is JSON of the wrong shape, or a text field is
///   blank.
pub fn parse_advisory(content: &str) -> AdvisorResult<Advisory> {
    let value: serde_json::Value =
        serde_json::from_str(content).map_err(|e| AdvisorError::MalformedJson(e.to_string()))?;
    if !value.is_object() {
        return Err(AdvisorError::SchemaViolation(
            "expected a JSON object".into(),
        ));
    }

    let advisory: Advisory =
        serde_json::from_value(value).map_err(|e| AdvisorError::SchemaViolation(e.to_string()))?;

    for (field, text) in [
        ("summary", &advisory.summary),
        ("urgencyRecommendation", &advisory.urgency_recommendation),
        ("suggestedPathway", &advisory.suggested_pathway),
    ] {
        if text.trim().is_empty() {
            return Err(AdvisorError::SchemaViolation(format!("{field} is empty")));
        }
    }

    Ok(advisory)
}

/// Runs referral analysis against a completion backend.
#[derive(Clone)]
pub struct Advisor {
    client: Arc<dyn CompletionClient>,
}

impl Advisor {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    /// One completion call, no retries.
    pub async fn analyze(&self, input: &AnalysisInput) -> AdvisorResult<Advisory> {
        let prompt = build_prompt(input);
        let result = match self.client.complete(SYSTEM_PROMPT, &prompt).await {
            Ok(content) => parse_advisory(&content),
            Err(e) => Err(e),
        };
        match &result {
            Ok(_) => tracing::debug!(patient = %input.name, "advisory received"),
            Err(e) => tracing::error!(patient = %input.name, "analysis failed: {e}"),
        }
        result
    }
}

/// Observable state of one advisory request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum AdvisoryState {
    Idle,
    Pending,
    Succeeded { advisory: Advisory },
    Failed { reason: String },
}

impl AdvisoryState {
    pub fn is_pending(&self) -> bool {
        matches!(self, AdvisoryState::Pending)
    }

    pub fn from_result(result: AdvisorResult<Advisory>) -> Self {
        match result {
            Ok(advisory) => AdvisoryState::Succeeded { advisory },
            Err(e) => AdvisoryState::Failed {
                reason: e.to_string(),
            },
        }
    }
}

//! Decision-support DTOs.

use serde::{Deserialize, Serialize};
use triage_advisor::{Advisory, AdvisoryState, AnalysisInput};
use utoipa::ToSchema;

/// Patient narrative sent to `/api/analyze`.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzePatient {
    pub name: String,
    pub gp_note: String,
    pub history: String,
    #[serde(default)]
    pub comorbidities: Vec<String>,
}

impl From<AnalyzePatient> for AnalysisInput {
    fn from(p: AnalyzePatient) -> Self {
        AnalysisInput {
            name: p.name,
            gp_note: p.gp_note,
            history: p.history,
            comorbidities: p.comorbidities,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct AnalyzeReq {
    pub patient: Option<AnalyzePatient>,
}

/// Validated model advisory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdvisoryRes {
    pub summary: String,
    pub urgency_recommendation: String,
    pub suggested_pathway: String,
    pub safety_alerts: Vec<String>,
}

impl From<Advisory> for AdvisoryRes {
    fn from(a: Advisory) -> Self {
        Self {
            summary: a.summary,
            urgency_recommendation: a.urgency_recommendation,
            suggested_pathway: a.suggested_pathway,
            safety_alerts: a.safety_alerts,
        }
    }
}

/// State of a patient's server-side advisory request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdvisoryStateRes {
    /// `idle`, `pending`, `succeeded` or `failed`.
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advisory: Option<AdvisoryRes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<AdvisoryState> for AdvisoryStateRes {
    fn from(state: AdvisoryState) -> Self {
        let (name, advisory, reason) = match state {
            AdvisoryState::Idle => ("idle", None, None),
            AdvisoryState::Pending => ("pending", None, None),
            AdvisoryState::Succeeded { advisory } => ("succeeded", Some(advisory.into()), None),
            AdvisoryState::Failed { reason } => ("failed", None, Some(reason)),
        };
        Self {
            state: name.into(),
            advisory,
            reason,
        }
    }
}

/// Query flags for starting an advisory.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
pub struct AdvisoryStartQuery {
    /// Re-run even if a result for the same input is cached.
    #[serde(default)]
    pub refresh: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_state_carries_reason_only() {
        let res = AdvisoryStateRes::from(AdvisoryState::Failed {
            reason: "completion API returned 503: overloaded".into(),
        });
        let value = serde_json::to_value(&res).expect("serialise");
        assert_eq!(value["state"], "failed");
        assert!(value.get("advisory").is_none());
        assert!(value["reason"].as_str().is_some_and(|r| r.contains("503")));
    }
}

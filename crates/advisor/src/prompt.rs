//! Prompt construction for referral analysis.

use referral::Patient;
use serde::{Deserialize, Serialize};

pub const SYSTEM_PROMPT: &str = "You are a clinical decision support assistant for the NHS. \
Provide accurate, safety-focused medical triage recommendations in JSON format.";

/// Patient fields sent for analysis.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisInput {
    pub name: String,
    pub gp_note: String,
    pub history: String,
    #[serde(default)]
    pub comorbidities: Vec<String>,
}

impl From<&Patient> for AnalysisInput {
    fn from(patient: &Patient) -> Self {
        Self {
            name: patient.name().to_string(),
            gp_note: patient.gp_note().to_string(),
            history: patient.history().to_string(),
            comorbidities: patient.comorbidities().to_strings(),
        }
    }
}

/// The user prompt for `input`.
pub fn build_prompt(input: &AnalysisInput) -> String {
    format!(
        "As a clinical decision support assistant for the NHS, analyze this referral:
Patient: {name}
GP Note: {gp_note}
History: {history}
Comorbidities: {comorbidities}

Please provide:
1. A concise clinical summary.
2. A safety-first assessment of urgency (Urgent, Routine, or Two-Week Wait).
3. Suggested next step (Clinic, Biopsy, Surgery).
4. Safety warnings (e.g. regarding medications or comorbidities).

Respond in JSON format with the following structure:
{{ \"summary\": \"string\", \"urgencyRecommendation\": \"string\", \"suggestedPathway\": \"string\", \"safetyAlerts\": [\"string\"] }}",
        name = input.name,
        gp_note = input.gp_note,
        history = input.history,
        comorbidities = input.comorbidities.join(", "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doe() -> AnalysisInput {
        AnalysisInput {
            name: "Doe, John".into(),
            gp_note: "Suspicious lesion on left arm.".into(),
            history: "Previous melanoma excision.".into(),
            comorbidities: vec!["Hypertension".into(), "Warfarin".into()],
        }
    }

    #[test]
    fn prompt_carries_patient_fields() {
        let prompt = build_prompt(&doe());
        assert!(prompt.contains("Patient: Doe, John\n"));
        assert!(prompt.contains("GP Note: Suspicious lesion on left arm.\n"));
        assert!(prompt.contains("Comorbidities: Hypertension, Warfarin\n"));
        assert!(prompt.ends_with("\"safetyAlerts\": [\"string\"] }"));
    }

    #[test]
    fn empty_comorbidities_render_as_empty_text() {
        let input = AnalysisInput {
            comorbidities: Vec::new(),
            ..doe()
        };
        assert!(build_prompt(&input).contains("Comorbidities: \n"));
    }

    #[test]
    fn wire_shape_defaults_comorbidities() {
        let input: AnalysisInput = serde_json::from_str(
            r#"{"name":"Smith, Jane","gpNote":"Cyst.","history":"None."}"#,
        )
        .expect("parse");
        assert!(input.comorbidities.is_empty());
        let value = serde_json::to_value(&input).expect("serialise");
        assert_eq!(value["comorbidities"], serde_json::json!([]));
    }
}

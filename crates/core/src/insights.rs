//! Clinician decision aids: pathway timeline and rule-based risk levels.
//!
//! These are display aids only; nothing here feeds back into the workflow.

use crate::constants::{
    ANTICOAGULANT_MARKERS, CANCER_MARKERS, CLINICAL_RISK_WAITING_DAYS, ROUTINE_TARGET_DAYS,
    SURGICAL_RISK_COMORBIDITIES, TWO_WEEK_WAIT_TARGET_DAYS, URGENT_TARGET_DAYS,
};
use chrono::{Days, NaiveDate};
use referral::{Patient, Urgency};
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub cancer: RiskLevel,
    pub surgical: RiskLevel,
    /// Risk from delay, driven by days already waited.
    pub clinical: RiskLevel,
}

impl RiskAssessment {
    /// One-line recommendation summarising the three levels.
    pub fn overall(&self) -> &'static str {
        if self.cancer == RiskLevel::High || self.clinical == RiskLevel::High {
            "Proceed with URGENT pathway"
        } else if self.surgical == RiskLevel::Medium {
            "Requires pre-operative assessment"
        } else {
            "Suitable for routine pathway"
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathwayTimeline {
    pub referred: NaiveDate,
    pub intake_validated: NaiveDate,
    pub target: NaiveDate,
    /// Negative once the target has passed.
    pub days_remaining: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicianInsights {
    pub timeline: PathwayTimeline,
    pub anticoagulated: bool,
    pub risks: RiskAssessment,
    pub overall: &'static str,
}

pub fn target_days(urgency: Urgency) -> i64 {
    match urgency {
        Urgency::TwoWeekWait => TWO_WEEK_WAIT_TARGET_DAYS,
        Urgency::Urgent => URGENT_TARGET_DAYS,
        _ => ROUTINE_TARGET_DAYS,
    }
}

/// `date` plus `days`, clamped to the last representable date.
fn days_after(date: NaiveDate, days: i64) -> NaiveDate {
    date.checked_add_days(Days::new(days.unsigned_abs()))
        .unwrap_or(NaiveDate::MAX)
}

pub fn timeline(patient: &Patient, today: NaiveDate) -> PathwayTimeline {
    let referred = patient.referral_date();
    let target = days_after(referred, target_days(patient.effective_urgency()));
    PathwayTimeline {
        referred,
        intake_validated: days_after(referred, 1),
        target,
        days_remaining: (target - today).num_days(),
    }
}

/// Whether any comorbidity indicates the patient is anticoagulated.
pub fn is_anticoagulated(patient: &Patient) -> bool {
    patient
        .comorbidities()
        .iter()
        .any(|c| contains_any(c.as_str(), ANTICOAGULANT_MARKERS))
}

pub fn assess_risk(patient: &Patient) -> RiskAssessment {
    let cancer = if patient.effective_urgency() == Urgency::TwoWeekWait
        || contains_any(patient.gp_note(), CANCER_MARKERS)
    {
        RiskLevel::High
    } else {
        RiskLevel::Low
    };

    let surgical = if is_anticoagulated(patient)
        || patient.comorbidities().len() > SURGICAL_RISK_COMORBIDITIES
    {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };

    let clinical = match patient.waiting_days() {
        Some(days) if days > CLINICAL_RISK_WAITING_DAYS => RiskLevel::High,
        _ => RiskLevel::Low,
    };

    RiskAssessment {
        cancer,
        surgical,
        clinical,
    }
}

pub fn insights(patient: &Patient, today: NaiveDate) -> ClinicianInsights {
    let risks = assess_risk(patient);
    ClinicianInsights {
        timeline: timeline(patient, today),
        anticoagulated: is_anticoagulated(patient),
        overall: risks.overall(),
        risks,
    }
}

fn contains_any(text: &str, markers: &[&str]) -> bool {
    let lower = text.to_lowercase();
    markers.iter().any(|m| lower.contains(m))
}

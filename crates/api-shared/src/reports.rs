//! Read-only report DTOs: management metrics, clinician insights and clinic suggestions.

use serde::{Deserialize, Serialize};
use triage_core::clinics::Clinic;
use triage_core::insights::{ClinicianInsights, RiskLevel};
use triage_core::metrics::{Backlog, ManagementMetrics};
use utoipa::ToSchema;

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct CountRes {
    pub label: String,
    pub count: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DepartmentShareRes {
    pub department: String,
    pub count: usize,
    pub percent: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MetricsRes {
    pub total: usize,
    pub by_status: Vec<CountRes>,
    pub urgent: usize,
    pub departments: Vec<DepartmentShareRes>,
    pub booking_rate: u32,
    pub average_wait_days: Option<f64>,
    /// `intake`, `triage` or `scheduling`.
    pub bottleneck: Option<String>,
}

impl From<ManagementMetrics> for MetricsRes {
    fn from(m: ManagementMetrics) -> Self {
        Self {
            total: m.total,
            by_status: m
                .by_status
                .into_iter()
                .map(|c| CountRes {
                    label: c.status.to_string(),
                    count: c.count,
                })
                .collect(),
            urgent: m.urgent,
            departments: m
                .departments
                .into_iter()
                .map(|d| DepartmentShareRes {
                    department: d.department.to_string(),
                    count: d.count,
                    percent: d.percent,
                })
                .collect(),
            booking_rate: m.booking_rate,
            average_wait_days: m.average_wait_days,
            bottleneck: m.bottleneck.map(|b| {
                match b {
                    Backlog::Intake => "intake",
                    Backlog::Triage => "triage",
                    Backlog::Scheduling => "scheduling",
                }
                .to_string()
            }),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsightsRes {
    pub referred: String,
    pub intake_validated: String,
    pub target: String,
    pub days_remaining: i64,
    pub anticoagulated: bool,
    /// `LOW`, `MEDIUM` or `HIGH`.
    pub cancer_risk: String,
    pub surgical_risk: String,
    pub clinical_risk: String,
    pub overall: String,
}

fn level(risk: RiskLevel) -> String {
    match risk {
        RiskLevel::Low => "LOW",
        RiskLevel::Medium => "MEDIUM",
        RiskLevel::High => "HIGH",
    }
    .to_string()
}

impl From<ClinicianInsights> for InsightsRes {
    fn from(i: ClinicianInsights) -> Self {
        Self {
            referred: i.timeline.referred.to_string(),
            intake_validated: i.timeline.intake_validated.to_string(),
            target: i.timeline.target.to_string(),
            days_remaining: i.timeline.days_remaining,
            anticoagulated: i.anticoagulated,
            cancer_risk: level(i.risks.cancer),
            surgical_risk: level(i.risks.surgical),
            clinical_risk: level(i.risks.clinical),
            overall: i.overall.to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClinicRes {
    pub id: String,
    pub name: String,
    pub department: String,
    pub slots: u32,
    pub booked: u32,
    pub available: u32,
    pub urgency_match: Vec<String>,
}

impl From<&Clinic> for ClinicRes {
    fn from(c: &Clinic) -> Self {
        Self {
            id: c.id.into(),
            name: c.name.into(),
            department: c.department.to_string(),
            slots: c.slots,
            booked: c.booked,
            available: c.available(),
            urgency_match: c.urgency_match.iter().map(|u| u.to_string()).collect(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ListClinicsRes {
    pub clinics: Vec<ClinicRes>,
}

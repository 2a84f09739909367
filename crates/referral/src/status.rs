//! Closed vocabularies used on a referral: status, urgency and department.
//!
//! The wire strings are the display strings used by the referral pathway
//! (`"Triage Pending"`, `"2WW"`, `"Plastic Surgery"`), so they round-trip unchanged
//! through YAML, JSON and query parameters.

use crate::ReferralError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Flat referral status, derived from a patient's [`crate::Stage`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferralStatus {
    #[serde(rename = "Intake Review")]
    IntakeReview,
    #[serde(rename = "Triage Pending")]
    TriagePending,
    #[serde(rename = "Form Pending")]
    FormPending,
    #[serde(rename = "Awaiting Scheduling")]
    AwaitingScheduling,
    #[serde(rename = "Scheduled")]
    Scheduled,
    #[serde(rename = "Confirmed")]
    Confirmed,
    #[serde(rename = "Rejected")]
    Rejected,
}

impl ReferralStatus {
    /// Every status in pipeline order.
    pub const ALL: [ReferralStatus; 7] = [
        ReferralStatus::IntakeReview,
        ReferralStatus::TriagePending,
        ReferralStatus::FormPending,
        ReferralStatus::AwaitingScheduling,
        ReferralStatus::Scheduled,
        ReferralStatus::Confirmed,
        ReferralStatus::Rejected,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ReferralStatus::IntakeReview => "Intake Review",
            ReferralStatus::TriagePending => "Triage Pending",
            ReferralStatus::FormPending => "Form Pending",
            ReferralStatus::AwaitingScheduling => "Awaiting Scheduling",
            ReferralStatus::Scheduled => "Scheduled",
            ReferralStatus::Confirmed => "Confirmed",
            ReferralStatus::Rejected => "Rejected",
        }
    }

    /// Confirmed and Rejected records accept no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, ReferralStatus::Confirmed | ReferralStatus::Rejected)
    }
}

impl fmt::Display for ReferralStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReferralStatus {
    type Err = ReferralError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReferralStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ReferralError::InvalidInput(format!("unknown referral status: {s}")))
    }
}

/// Clinical urgency of a referral.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Urgency {
    #[serde(rename = "Urgent")]
    Urgent,
    #[serde(rename = "Routine")]
    Routine,
    #[serde(rename = "Inter Regular")]
    InterRegular,
    /// Two-Week-Wait suspected cancer pathway.
    #[serde(rename = "2WW")]
    TwoWeekWait,
    #[serde(rename = "Not Set")]
    NotSet,
}

impl Urgency {
    pub const ALL: [Urgency; 5] = [
        Urgency::Urgent,
        Urgency::Routine,
        Urgency::InterRegular,
        Urgency::TwoWeekWait,
        Urgency::NotSet,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Urgency::Urgent => "Urgent",
            Urgency::Routine => "Routine",
            Urgency::InterRegular => "Inter Regular",
            Urgency::TwoWeekWait => "2WW",
            Urgency::NotSet => "Not Set",
        }
    }

    /// Urgent and 2WW referrals.
    pub fn is_urgent_band(self) -> bool {
        matches!(self, Urgency::Urgent | Urgency::TwoWeekWait)
    }

    /// Routine and Inter Regular referrals.
    pub fn is_routine_band(self) -> bool {
        matches!(self, Urgency::Routine | Urgency::InterRegular)
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Urgency {
    type Err = ReferralError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("two week wait") {
            return Ok(Urgency::TwoWeekWait);
        }
        Urgency::ALL
            .into_iter()
            .find(|urgency| urgency.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ReferralError::InvalidInput(format!("unknown urgency: {s}")))
    }
}

/// Receiving department for a referral.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Department {
    #[serde(rename = "Dermatology")]
    Dermatology,
    #[serde(rename = "Plastic Surgery")]
    PlasticSurgery,
}

impl Department {
    pub const ALL: [Department; 2] = [Department::Dermatology, Department::PlasticSurgery];

    pub fn as_str(self) -> &'static str {
        match self {
            Department::Dermatology => "Dermatology",
            Department::PlasticSurgery => "Plastic Surgery",
        }
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Department {
    type Err = ReferralError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Department::ALL
            .into_iter()
            .find(|dept| dept.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ReferralError::InvalidInput(format!("unknown department: {s}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_display_strings() {
        for status in ReferralStatus::ALL {
            let parsed: ReferralStatus = status.as_str().parse().expect("parse status");
            assert_eq!(parsed, status);
        }
        assert_eq!(
            "awaiting scheduling".parse::<ReferralStatus>().expect("case-insensitive"),
            ReferralStatus::AwaitingScheduling
        );
    }

    #[test]
    fn only_confirmed_and_rejected_are_terminal() {
        let terminal: Vec<_> = ReferralStatus::ALL
            .into_iter()
            .filter(|s| s.is_terminal())
            .collect();
        assert_eq!(
            terminal,
            vec![ReferralStatus::Confirmed, ReferralStatus::Rejected]
        );
    }

    #[test]
    fn urgency_wire_strings_match_pathway_labels() {
        assert_eq!(Urgency::TwoWeekWait.as_str(), "2WW");
        assert_eq!(
            "Two Week Wait".parse::<Urgency>().expect("alias"),
            Urgency::TwoWeekWait
        );
        assert_eq!(
            "inter regular".parse::<Urgency>().expect("case-insensitive"),
            Urgency::InterRegular
        );
        assert!("Soon".parse::<Urgency>().is_err());
    }

    #[test]
    fn urgency_bands() {
        assert!(Urgency::TwoWeekWait.is_urgent_band());
        assert!(Urgency::Urgent.is_urgent_band());
        assert!(Urgency::InterRegular.is_routine_band());
        assert!(!Urgency::NotSet.is_urgent_band());
        assert!(!Urgency::NotSet.is_routine_band());
    }

    #[test]
    fn department_parses() {
        assert_eq!(
            "plastic surgery".parse::<Department>().expect("department"),
            Department::PlasticSurgery
        );
        assert!("Cardiology".parse::<Department>().is_err());
    }
}

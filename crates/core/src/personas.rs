//! Personas and persona-scoped views of the patient registry.
//!
//! A persona is a role-based view onto the same patient data. Each persona sees a fixed set
//! of referral statuses; filtering is pure, total and keeps registry order. Which transitions
//! a persona may perform is defined by the workflow (see [`crate::workflow::TransitionKind`]).

use crate::workflow::TransitionKind;
use crate::TriageError;
use referral::{Patient, ReferralStatus, Urgency};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Persona {
    /// Referral intake / admin, the gatekeeper validating GP data.
    Intake,
    /// Clinician, the decision maker.
    Clinician,
    /// Waiting List Office, the orchestrator of theatre lists.
    WaitingList,
    /// Patients Appointments Centre, the booking hub.
    Pac,
    /// Management, the overseer.
    Management,
}

impl Persona {
    pub const ALL: [Persona; 5] = [
        Persona::Intake,
        Persona::Clinician,
        Persona::WaitingList,
        Persona::Pac,
        Persona::Management,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Persona::Intake => "intake",
            Persona::Clinician => "clinician",
            Persona::WaitingList => "waiting-list",
            Persona::Pac => "pac",
            Persona::Management => "management",
        }
    }

    /// Statuses this persona works on. `None` means every status.
    pub fn visible_statuses(self) -> Option<&'static [ReferralStatus]> {
        match self {
            Persona::Intake => Some(&[ReferralStatus::IntakeReview]),
            Persona::Clinician => Some(&[ReferralStatus::TriagePending]),
            Persona::WaitingList => Some(&[
                ReferralStatus::AwaitingScheduling,
                ReferralStatus::Scheduled,
                ReferralStatus::FormPending,
                ReferralStatus::Confirmed,
            ]),
            Persona::Pac => Some(&[
                ReferralStatus::IntakeReview,
                ReferralStatus::AwaitingScheduling,
            ]),
            Persona::Management => None,
        }
    }

    pub fn sees(self, patient: &Patient) -> bool {
        match self.visible_statuses() {
            Some(statuses) => statuses.contains(&patient.status()),
            None => true,
        }
    }

    /// Display profile for this persona.
    pub fn profile(self) -> &'static PersonaProfile {
        match self {
            Persona::Intake => &PROFILES[0],
            Persona::Clinician => &PROFILES[1],
            Persona::WaitingList => &PROFILES[2],
            Persona::Pac => &PROFILES[3],
            Persona::Management => &PROFILES[4],
        }
    }

    /// Transitions this persona may perform.
    pub fn actions(self) -> Vec<TransitionKind> {
        TransitionKind::ALL
            .into_iter()
            .filter(|kind| kind.permits(self))
            .collect()
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Persona {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = s.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        match normalised.as_str() {
            "intake" | "admin" => Ok(Persona::Intake),
            "clinician" => Ok(Persona::Clinician),
            "waiting-list" => Ok(Persona::WaitingList),
            "pac" => Ok(Persona::Pac),
            "management" => Ok(Persona::Management),
            _ => Err(TriageError::InvalidInput(format!("unknown persona: {s}"))),
        }
    }
}

/// Static presentation data for a persona.
#[derive(Debug)]
pub struct PersonaProfile {
    pub persona: Persona,
    pub title: &'static str,
    pub subtitle: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    /// Whether the persona works from a sidebar patient list.
    pub shows_patient_list: bool,
}

static PROFILES: [PersonaProfile; 5] = [
    PersonaProfile {
        persona: Persona::Intake,
        title: "Referral Intake",
        subtitle: "The Gatekeeper",
        description: "Validate incoming GP referral data and pass complete referrals to triage.",
        icon: "ClipboardCheck",
        shows_patient_list: false,
    },
    PersonaProfile {
        persona: Persona::Clinician,
        title: "Clinician / Doctor",
        subtitle: "The Decision Maker",
        description: "Triage referrals, record outcomes, and review complex patient contexts with AI support.",
        icon: "Stethoscope",
        shows_patient_list: true,
    },
    PersonaProfile {
        persona: Persona::WaitingList,
        title: "Waiting List Office",
        subtitle: "The Orchestrator",
        description: "Digital management of theatre lists and scheduling operations.",
        icon: "ClipboardList",
        shows_patient_list: false,
    },
    PersonaProfile {
        persona: Persona::Pac,
        title: "Patients Appointments Centre",
        subtitle: "The Booking Hub",
        description: "Book patients into clinics according to urgency and availability.",
        icon: "Calendar",
        shows_patient_list: false,
    },
    PersonaProfile {
        persona: Persona::Management,
        title: "Management",
        subtitle: "The Overseer",
        description: "High-level visibility into backlog volumes, wait times, and operational bottlenecks.",
        icon: "BarChart",
        shows_patient_list: false,
    },
];

/// Urgency band used by the booking hub to narrow its list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClinicFocus {
    #[default]
    All,
    /// Urgent and 2WW.
    Urgent,
    /// Routine and Inter Regular.
    Routine,
}

impl ClinicFocus {
    pub fn admits(self, urgency: Urgency) -> bool {
        match self {
            ClinicFocus::All => true,
            ClinicFocus::Urgent => urgency.is_urgent_band(),
            ClinicFocus::Routine => urgency.is_routine_band(),
        }
    }
}

impl FromStr for ClinicFocus {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(ClinicFocus::All),
            "urgent" => Ok(ClinicFocus::Urgent),
            "routine" => Ok(ClinicFocus::Routine),
            _ => Err(TriageError::InvalidInput(format!("unknown clinic focus: {s}"))),
        }
    }
}

/// Patients visible to `persona`, in registry order.
pub fn filter(persona: Persona, patients: &[Patient]) -> Vec<&Patient> {
    filter_with_focus(persona, ClinicFocus::All, patients)
}

/// Patients visible to `persona` whose effective urgency falls in `focus`, in registry order.
pub fn filter_with_focus(
    persona: Persona,
    focus: ClinicFocus,
    patients: &[Patient],
) -> Vec<&Patient> {
    patients
        .iter()
        .filter(|p| persona.sees(p) && focus.admits(p.effective_urgency()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;

    fn registry() -> Vec<Patient> {
        seed::embedded().expect("embedded seed parses")
    }

    fn ids(patients: &[&Patient]) -> Vec<String> {
        patients.iter().map(|p| p.id().to_string()).collect()
    }

    #[test]
    fn clinician_sees_only_triage_pending() {
        let patients = registry();
        let visible = filter(Persona::Clinician, &patients);
        assert_eq!(ids(&visible), vec!["1", "3"]);
        assert!(visible
            .iter()
            .all(|p| p.status() == ReferralStatus::TriagePending));
    }

    #[test]
    fn every_persona_view_is_an_ordered_subset() {
        let patients = registry();
        for persona in Persona::ALL {
            let visible = filter(persona, &patients);
            let expected: Vec<&Patient> = patients.iter().filter(|p| persona.sees(p)).collect();
            assert_eq!(visible, expected, "persona {persona}");

            let mut cursor = 0;
            for p in &visible {
                let pos = patients[cursor..]
                    .iter()
                    .position(|q| q.id() == p.id())
                    .expect("element comes from the list");
                cursor += pos + 1;
            }
        }
    }

    #[test]
    fn management_sees_everything() {
        let patients = registry();
        assert_eq!(filter(Persona::Management, &patients).len(), patients.len());
    }

    #[test]
    fn waiting_list_and_pac_views() {
        let patients = registry();
        assert_eq!(ids(&filter(Persona::WaitingList, &patients)), vec!["4", "6"]);
        assert_eq!(ids(&filter(Persona::Pac, &patients)), vec!["2", "4", "5"]);
        assert_eq!(ids(&filter(Persona::Intake, &patients)), vec!["2", "5"]);
    }

    #[test]
    fn pac_focus_narrows_by_urgency_band() {
        let patients = registry();
        let urgent = filter_with_focus(Persona::Pac, ClinicFocus::Urgent, &patients);
        assert_eq!(ids(&urgent), vec!["4"]);
        let routine = filter_with_focus(Persona::Pac, ClinicFocus::Routine, &patients);
        assert_eq!(ids(&routine), vec!["2"]);
    }

    #[test]
    fn empty_registry_filters_to_empty() {
        for persona in Persona::ALL {
            assert!(filter(persona, &[]).is_empty());
        }
    }

    #[test]
    fn persona_parses_common_spellings() {
        assert_eq!("WAITING_LIST".parse::<Persona>().expect("p"), Persona::WaitingList);
        assert_eq!("waiting-list".parse::<Persona>().expect("p"), Persona::WaitingList);
        assert_eq!("Admin".parse::<Persona>().expect("p"), Persona::Intake);
        assert!("porter".parse::<Persona>().is_err());
    }

    #[test]
    fn management_has_no_actions() {
        assert!(Persona::Management.actions().is_empty());
        assert_eq!(Persona::Clinician.profile().subtitle, "The Decision Maker");
    }
}

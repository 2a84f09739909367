//! Clinic catalogue for the Patients Appointments Centre.

use referral::{Department, Patient, Urgency};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Clinic {
    pub id: &'static str,
    pub name: &'static str,
    pub department: Department,
    pub slots: u32,
    pub booked: u32,
    pub urgency_match: &'static [Urgency],
}

impl Clinic {
    pub fn available(&self) -> u32 {
        self.slots.saturating_sub(self.booked)
    }

    pub fn accepts(&self, urgency: Urgency) -> bool {
        self.urgency_match.contains(&urgency)
    }
}

const fn clinic(
    id: &'static str,
    name: &'static str,
    department: Department,
    slots: u32,
    booked: u32,
    urgency_match: &'static [Urgency],
) -> Clinic {
    Clinic {
        id,
        name,
        department,
        slots,
        booked,
        urgency_match,
    }
}

use Department::{Dermatology, PlasticSurgery};
use Urgency::{InterRegular, Routine, TwoWeekWait, Urgent};

pub static CLINICS: [Clinic; 9] = [
    clinic("derm-urgent", "Dermatology Urgent Clinic", Dermatology, 12, 8, &[Urgent, TwoWeekWait]),
    clinic("derm-routine", "Dermatology Routine Clinic", Dermatology, 20, 15, &[Routine, InterRegular]),
    clinic("derm-minor", "Dermatology Minor Ops", Dermatology, 10, 7, &[Routine]),
    clinic("derm-2ww", "2WW Dermatology Cancer", Dermatology, 6, 4, &[TwoWeekWait]),
    clinic("plastics-trauma", "Plastic Surgery Trauma", PlasticSurgery, 8, 5, &[Urgent]),
    clinic("plastics-hand", "Plastic Surgery Hand Clinic", PlasticSurgery, 15, 10, &[Routine, InterRegular]),
    clinic("plastics-reconstruction", "Plastic Surgery Reconstruction", PlasticSurgery, 10, 8, &[Routine, InterRegular]),
    clinic("plastics-burns", "Plastic Surgery Burns Unit", PlasticSurgery, 6, 3, &[Urgent, TwoWeekWait]),
    clinic("plastics-2ww", "2WW Plastic Surgery Cancer", PlasticSurgery, 5, 3, &[TwoWeekWait]),
];

/// Clinics in `department` that take `urgency` and still have a free slot.
pub fn suitable_clinics(urgency: Urgency, department: Department) -> Vec<&'static Clinic> {
    CLINICS
        .iter()
        .filter(|c| c.department == department && c.accepts(urgency) && c.available() > 0)
        .collect()
}

/// Clinics suitable for `patient`; none if the referral has no department.
pub fn for_patient(patient: &Patient) -> Vec<&'static Clinic> {
    match patient.department() {
        Some(department) => suitable_clinics(patient.effective_urgency(), department),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;

    fn ids(clinics: &[&Clinic]) -> Vec<&'static str> {
        clinics.iter().map(|c| c.id).collect()
    }

    #[test]
    fn urgent_plastics_referral() {
        let clinics = suitable_clinics(Urgent, PlasticSurgery);
        assert_eq!(ids(&clinics), vec!["plastics-trauma", "plastics-burns"]);
    }

    #[test]
    fn two_week_wait_dermatology() {
        let clinics = suitable_clinics(TwoWeekWait, Dermatology);
        assert_eq!(ids(&clinics), vec!["derm-urgent", "derm-2ww"]);
    }

    #[test]
    fn not_set_matches_nothing() {
        assert!(suitable_clinics(Urgency::NotSet, Dermatology).is_empty());
    }

    #[test]
    fn patient_uses_department_and_effective_urgency() {
        let patients = seed::embedded().expect("seed");
        let smith = &patients[1];
        assert_eq!(ids(&for_patient(smith)), vec!["derm-routine", "derm-minor"]);
        assert_eq!(CLINICS[0].available(), 4);
    }
}

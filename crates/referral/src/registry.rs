//! YAML patient registry.
//!
//! The registry is the seed for the in-memory patient store: a single YAML mapping with a
//! `patients` sequence, each entry in the flat wire shape of a patient record.
//!
//! ```yaml
//! patients:
//!   - id: "2"
//!     name: "Smith, Jane"
//!     dob: "15/03/1975"
//!     mrn: MRN-9120-A
//!     referralDate: 2024-05-18
//!     gpNote: Recurrent sebaceous cyst on upper back.
//!     history: General health good.
//!     comorbidities: []
//!     suggestedUrgency: Routine
//!     status: Intake Review
//! ```

use crate::patient::PatientWire;
use crate::{Patient, ReferralError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Registry operations.
///
/// This is a zero-sized type used for namespacing registry-related operations.
pub struct Registry;

impl Registry {
    /// Parse a patient registry from YAML text.
    ///
    /// This uses `serde_path_to_error` to surface a best-effort "path" (e.g. `patients[2].status`)
    /// to the failing field when the YAML does not match the wire schema.
    ///
    /// # Errors
    ///
    /// Returns [`ReferralError`] if:
    /// - the YAML does not match the registry schema (unknown keys included),
    /// - a record's status disagrees with its stage fields,
    /// - two records share an id.
    pub fn parse(yaml_text: &str) -> Result<Vec<Patient>, ReferralError> {
        let deserializer = serde_yaml::Deserializer::from_str(yaml_text);

        let wire = match serde_path_to_error::deserialize::<_, RegistryWire>(deserializer) {
            Ok(parsed) => parsed,
            Err(err) => {
                let path = err.path().to_string();
                let source = err.into_inner();
                let path = if path.is_empty() {
                    "<root>"
                } else {
                    path.as_str()
                };
                return Err(ReferralError::Translation(format!(
                    "Registry schema mismatch at {path}: {source}"
                )));
            }
        };

        let mut seen = HashSet::new();
        let mut patients = Vec::with_capacity(wire.patients.len());
        for entry in wire.patients {
            let patient = Patient::from_wire(entry)?;
            if !seen.insert(patient.id().clone()) {
                return Err(ReferralError::Translation(format!(
                    "duplicate patient id: {}",
                    patient.id()
                )));
            }
            patients.push(patient);
        }

        Ok(patients)
    }

    /// Render patients as registry YAML, preserving their order.
    ///
    /// # Errors
    ///
    /// Returns [`ReferralError`] if serialisation fails.
    pub fn render(patients: &[Patient]) -> Result<String, ReferralError> {
        let wire = RegistryWire {
            patients: patients.iter().map(Patient::to_wire).collect(),
        };
        serde_yaml::to_string(&wire)
            .map_err(|e| ReferralError::Translation(format!("Failed to serialize registry: {e}")))
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct RegistryWire {
    patients: Vec<PatientWire>,
}

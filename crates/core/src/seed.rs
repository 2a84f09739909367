//! Registry seeding.

use crate::constants::SEED_REGISTRY_YAML;
use crate::{TriageError, TriageResult};
use referral::{Patient, Registry};
use std::path::Path;

/// The built-in registry.
pub fn embedded() -> TriageResult<Vec<Patient>> {
    Ok(Registry::parse(SEED_REGISTRY_YAML)?)
}

/// A registry read from a YAML file.
pub fn from_file(path: &Path) -> TriageResult<Vec<Patient>> {
    let text = std::fs::read_to_string(path).map_err(|source| TriageError::SeedRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Registry::parse(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use referral::{Department, ReferralStatus};

    #[test]
    fn embedded_registry_is_valid() {
        let patients = embedded().expect("embedded seed");
        let ids: Vec<_> = patients.iter().map(|p| p.id().as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4", "5", "6"]);
        assert_eq!(patients[3].department(), Some(Department::PlasticSurgery));
        assert_eq!(patients[5].status(), ReferralStatus::Confirmed);
        assert!(patients[1].comorbidities().is_empty());
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("absent.yaml");
        let err = from_file(&path).expect_err("missing file");
        match err {
            TriageError::SeedRead { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("expected SeedRead, got {other:?}"),
        }
    }

    #[test]
    fn invalid_file_surfaces_referral_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("patients.yaml");
        std::fs::write(&path, "patients: 3\n").expect("write");
        assert!(matches!(from_file(&path), Err(TriageError::Referral(_))));
    }
}

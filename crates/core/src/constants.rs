//! Constants used throughout the triage core crate.

/// Built-in patient registry used when no seed file is configured.
pub const SEED_REGISTRY_YAML: &str = include_str!("../seed/patients.yaml");

/// Days from referral to the pathway target for a Two-Week-Wait referral.
pub const TWO_WEEK_WAIT_TARGET_DAYS: i64 = 14;

/// Days from referral to the pathway target for an urgent referral.
pub const URGENT_TARGET_DAYS: i64 = 7;

/// Days from referral to the pathway target for every other referral.
pub const ROUTINE_TARGET_DAYS: i64 = 30;

/// Waiting days beyond which clinical risk is rated high.
pub const CLINICAL_RISK_WAITING_DAYS: u32 = 10;

/// Comorbidity count beyond which surgical risk is raised.
pub const SURGICAL_RISK_COMORBIDITIES: usize = 2;

/// Comorbidity label fragments that indicate anticoagulation (matched case-insensitively).
pub const ANTICOAGULANT_MARKERS: &[&str] = &["warfarin", "anticoagulant"];

/// GP note fragments that raise cancer risk (matched case-insensitively).
pub const CANCER_MARKERS: &[&str] = &["cancer", "malignant"];

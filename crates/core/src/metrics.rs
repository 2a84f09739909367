//! Management metrics over the patient registry.

use chrono::NaiveDate;
use referral::{Department, Patient, ReferralStatus, Urgency};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub status: ReferralStatus,
    pub count: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentShare {
    pub department: Department,
    pub count: usize,
    /// Share of all referrals, rounded to a whole percent.
    pub percent: u32,
}

/// Pipeline stage holding a backlog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Backlog {
    Intake,
    Triage,
    Scheduling,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagementMetrics {
    pub total: usize,
    /// One entry per status, in pipeline order.
    pub by_status: Vec<StatusCount>,
    pub urgent: usize,
    pub departments: Vec<DepartmentShare>,
    /// Scheduled and confirmed referrals as a whole percent of the total.
    pub booking_rate: u32,
    /// Mean days since referral across open (non-terminal) referrals.
    pub average_wait_days: Option<f64>,
    pub bottleneck: Option<Backlog>,
}

/// Compute metrics for `patients` as of `today`.
pub fn compute(patients: &[Patient], today: NaiveDate) -> ManagementMetrics {
    let total = patients.len();
    let count_status =
        |status: ReferralStatus| patients.iter().filter(|p| p.status() == status).count();

    let by_status: Vec<StatusCount> = ReferralStatus::ALL
        .into_iter()
        .map(|status| StatusCount {
            status,
            count: count_status(status),
        })
        .collect();

    let urgent = patients
        .iter()
        .filter(|p| p.effective_urgency() == Urgency::Urgent)
        .count();

    let departments = Department::ALL
        .into_iter()
        .map(|department| {
            let count = patients
                .iter()
                .filter(|p| p.department() == Some(department))
                .count();
            DepartmentShare {
                department,
                count,
                percent: percent(count, total),
            }
        })
        .collect();

    let booked = count_status(ReferralStatus::Scheduled) + count_status(ReferralStatus::Confirmed);

    let open: Vec<i64> = patients
        .iter()
        .filter(|p| !p.status().is_terminal())
        .map(|p| (today - p.referral_date()).num_days().max(0))
        .collect();
    let average_wait_days = if open.is_empty() {
        None
    } else {
        Some(open.iter().sum::<i64>() as f64 / open.len() as f64)
    };

    let backlogs = [
        (Backlog::Intake, count_status(ReferralStatus::IntakeReview)),
        (Backlog::Triage, count_status(ReferralStatus::TriagePending)),
        (
            Backlog::Scheduling,
            count_status(ReferralStatus::AwaitingScheduling),
        ),
    ];
    // First maximum wins so ties resolve in pipeline order.
    let bottleneck = backlogs
        .iter()
        .fold(None::<(Backlog, usize)>, |best, &(stage, count)| match best {
            Some((_, top)) if top >= count => best,
            _ if count > 0 => Some((stage, count)),
            _ => best,
        })
        .map(|(stage, _)| stage);

    ManagementMetrics {
        total,
        by_status,
        urgent,
        departments,
        booking_rate: percent(booked, total),
        average_wait_days,
        bottleneck,
    }
}

fn percent(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((part as f64 / total as f64) * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 25).expect("date")
    }

    fn count(metrics: &ManagementMetrics, status: ReferralStatus) -> usize {
        metrics
            .by_status
            .iter()
            .find(|c| c.status == status)
            .map_or(0, |c| c.count)
    }

    #[test]
    fn seeded_registry_metrics() {
        let patients = seed::embedded().expect("seed");
        let metrics = compute(&patients, today());

        assert_eq!(metrics.total, 6);
        assert_eq!(count(&metrics, ReferralStatus::IntakeReview), 2);
        assert_eq!(count(&metrics, ReferralStatus::TriagePending), 2);
        assert_eq!(count(&metrics, ReferralStatus::AwaitingScheduling), 1);
        assert_eq!(count(&metrics, ReferralStatus::Confirmed), 1);
        assert_eq!(count(&metrics, ReferralStatus::Rejected), 0);
        assert_eq!(metrics.urgent, 2);

        let derm = &metrics.departments[0];
        assert_eq!((derm.department, derm.count, derm.percent), (Department::Dermatology, 4, 67));
        let plastics = &metrics.departments[1];
        assert_eq!((plastics.count, plastics.percent), (2, 33));

        assert_eq!(metrics.booking_rate, 17);
        // Open referrals: 10, 7, 5, 15 and 3 days.
        assert_eq!(metrics.average_wait_days, Some(8.0));
        assert_eq!(metrics.bottleneck, Some(Backlog::Intake));
    }

    #[test]
    fn empty_registry_has_zero_percentages() {
        let metrics = compute(&[], today());
        assert_eq!(metrics.total, 0);
        assert_eq!(metrics.booking_rate, 0);
        assert!(metrics.departments.iter().all(|d| d.percent == 0));
        assert_eq!(metrics.average_wait_days, None);
        assert_eq!(metrics.bottleneck, None);
    }

    #[test]
    fn bottleneck_prefers_larger_backlog() {
        let patients: Vec<_> = seed::embedded()
            .expect("seed")
            .into_iter()
            .filter(|p| p.status() != ReferralStatus::IntakeReview)
            .collect();
        let metrics = compute(&patients, today());
        assert_eq!(metrics.bottleneck, Some(Backlog::Triage));
    }
}

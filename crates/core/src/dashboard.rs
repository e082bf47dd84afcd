//! Ward dashboard views over a list of patients.

use crate::patient::Patient;
use crate::risk::{RiskTier, TierPolicy};
use serde::Serialize;

/// Patient counts per risk tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total: usize,
    pub critical: usize,
    pub high: usize,
    pub moderate: usize,
    pub low: usize,
}

impl DashboardStats {
    pub fn count(&self, tier: RiskTier) -> usize {
        match tier {
            RiskTier::Critical => self.critical,
            RiskTier::High => self.high,
            RiskTier::Moderate => self.moderate,
            RiskTier::Low => self.low,
        }
    }
}

pub fn stats(patients: &[Patient], policy: TierPolicy) -> DashboardStats {
    patients
        .iter()
        .fold(DashboardStats::default(), |mut acc, patient| {
            acc.total += 1;
            match patient.risk(policy).tier {
                RiskTier::Critical => acc.critical += 1,
                RiskTier::High => acc.high += 1,
                RiskTier::Moderate => acc.moderate += 1,
                RiskTier::Low => acc.low += 1,
            }
            acc
        })
}

pub fn filter_by_tier(patients: Vec<Patient>, tier: RiskTier, policy: TierPolicy) -> Vec<Patient> {
    patients
        .into_iter()
        .filter(|p| p.risk(policy).tier == tier)
        .collect()
}

/// Case-insensitive substring search over name, room and diagnosis.
///
/// A blank query matches everyone.
pub fn search(patients: Vec<Patient>, query: &str) -> Vec<Patient> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return patients;
    }

    patients
        .into_iter()
        .filter(|p| {
            [p.name.as_str(), p.room.as_str(), p.diagnosis.as_str()]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
        })
        .collect()
}

/// Orders patients most at risk first: by tier, then by ascending Braden score, then by name.
pub fn sort_by_severity(patients: &mut [Patient], policy: TierPolicy) {
    patients.sort_by(|a, b| {
        let (ra, rb) = (a.risk(policy), b.risk(policy));
        ra.tier
            .cmp(&rb.tier)
            .then(ra.score.cmp(&rb.score))
            .then_with(|| a.name.as_str().cmp(b.name.as_str()))
    });
}

//! Risk tiers derived from the Braden score.
//!
//! Two classification paths exist:
//!
//! - **Braden** (canonical): fixed thresholds on the integer score.
//! - **Legacy normalised**: thresholds on the normalised risk `(12 - score) / 9`. The dashboard's
//!   progress bars historically coloured themselves this way. It disagrees with the canonical
//!   path at scores 5, 7 and 9 and is kept only behind [`TierPolicy::LegacyNormalized`].

use crate::braden::{BradenAssessment, BradenScore};
use crate::constants::BRADEN_SCORE_MAX;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ordinal pressure-ulcer risk tier.
///
/// Variants are declared most severe first, so the derived ordering sorts by severity
/// (`Critical < High < Moderate < Low`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Critical,
    High,
    Moderate,
    Low,
}

impl RiskTier {
    /// All tiers, most severe first.
    pub const ALL: [RiskTier; 4] = [
        RiskTier::Critical,
        RiskTier::High,
        RiskTier::Moderate,
        RiskTier::Low,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Critical => "critical",
            RiskTier::High => "high",
            RiskTier::Moderate => "moderate",
            RiskTier::Low => "low",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "critical" => Ok(RiskTier::Critical),
            "high" => Ok(RiskTier::High),
            "moderate" => Ok(RiskTier::Moderate),
            "low" => Ok(RiskTier::Low),
            other => Err(format!("unknown risk tier: '{}'", other)),
        }
    }
}

/// Classifies a Braden score using the canonical thresholds.
///
/// | score  | tier     |
/// |--------|----------|
/// | ≤ 4    | critical |
/// | 5–6    | high     |
/// | 7–8    | moderate |
/// | ≥ 9    | low      |
pub fn classify_risk_tier(score: BradenScore) -> RiskTier {
    match score.value() {
        0..=4 => RiskTier::Critical,
        5..=6 => RiskTier::High,
        7..=8 => RiskTier::Moderate,
        _ => RiskTier::Low,
    }
}

/// Continuous risk in `[0, 1]`, stored in hundredths so comparisons are exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedRisk(u8);

impl NormalizedRisk {
    /// The value in hundredths, `0..=100`.
    pub fn hundredths(&self) -> u8 {
        self.0
    }

    pub fn value(&self) -> f64 {
        f64::from(self.0) / 100.0
    }
}

impl fmt::Display for NormalizedRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.value())
    }
}

impl Serialize for NormalizedRisk {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_f64(self.value())
    }
}

/// Computes `clamp((12 - score) / 9, 0, 1)` rounded half-up to two decimals.
///
/// The division is done in integers: `round_half_up(x * 100 / 9)` equals
/// `(x * 200 + 9) / 18` with truncating division.
pub fn compute_normalized_risk(score: BradenScore) -> NormalizedRisk {
    let distance = u32::from(BRADEN_SCORE_MAX.saturating_sub(score.value()));
    let hundredths = ((distance * 200 + 9) / 18).min(100);
    NormalizedRisk(hundredths as u8)
}

/// Classifies a normalised risk using the legacy thresholds
/// (≥0.70 critical, ≥0.50 high, ≥0.30 moderate, else low).
pub fn classify_normalized_risk(risk: NormalizedRisk) -> RiskTier {
    match risk.hundredths() {
        70..=u8::MAX => RiskTier::Critical,
        50..=69 => RiskTier::High,
        30..=49 => RiskTier::Moderate,
        _ => RiskTier::Low,
    }
}

/// Which classification path a consumer uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TierPolicy {
    /// Thresholds on the Braden score.
    #[default]
    Braden,
    /// Thresholds on the normalised risk.
    #[serde(rename = "legacy")]
    LegacyNormalized,
}

impl TierPolicy {
    pub fn classify(&self, score: BradenScore) -> RiskTier {
        match self {
            TierPolicy::Braden => classify_risk_tier(score),
            TierPolicy::LegacyNormalized => classify_normalized_risk(compute_normalized_risk(score)),
        }
    }
}

impl FromStr for TierPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "braden" => Ok(TierPolicy::Braden),
            "legacy" => Ok(TierPolicy::LegacyNormalized),
            other => Err(format!(
                "unknown tier policy '{}' (expected 'braden' or 'legacy')",
                other
            )),
        }
    }
}

/// Everything derived from one assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskSummary {
    pub score: BradenScore,
    /// Tier under the policy the summary was built with.
    pub tier: RiskTier,
    pub normalized_risk: NormalizedRisk,
    /// Tier under the legacy normalised thresholds, for comparison.
    pub legacy_tier: RiskTier,
}

impl RiskSummary {
    pub fn of(assessment: &BradenAssessment, policy: TierPolicy) -> Self {
        let score = assessment.score();
        let normalized_risk = compute_normalized_risk(score);
        Self {
            score,
            tier: policy.classify(score),
            normalized_risk,
            legacy_tier: classify_normalized_risk(normalized_risk),
        }
    }
}

//! Reduced Braden assessment and score.
//!
//! The ward uses a three-factor variant of the Braden scale: sensory perception, moisture and
//! activity, each scored 1 (worst) to 4 (best). The Braden score is their plain sum, so it
//! always lies in `3..=12`.
//!
//! Out-of-range, missing or non-integer sub-scores are rejected with
//! [`RiskError::InvalidInput`]; nothing is ever clamped.

use crate::constants::{BRADEN_SCORE_MAX, BRADEN_SCORE_MIN, SUB_SCORE_MAX, SUB_SCORE_MIN};
use crate::error::{RiskError, RiskResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Names of the three sub-scores, as they appear on the wire.
pub const SENSORY_PERCEPTION: &str = "sensoryPerception";
pub const MOISTURE: &str = "moisture";
pub const ACTIVITY: &str = "activity";

/// A validated point-in-time Braden observation.
///
/// Fields are private so an assessment can only exist with every sub-score in `1..=4`. To change
/// a sub-score, build a new assessment with [`BradenAssessment::with_sub_scores`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawBradenAssessment")]
pub struct BradenAssessment {
    sensory_perception: u8,
    moisture: u8,
    activity: u8,
}

impl BradenAssessment {
    /// Builds an assessment from integer sub-scores.
    ///
    /// # Errors
    ///
    /// Returns [`RiskError::InvalidInput`] naming the first sub-score outside `1..=4`.
    pub fn new(sensory_perception: i64, moisture: i64, activity: i64) -> RiskResult<Self> {
        Ok(Self {
            sensory_perception: check_range(SENSORY_PERCEPTION, sensory_perception)?,
            moisture: check_range(MOISTURE, moisture)?,
            activity: check_range(ACTIVITY, activity)?,
        })
    }

    pub fn sensory_perception(&self) -> u8 {
        self.sensory_perception
    }

    pub fn moisture(&self) -> u8 {
        self.moisture
    }

    pub fn activity(&self) -> u8 {
        self.activity
    }

    /// Returns a new assessment with any of the given sub-scores replaced.
    ///
    /// # Errors
    ///
    /// Returns [`RiskError::InvalidInput`] if a replacement is outside `1..=4`. `self` is left
    /// untouched either way.
    pub fn with_sub_scores(
        &self,
        sensory_perception: Option<i64>,
        moisture: Option<i64>,
        activity: Option<i64>,
    ) -> RiskResult<Self> {
        Self::new(
            sensory_perception.unwrap_or(i64::from(self.sensory_perception)),
            moisture.unwrap_or(i64::from(self.moisture)),
            activity.unwrap_or(i64::from(self.activity)),
        )
    }

    /// The Braden score for this assessment, recomputed on every call.
    pub fn score(&self) -> BradenScore {
        BradenScore(self.sensory_perception + self.moisture + self.activity)
    }
}

/// Sum of the three sub-scores, in `3..=12`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct BradenScore(u8);

impl BradenScore {
    /// Wraps an already-summed score.
    ///
    /// # Errors
    ///
    /// Returns [`RiskError::InvalidInput`] if `value` is outside `3..=12`.
    pub fn new(value: i64) -> RiskResult<Self> {
        if (i64::from(BRADEN_SCORE_MIN)..=i64::from(BRADEN_SCORE_MAX)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(RiskError::InvalidInput(format!(
                "braden score must be between {} and {}, got {}",
                BRADEN_SCORE_MIN, BRADEN_SCORE_MAX, value
            )))
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl std::fmt::Display for BradenScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Computes the Braden score from three integer sub-scores.
///
/// # Errors
///
/// Returns [`RiskError::InvalidInput`] if any sub-score is outside `1..=4`.
pub fn compute_braden_score(
    sensory_perception: i64,
    moisture: i64,
    activity: i64,
) -> RiskResult<BradenScore> {
    Ok(BradenAssessment::new(sensory_perception, moisture, activity)?.score())
}

/// An assessment exactly as received from a client, before validation.
///
/// Each field is kept as an untyped JSON value so that a missing field, a fractional number or
/// a string can be told apart from an out-of-range integer and reported precisely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBradenAssessment {
    #[serde(default)]
    pub sensory_perception: Option<Value>,
    #[serde(default)]
    pub moisture: Option<Value>,
    #[serde(default)]
    pub activity: Option<Value>,
}

impl RawBradenAssessment {
    /// Validates every sub-score and builds a [`BradenAssessment`].
    ///
    /// # Errors
    ///
    /// Returns [`RiskError::InvalidInput`] if a sub-score is missing, not an integer, or
    /// outside `1..=4`.
    pub fn validate(&self) -> RiskResult<BradenAssessment> {
        BradenAssessment::new(
            sub_score_from_value(SENSORY_PERCEPTION, self.sensory_perception.as_ref())?,
            sub_score_from_value(MOISTURE, self.moisture.as_ref())?,
            sub_score_from_value(ACTIVITY, self.activity.as_ref())?,
        )
    }

    /// Applies the sub-scores present in `self` on top of `base`.
    ///
    /// Absent (or `null`) fields keep their value from `base`.
    pub fn merge_onto(&self, base: &BradenAssessment) -> RiskResult<BradenAssessment> {
        let pick = |field: &str, value: &Option<Value>| -> RiskResult<Option<i64>> {
            match value {
                None => Ok(None),
                Some(v) => sub_score_from_value(field, Some(v)).map(Some),
            }
        };

        base.with_sub_scores(
            pick(SENSORY_PERCEPTION, &self.sensory_perception)?,
            pick(MOISTURE, &self.moisture)?,
            pick(ACTIVITY, &self.activity)?,
        )
    }
}

impl TryFrom<RawBradenAssessment> for BradenAssessment {
    type Error = RiskError;

    fn try_from(raw: RawBradenAssessment) -> Result<Self, Self::Error> {
        raw.validate()
    }
}

/// Extracts an integral sub-score from an optional JSON value.
///
/// Whole-valued floats such as `3.0` count as integers.
pub fn sub_score_from_value(field: &str, value: Option<&Value>) -> RiskResult<i64> {
    let number = match value {
        None | Some(Value::Null) => {
            return Err(RiskError::InvalidInput(format!("{} is missing", field)))
        }
        Some(Value::Number(n)) => n,
        Some(other) => {
            return Err(RiskError::InvalidInput(format!(
                "{} must be an integer, got {}",
                field, other
            )))
        }
    };

    if let Some(i) = number.as_i64() {
        return Ok(i);
    }

    match number.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() <= i64::MAX as f64 => {
            Ok(f as i64)
        }
        _ => Err(RiskError::InvalidInput(format!(
            "{} must be an integer, got {}",
            field, number
        ))),
    }
}

fn check_range(field: &str, value: i64) -> RiskResult<u8> {
    if (i64::from(SUB_SCORE_MIN)..=i64::from(SUB_SCORE_MAX)).contains(&value) {
        Ok(value as u8)
    } else {
        Err(RiskError::InvalidInput(format!(
            "{} must be between {} and {}, got {}",
            field, SUB_SCORE_MIN, SUB_SCORE_MAX, value
        )))
    }
}

//! Input validation for patient metadata.
//!
//! Braden sub-scores are validated by [`crate::braden`]; this module covers everything else a
//! patient record carries.

use crate::patient::Vitals;
use crate::{PatientError, PatientResult};

/// Highest pressure-ulcer stage recorded on the ward (NPIAP stages 1-4).
pub const MAX_ULCER_STAGE: u8 = 4;

const MAX_FREE_TEXT_LEN: usize = 200;

/// Validates an optional ulcer stage.
///
/// # Errors
///
/// Returns `PatientError::InvalidInput` if the stage is outside `1..=4`.
pub fn validate_ulcer_stage(stage: Option<u8>) -> PatientResult<Option<u8>> {
    match stage {
        Some(s) if !(1..=MAX_ULCER_STAGE).contains(&s) => Err(PatientError::InvalidInput(format!(
            "ulcerStage must be between 1 and {}, got {}",
            MAX_ULCER_STAGE, s
        ))),
        other => Ok(other),
    }
}

/// Trims free text and bounds its length. Blank input becomes `None`.
pub fn normalise_optional_text(field: &str, value: Option<String>) -> PatientResult<Option<String>> {
    let Some(value) = value else {
        return Ok(None);
    };
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > MAX_FREE_TEXT_LEN {
        return Err(PatientError::InvalidInput(format!(
            "{} exceeds maximum length of {} characters",
            field, MAX_FREE_TEXT_LEN
        )));
    }
    Ok(Some(trimmed.to_owned()))
}

/// Rejects vitals outside physiologically plausible bounds.
///
/// These are data-entry guardrails, not clinical alarm limits.
pub fn validate_vitals(vitals: &Vitals) -> PatientResult<()> {
    fn check<T: PartialOrd + std::fmt::Display>(
        field: &str,
        value: Option<T>,
        min: T,
        max: T,
    ) -> PatientResult<()> {
        match value {
            Some(v) if v < min || v > max => Err(PatientError::InvalidInput(format!(
                "{} must be between {} and {}, got {}",
                field, min, max, v
            ))),
            _ => Ok(()),
        }
    }

    check("heartRate", vitals.heart_rate, 20, 300)?;
    check("systolicBp", vitals.systolic_bp, 40, 300)?;
    check("diastolicBp", vitals.diastolic_bp, 20, 200)?;
    check("temperatureC", vitals.temperature_c, 30.0, 45.0)?;
    check("spo2", vitals.spo2, 50, 100)?;

    if let (Some(sys), Some(dia)) = (vitals.systolic_bp, vitals.diastolic_bp) {
        if dia >= sys {
            return Err(PatientError::InvalidInput(
                "diastolicBp must be lower than systolicBp".into(),
            ));
        }
    }

    if let Some(t) = vitals.temperature_c {
        if t.is_nan() {
            return Err(PatientError::InvalidInput("temperatureC is not a number".into()));
        }
    }

    Ok(())
}

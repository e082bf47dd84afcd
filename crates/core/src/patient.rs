//! Patient records.
//!
//! A [`Patient`] carries the clinical metadata shown on the ward dashboard together with the
//! patient's current [`BradenAssessment`]. The Braden score, tier and normalised risk are never
//! stored; [`Patient::risk`] derives them on every call.

use crate::braden::{BradenAssessment, RawBradenAssessment};
use crate::risk::{RiskSummary, TierPolicy};
use crate::validation::{normalise_optional_text, validate_ulcer_stage, validate_vitals};
use crate::{NonEmptyText, PatientId, PatientResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Most recent vital signs. Every reading is optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vitals {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub systolic_bp: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diastolic_bp: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_c: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spo2: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: PatientId,
    pub name: NonEmptyText,
    pub room: NonEmptyText,
    pub diagnosis: NonEmptyText,
    pub ulcer_stage: Option<u8>,
    pub ulcer_location: Option<String>,
    pub vitals: Vitals,
    pub braden: BradenAssessment,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Patient {
    pub fn risk(&self, policy: TierPolicy) -> RiskSummary {
        RiskSummary::of(&self.braden, policy)
    }
}

/// Data for a new patient, as submitted by a client.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPatient {
    pub name: String,
    pub room: String,
    pub diagnosis: String,
    #[serde(default)]
    pub ulcer_stage: Option<u8>,
    #[serde(default)]
    pub ulcer_location: Option<String>,
    #[serde(default)]
    pub vitals: Vitals,
    #[serde(default)]
    pub braden: RawBradenAssessment,
}

impl NewPatient {
    /// Validates the submission and builds a record with the given identity.
    ///
    /// The caller owns identity allocation; see [`crate::repositories`].
    pub fn into_patient(self, id: PatientId, now: DateTime<Utc>) -> PatientResult<Patient> {
        let braden = self.braden.validate()?;
        validate_vitals(&self.vitals)?;

        Ok(Patient {
            id,
            name: NonEmptyText::new(self.name)?,
            room: NonEmptyText::new(self.room)?,
            diagnosis: NonEmptyText::new(self.diagnosis)?,
            ulcer_stage: validate_ulcer_stage(self.ulcer_stage)?,
            ulcer_location: normalise_optional_text("ulcerLocation", self.ulcer_location)?,
            vitals: self.vitals,
            braden,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Partial update. Absent fields are left as they are.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub room: Option<String>,
    #[serde(default)]
    pub diagnosis: Option<String>,
    #[serde(default)]
    pub ulcer_stage: Option<u8>,
    #[serde(default)]
    pub ulcer_location: Option<String>,
    /// Removes any recorded ulcer stage and location. Applied before `ulcerStage` and
    /// `ulcerLocation`.
    #[serde(default)]
    pub clear_ulcer: bool,
    #[serde(default)]
    pub vitals: Option<Vitals>,
    #[serde(default)]
    pub braden: Option<RawBradenAssessment>,
}

impl PatientUpdate {
    /// Returns the updated record, leaving `current` untouched.
    ///
    /// # Errors
    ///
    /// Returns the first validation error; nothing is applied in that case.
    pub fn apply(&self, current: &Patient, now: DateTime<Utc>) -> PatientResult<Patient> {
        let mut next = current.clone();

        if let Some(name) = &self.name {
            next.name = NonEmptyText::new(name)?;
        }
        if let Some(room) = &self.room {
            next.room = NonEmptyText::new(room)?;
        }
        if let Some(diagnosis) = &self.diagnosis {
            next.diagnosis = NonEmptyText::new(diagnosis)?;
        }
        if self.clear_ulcer {
            next.ulcer_stage = None;
            next.ulcer_location = None;
        }
        if self.ulcer_stage.is_some() {
            next.ulcer_stage = validate_ulcer_stage(self.ulcer_stage)?;
        }
        if self.ulcer_location.is_some() {
            next.ulcer_location =
                normalise_optional_text("ulcerLocation", self.ulcer_location.clone())?;
        }
        if let Some(vitals) = self.vitals {
            validate_vitals(&vitals)?;
            next.vitals = vitals;
        }
        if let Some(braden) = &self.braden {
            next.braden = braden.merge_onto(&current.braden)?;
        }

        next.updated_at = now;
        Ok(next)
    }
}

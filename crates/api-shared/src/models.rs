//! Request and response bodies.
//!
//! Field names are camelCase on the wire. Braden sub-scores in requests are taken as raw JSON
//! values so that missing and non-integer inputs reach the risk engine and are reported by it.

use puw_core::dashboard::DashboardStats;
use puw_core::{
    NewPatient, Patient, PatientUpdate, Prediction, RawBradenAssessment, Recommendation,
    RiskSummary, TierPolicy, Vitals,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Error body returned with every non-2xx response produced by this server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VitalsDto {
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

impl From<Vitals> for VitalsDto {
    fn from(v: Vitals) -> Self {
        Self {
            heart_rate: v.heart_rate,
            systolic_bp: v.systolic_bp,
            diastolic_bp: v.diastolic_bp,
            temperature_c: v.temperature_c,
            spo2: v.spo2,
        }
    }
}

impl From<VitalsDto> for Vitals {
    fn from(v: VitalsDto) -> Self {
        Self {
            heart_rate: v.heart_rate,
            systolic_bp: v.systolic_bp,
            diastolic_bp: v.diastolic_bp,
            temperature_c: v.temperature_c,
            spo2: v.spo2,
        }
    }
}

/// Braden sub-scores as submitted. Each must be an integer in 1–4.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BradenReq {
    #[serde(default)]
    #[schema(value_type = Option<i64>, example = 2)]
    pub sensory_perception: Option<Value>,
    #[serde(default)]
    #[schema(value_type = Option<i64>, example = 3)]
    pub moisture: Option<Value>,
    #[serde(default)]
    #[schema(value_type = Option<i64>, example = 1)]
    pub activity: Option<Value>,
}

impl From<BradenReq> for RawBradenAssessment {
    fn from(req: BradenReq) -> Self {
        Self {
            sensory_perception: req.sensory_perception,
            moisture: req.moisture,
            activity: req.activity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BradenRes {
    pub sensory_perception: u8,
    pub moisture: u8,
    pub activity: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RiskRes {
    /// Braden score, 3–12.
    pub score: u8,
    /// `critical`, `high`, `moderate` or `low`, under the server's tier policy.
    pub tier: String,
    /// `(12 - score) / 9`, two decimals.
    pub normalized_risk: f64,
    /// Tier under the legacy normalised-risk thresholds.
    pub legacy_tier: String,
}

impl From<RiskSummary> for RiskRes {
    fn from(s: RiskSummary) -> Self {
        Self {
            score: s.score.value(),
            tier: s.tier.as_str().into(),
            normalized_risk: s.normalized_risk.value(),
            legacy_tier: s.legacy_tier.as_str().into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientRes {
    pub id: String,
    pub name: String,
    pub room: String,
    pub diagnosis: String,
    pub ulcer_stage: Option<u8>,
    pub ulcer_location: Option<String>,
    pub vitals: VitalsDto,
    pub braden: BradenRes,
    pub risk: RiskRes,
    /// RFC 3339.
    pub created_at: String,
    /// RFC 3339.
    pub updated_at: String,
}

impl PatientRes {
    pub fn from_patient(patient: &Patient, policy: TierPolicy) -> Self {
        Self {
            id: patient.id.to_string(),
            name: patient.name.as_str().into(),
            room: patient.room.as_str().into(),
            diagnosis: patient.diagnosis.as_str().into(),
            ulcer_stage: patient.ulcer_stage,
            ulcer_location: patient.ulcer_location.clone(),
            vitals: patient.vitals.into(),
            braden: BradenRes {
                sensory_perception: patient.braden.sensory_perception(),
                moisture: patient.braden.moisture(),
                activity: patient.braden.activity(),
            },
            risk: patient.risk(policy).into(),
            created_at: patient.created_at.to_rfc3339(),
            updated_at: patient.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ListPatientsRes {
    pub patients: Vec<PatientRes>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePatientReq {
    pub name: String,
    pub room: String,
    pub diagnosis: String,
    #[serde(default)]
    pub ulcer_stage: Option<u8>,
    #[serde(default)]
    pub ulcer_location: Option<String>,
    #[serde(default)]
    pub vitals: VitalsDto,
    #[serde(default)]
    pub braden: BradenReq,
}

impl From<CreatePatientReq> for NewPatient {
    fn from(req: CreatePatientReq) -> Self {
        Self {
            name: req.name,
            room: req.room,
            diagnosis: req.diagnosis,
            ulcer_stage: req.ulcer_stage,
            ulcer_location: req.ulcer_location,
            vitals: req.vitals.into(),
            braden: req.braden.into(),
        }
    }
}

/// Partial update; omitted fields are left unchanged.
///
/// `braden` may carry any subset of the sub-scores. `vitals`, when present, replaces the
/// stored vitals as a whole.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePatientReq {
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
    #[serde(default)]
    pub clear_ulcer: bool,
    #[serde(default)]
    pub vitals: Option<VitalsDto>,
    #[serde(default)]
    pub braden: Option<BradenReq>,
}

impl From<UpdatePatientReq> for PatientUpdate {
    fn from(req: UpdatePatientReq) -> Self {
        Self {
            name: req.name,
            room: req.room,
            diagnosis: req.diagnosis,
            ulcer_stage: req.ulcer_stage,
            ulcer_location: req.ulcer_location,
            clear_ulcer: req.clear_ulcer,
            vitals: req.vitals.map(Into::into),
            braden: req.braden.map(Into::into),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PredictionDto {
    pub risk_level: String,
    pub prediction_message: String,
    /// Detected language of `riskLevel`: `ko` or `en`.
    pub language: String,
}

impl From<&Prediction> for PredictionDto {
    fn from(p: &Prediction) -> Self {
        Self {
            risk_level: p.risk_level.as_str().into(),
            prediction_message: p.prediction_message.clone(),
            language: p.risk_level.language().tag().into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRes {
    /// `urgent`, `enhanced`, `routine` or `general`.
    pub urgency: String,
    pub title: String,
    pub actions: Vec<String>,
}

impl From<Recommendation> for RecommendationRes {
    fn from(r: Recommendation) -> Self {
        Self {
            urgency: r.urgency.as_str().into(),
            title: r.title.into(),
            actions: r.actions.iter().map(|a| (*a).to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRes {
    pub patient_id: String,
    /// Prediction to show. Absent when the service has none or reported no signal.
    pub prediction: Option<PredictionDto>,
    /// The service answered, but its message says there is nothing to assess.
    pub no_signal: bool,
    /// Whether `prediction` differs meaningfully from what this server last showed for the
    /// patient. If not, `prediction` is the earlier one.
    pub changed: bool,
    pub recommendation: Option<RecommendationRes>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DashboardStatsRes {
    pub total: usize,
    pub critical: usize,
    pub high: usize,
    pub moderate: usize,
    pub low: usize,
}

impl From<DashboardStats> for DashboardStatsRes {
    fn from(s: DashboardStats) -> Self {
        Self {
            total: s.total,
            critical: s.critical,
            high: s.high,
            moderate: s.moderate,
            low: s.low,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use puw_core::{InMemoryPatientRepository, PatientRepository};
    use serde_json::json;

    fn sample_patient() -> Patient {
        let repo = InMemoryPatientRepository::new();
        repo.create(NewPatient {
            name: "Kim Minjun".into(),
            room: "301".into(),
            diagnosis: "Hip fracture".into(),
            braden: RawBradenAssessment {
                sensory_perception: Some(json!(2)),
                moisture: Some(json!(2)),
                activity: Some(json!(1)),
            },
            ..Default::default()
        })
        .expect("valid patient")
    }

    #[test]
    fn test_patient_res_carries_derived_risk() {
        let patient = sample_patient();
        let res = PatientRes::from_patient(&patient, TierPolicy::Braden);

        assert_eq!(res.id.len(), 32);
        assert_eq!(res.risk.score, 5);
        assert_eq!(res.risk.tier, "high");
        assert_eq!(res.risk.normalized_risk, 0.78);
        assert_eq!(res.risk.legacy_tier, "critical");

        let value = serde_json::to_value(&res).unwrap();
        assert_eq!(value["braden"]["sensoryPerception"], json!(2));
        assert!(value.get("createdAt").is_some());
    }

    #[test]
    fn test_create_request_keeps_raw_sub_scores() {
        let req: CreatePatientReq = serde_json::from_value(json!({
            "name": "Lee",
            "room": "2A",
            "diagnosis": "Stroke",
            "braden": { "sensoryPerception": 2.5, "moisture": 3 }
        }))
        .unwrap();

        let new: NewPatient = req.into();
        assert_eq!(new.braden.sensory_perception, Some(json!(2.5)));
        assert_eq!(new.braden.activity, None);
    }

    #[test]
    fn test_prediction_dto_tags_language() {
        let ko = PredictionDto::from(&Prediction::new("고위험", "천골 부위 온도 상승"));
        let en = PredictionDto::from(&Prediction::new("LOW", "Stable"));
        assert_eq!(ko.language, "ko");
        assert_eq!(en.language, "en");
    }
}

//! # PUW Core
//!
//! Core logic for the Pressure Ulcer Watch ward service.
//!
//! This crate contains pure, synchronous domain operations:
//! - Braden score computation and risk-tier classification ([`braden`], [`risk`])
//! - Change detection and no-signal filtering for external predictions ([`prediction`])
//! - Patient records and their repository ([`patient`], [`repositories`])
//! - Dashboard aggregation ([`dashboard`]) and care recommendations ([`recommendation`])
//! - The per-patient prediction view state machine ([`view`])
//!
//! **No I/O concerns**: HTTP clients, the reverse proxy and servers belong in `prediction` and
//! `api-rest`.

pub mod braden;
pub mod config;
pub mod constants;
pub mod dashboard;
pub mod error;
pub mod patient;
pub mod prediction;
pub mod recommendation;
pub mod repositories;
pub mod risk;
pub mod validation;
pub mod view;

pub use braden::{compute_braden_score, BradenAssessment, BradenScore, RawBradenAssessment};
pub use config::CoreConfig;
pub use error::{
    ConfigError, ConfigResult, PatientError, PatientResult, RiskError, RiskResult,
};
pub use patient::{NewPatient, Patient, PatientUpdate, Vitals};
pub use prediction::{has_meaningful_change, has_no_signal, Prediction, RiskLabel};
pub use puw_types::{Language, LocalisedText, NonEmptyText, TextError};
pub use puw_uuid::{PatientId, UuidError};
pub use recommendation::{recommendation_for, Recommendation, Urgency};
pub use repositories::{InMemoryPatientRepository, PatientRepository};
pub use risk::{
    classify_normalized_risk, classify_risk_tier, compute_normalized_risk, NormalizedRisk,
    RiskSummary, RiskTier, TierPolicy,
};
pub use view::{FetchTicket, PredictionView, PredictionWatch, ViewState, ViewUpdate};

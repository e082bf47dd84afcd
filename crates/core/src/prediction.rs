//! Predictions from the external risk service and the rules for acting on them.
//!
//! A [`Prediction`] is an opaque value: a free-text risk label plus a free-text message. The
//! label is never parsed. Two predictions are "meaningfully different" only when their labels
//! differ as text; message wording is ignored so that a re-phrased but identical conclusion
//! does not cause the display to churn.

use puw_types::LocalisedText;
use serde::{Deserialize, Serialize};

/// Risk label as returned by the prediction service, e.g. `HIGH` or `위험`.
pub type RiskLabel = LocalisedText;

/// Message fragments that mean the service had nothing to assess.
///
/// Matched as lower-cased substrings of the prediction message. The list mirrors the phrases
/// the prediction service is known to emit and must be kept verbatim.
pub const NO_SIGNAL_PHRASES: [&str; 7] = [
    "열화상 데이터가 없어",
    "아직 열화상 데이터가 없어",
    "데이터가 없어",
    "평가할 수 없습니다",
    "no thermal image",
    "no data available",
    "cannot be assessed",
];

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub risk_level: RiskLabel,
    pub prediction_message: String,
}

impl Prediction {
    pub fn new(risk_level: impl Into<String>, prediction_message: impl Into<String>) -> Self {
        Self {
            risk_level: RiskLabel::new(risk_level),
            prediction_message: prediction_message.into(),
        }
    }
}

/// Decides whether `current` should replace `previous` on screen.
///
/// - both absent: no change
/// - exactly one absent: change
/// - both present: change iff the risk labels differ
pub fn has_meaningful_change(previous: Option<&Prediction>, current: Option<&Prediction>) -> bool {
    match (previous, current) {
        (None, None) => false,
        (Some(_), None) | (None, Some(_)) => true,
        (Some(prev), Some(curr)) => prev.risk_level != curr.risk_level,
    }
}

/// True when the prediction's message says no data was available to assess.
pub fn has_no_signal(prediction: &Prediction) -> bool {
    let message = prediction.prediction_message.to_lowercase();
    NO_SIGNAL_PHRASES
        .iter()
        .any(|phrase| message.contains(phrase))
}

/// Drops a prediction that carries no signal, so callers can treat it as absent.
pub fn with_signal(prediction: Option<Prediction>) -> Option<Prediction> {
    prediction.filter(|p| !has_no_signal(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_absent_is_no_change() {
        assert!(!has_meaningful_change(None, None));
    }

    #[test]
    fn test_presence_flip_is_change() {
        let high = Prediction::new("HIGH", "Reposition every two hours.");
        assert!(has_meaningful_change(None, Some(&high)));
        assert!(has_meaningful_change(Some(&high), None));
    }

    #[test]
    fn test_message_only_difference_is_no_change() {
        let a = Prediction::new("HIGH", "A");
        let b = Prediction::new("HIGH", "B");
        assert!(!has_meaningful_change(Some(&a), Some(&b)));
    }

    #[test]
    fn test_label_difference_is_change() {
        let high = Prediction::new("HIGH", "same");
        let low = Prediction::new("LOW", "same");
        assert!(has_meaningful_change(Some(&high), Some(&low)));
    }

    #[test]
    fn test_label_comparison_is_exact_text() {
        let upper = Prediction::new("HIGH", "");
        let lower = Prediction::new("high", "");
        let korean = Prediction::new("위험", "");
        assert!(has_meaningful_change(Some(&upper), Some(&lower)));
        assert!(has_meaningful_change(Some(&upper), Some(&korean)));
    }

    #[test]
    fn test_no_signal_matches_case_insensitively() {
        let p = Prediction::new("LOW", "No thermal image data available for this patient.");
        assert!(has_no_signal(&p));

        let p = Prediction::new("LOW", "Cannot Be Assessed at this time");
        assert!(has_no_signal(&p));
    }

    #[test]
    fn test_no_signal_matches_korean_phrases() {
        let p = Prediction::new("낮음", "아직 열화상 데이터가 없어 위험도를 평가할 수 없습니다.");
        assert!(has_no_signal(&p));
    }

    #[test]
    fn test_ordinary_message_has_signal() {
        let p = Prediction::new("HIGH", "Risk level is elevated.");
        assert!(!has_no_signal(&p));
        assert_eq!(with_signal(Some(p.clone())), Some(p));
    }

    #[test]
    fn test_with_signal_drops_no_data_prediction() {
        let p = Prediction::new("LOW", "no data available");
        assert_eq!(with_signal(Some(p)), None);
        assert_eq!(with_signal(None), None);
    }

    #[test]
    fn test_wire_format_is_camel_case() {
        let p: Prediction = serde_json::from_str(
            r#"{"riskLevel":"위험","predictionMessage":"체위 변경이 필요합니다."}"#,
        )
        .unwrap();
        assert_eq!(p.risk_level.as_str(), "위험");
        assert_eq!(p.risk_level.language(), puw_types::Language::Korean);

        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["riskLevel"], "위험");
    }
}

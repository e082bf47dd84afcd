//! Care recommendations shown next to a prediction.
//!
//! A template is picked by exact equality on the prediction's risk label. Labels that are not
//! in the table get the general template; nothing is inferred from the label's wording.

use crate::prediction::RiskLabel;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Urgent,
    Enhanced,
    Routine,
    General,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Urgent => "urgent",
            Urgency::Enhanced => "enhanced",
            Urgency::Routine => "routine",
            Urgency::General => "general",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub urgency: Urgency,
    pub title: &'static str,
    pub actions: &'static [&'static str],
}

const URGENT: Recommendation = Recommendation {
    urgency: Urgency::Urgent,
    title: "Immediate pressure relief",
    actions: &[
        "Reposition the patient at least every 2 hours",
        "Apply a pressure-redistributing mattress",
        "Inspect bony prominences every shift",
        "Notify the wound care nurse",
    ],
};

const ENHANCED: Recommendation = Recommendation {
    urgency: Urgency::Enhanced,
    title: "Enhanced monitoring",
    actions: &[
        "Reposition the patient every 3 to 4 hours",
        "Keep skin clean and dry",
        "Reassess the Braden score daily",
    ],
};

const ROUTINE: Recommendation = Recommendation {
    urgency: Urgency::Routine,
    title: "Routine care",
    actions: &[
        "Encourage mobility",
        "Reassess the Braden score on status change",
    ],
};

const GENERAL: Recommendation = Recommendation {
    urgency: Urgency::General,
    title: "General skin care",
    actions: &["Follow the ward's standard skin care protocol"],
};

/// Labels mapped to each template, in both supported languages.
const URGENT_LABELS: [&str; 5] = ["위험", "고위험", "응급", "HIGH", "CRITICAL"];
const ENHANCED_LABELS: [&str; 3] = ["중등도", "주의", "MODERATE"];
const ROUTINE_LABELS: [&str; 2] = ["낮음", "LOW"];

pub fn recommendation_for(label: &RiskLabel) -> Recommendation {
    let text = label.as_str();
    if URGENT_LABELS.contains(&text) {
        URGENT
    } else if ENHANCED_LABELS.contains(&text) {
        ENHANCED
    } else if ROUTINE_LABELS.contains(&text) {
        ROUTINE
    } else {
        GENERAL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urgency(label: &str) -> Urgency {
        recommendation_for(&RiskLabel::new(label)).urgency
    }

    #[test]
    fn test_known_labels_select_templates() {
        assert_eq!(urgency("HIGH"), Urgency::Urgent);
        assert_eq!(urgency("응급"), Urgency::Urgent);
        assert_eq!(urgency("주의"), Urgency::Enhanced);
        assert_eq!(urgency("MODERATE"), Urgency::Enhanced);
        assert_eq!(urgency("LOW"), Urgency::Routine);
    }

    #[test]
    fn test_unknown_or_near_miss_labels_fall_back_to_general() {
        assert_eq!(urgency("high"), Urgency::General);
        assert_eq!(urgency("HIGH RISK"), Urgency::General);
        assert_eq!(urgency(""), Urgency::General);
    }
}

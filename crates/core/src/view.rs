//! Prediction display state.
//!
//! [`PredictionView`] is the state machine behind one patient-detail view:
//!
//! ```text
//!            select_patient            complete(Ok)
//!   Idle ─────────────────▶ Fetching ───────────────▶ Displaying
//!     ▲                        │  ▲                       │
//!     │ clear                  │  └────── begin_refresh ──┘
//!     │                        ▼ complete(Err)
//!     └──────────────────── Error
//! ```
//!
//! Every fetch is issued a [`FetchTicket`] carrying the patient it was for and a generation
//! number. A completion is applied only if its ticket names the currently selected patient and
//! the latest generation, so a slow response for a previous patient can never land in the new
//! patient's view. Switching patients also forgets the last prediction seen.
//!
//! [`PredictionWatch`] is the server-side counterpart: it remembers, per patient, the last
//! prediction handed out so each response can say whether it changed.

use crate::prediction::{has_meaningful_change, with_signal, Prediction};
use crate::PatientId;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FetchTicket {
    pub patient: PatientId,
    pub generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    Idle,
    Fetching {
        patient: PatientId,
    },
    /// `prediction` is `None` when the service had nothing usable for this patient.
    Displaying {
        patient: PatientId,
        prediction: Option<Prediction>,
    },
    Error {
        patient: PatientId,
        message: String,
    },
}

/// What a completed fetch did to the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewUpdate {
    /// The displayed prediction changed (or this was the first result for the patient).
    Changed,
    /// Same risk label as before; nothing to redraw.
    Unchanged,
    /// The fetch failed; the view is in [`ViewState::Error`].
    Failed,
    /// The ticket was superseded and the result was discarded.
    Stale,
}

#[derive(Debug, Clone)]
pub struct PredictionView {
    state: ViewState,
    generation: u64,
    last_seen: Option<Prediction>,
    has_result: bool,
}

impl Default for PredictionView {
    fn default() -> Self {
        Self::new()
    }
}

impl PredictionView {
    pub fn new() -> Self {
        Self {
            state: ViewState::Idle,
            generation: 0,
            last_seen: None,
            has_result: false,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn selected(&self) -> Option<PatientId> {
        match &self.state {
            ViewState::Idle => None,
            ViewState::Fetching { patient }
            | ViewState::Displaying { patient, .. }
            | ViewState::Error { patient, .. } => Some(*patient),
        }
    }

    /// The prediction currently on screen, if any.
    pub fn displayed(&self) -> Option<&Prediction> {
        self.last_seen.as_ref()
    }

    /// Switches to `patient`, forgetting everything about the previous one.
    pub fn select_patient(&mut self, patient: PatientId) -> FetchTicket {
        self.generation += 1;
        self.last_seen = None;
        self.has_result = false;
        self.state = ViewState::Fetching { patient };
        FetchTicket {
            patient,
            generation: self.generation,
        }
    }

    /// Starts another fetch for the selected patient, keeping the current display.
    ///
    /// Returns `None` when no patient is selected.
    pub fn begin_refresh(&mut self) -> Option<FetchTicket> {
        let patient = self.selected()?;
        self.generation += 1;
        if !self.has_result {
            self.state = ViewState::Fetching { patient };
        }
        Some(FetchTicket {
            patient,
            generation: self.generation,
        })
    }

    /// Applies the outcome of the fetch identified by `ticket`.
    ///
    /// `Ok(None)` means the service had no prediction. Predictions whose message signals "no
    /// data" are treated the same way.
    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        outcome: Result<Option<Prediction>, String>,
    ) -> ViewUpdate {
        if self.selected() != Some(ticket.patient) || ticket.generation != self.generation {
            tracing::warn!(
                patient_id = %ticket.patient,
                generation = ticket.generation,
                current_generation = self.generation,
                "discarding stale prediction result"
            );
            return ViewUpdate::Stale;
        }

        let current = match outcome {
            Ok(prediction) => with_signal(prediction),
            Err(message) => {
                self.state = ViewState::Error {
                    patient: ticket.patient,
                    message,
                };
                return ViewUpdate::Failed;
            }
        };

        let first = !self.has_result;
        let changed = has_meaningful_change(self.last_seen.as_ref(), current.as_ref());
        let recovering = matches!(self.state, ViewState::Error { .. });
        if first || changed {
            self.last_seen = current;
        }
        self.has_result = true;
        self.state = ViewState::Displaying {
            patient: ticket.patient,
            prediction: self.last_seen.clone(),
        };

        tracing::debug!(patient_id = %ticket.patient, first, changed, "prediction fetched");
        if first || changed || recovering {
            ViewUpdate::Changed
        } else {
            ViewUpdate::Unchanged
        }
    }

    /// Closes the view.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.last_seen = None;
        self.has_result = false;
        self.state = ViewState::Idle;
    }
}

/// Last prediction handed out per patient.
#[derive(Debug, Default)]
pub struct PredictionWatch {
    last_seen: Mutex<HashMap<PatientId, Option<Prediction>>>,
}

impl PredictionWatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `current` for `patient` and reports whether it is a meaningful change.
    ///
    /// The first observation for a patient always counts as a change. `current` is filtered
    /// through the no-signal check first; the filtered value is returned alongside the flag.
    pub fn observe(
        &self,
        patient: PatientId,
        current: Option<Prediction>,
    ) -> (bool, Option<Prediction>) {
        let current = with_signal(current);
        let mut last_seen = match self.last_seen.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let changed = match last_seen.get(&patient) {
            None => true,
            Some(previous) => has_meaningful_change(previous.as_ref(), current.as_ref()),
        };
        if changed {
            last_seen.insert(patient, current.clone());
        }

        let shown = last_seen.get(&patient).cloned().flatten();
        (changed, shown)
    }

    /// Drops whatever was remembered for `patient`.
    pub fn forget(&self, patient: &PatientId) {
        let mut last_seen = match self.last_seen.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        last_seen.remove(patient);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn high(message: &str) -> Option<Prediction> {
        Some(Prediction::new("HIGH", message))
    }

    #[test]
    fn test_first_result_is_displayed() {
        let mut view = PredictionView::new();
        let patient = PatientId::generate();
        let ticket = view.select_patient(patient);

        assert_eq!(view.state(), &ViewState::Fetching { patient });
        assert_eq!(view.complete(ticket, Ok(high("a"))), ViewUpdate::Changed);
        assert_eq!(view.displayed(), high("a").as_ref());
    }

    #[test]
    fn test_message_only_change_keeps_display() {
        let mut view = PredictionView::new();
        let patient = PatientId::generate();
        let ticket = view.select_patient(patient);
        view.complete(ticket, Ok(high("first wording")));

        let ticket = view.begin_refresh().expect("patient selected");
        assert_eq!(view.complete(ticket, Ok(high("second wording"))), ViewUpdate::Unchanged);
        assert_eq!(
            view.displayed().map(|p| p.prediction_message.as_str()),
            Some("first wording")
        );
    }

    #[test]
    fn test_label_change_replaces_display() {
        let mut view = PredictionView::new();
        let patient = PatientId::generate();
        let ticket = view.select_patient(patient);
        view.complete(ticket, Ok(high("a")));

        let ticket = view.begin_refresh().unwrap();
        let low = Some(Prediction::new("LOW", "a"));
        assert_eq!(view.complete(ticket, Ok(low.clone())), ViewUpdate::Changed);
        assert_eq!(view.displayed(), low.as_ref());
    }

    #[test]
    fn test_stale_result_after_patient_switch_is_ignored() {
        let mut view = PredictionView::new();
        let old = PatientId::generate();
        let new = PatientId::generate();

        let old_ticket = view.select_patient(old);
        let new_ticket = view.select_patient(new);

        assert_eq!(view.complete(old_ticket, Ok(high("old"))), ViewUpdate::Stale);
        assert_eq!(view.state(), &ViewState::Fetching { patient: new });
        assert!(view.displayed().is_none());

        assert_eq!(
            view.complete(new_ticket, Ok(Some(Prediction::new("LOW", "new")))),
            ViewUpdate::Changed
        );
    }

    #[test]
    fn test_switching_back_does_not_accept_old_ticket() {
        let mut view = PredictionView::new();
        let a = PatientId::generate();
        let b = PatientId::generate();

        let first_a = view.select_patient(a);
        view.select_patient(b);
        let second_a = view.select_patient(a);

        assert_eq!(view.complete(first_a, Ok(high("late"))), ViewUpdate::Stale);
        assert_eq!(view.complete(second_a, Ok(high("fresh"))), ViewUpdate::Changed);
        assert_eq!(
            view.displayed().map(|p| p.prediction_message.as_str()),
            Some("fresh")
        );
    }

    #[test]
    fn test_superseded_refresh_is_stale() {
        let mut view = PredictionView::new();
        let patient = PatientId::generate();
        let ticket = view.select_patient(patient);
        view.complete(ticket, Ok(high("a")));

        let older = view.begin_refresh().unwrap();
        let newer = view.begin_refresh().unwrap();
        assert_eq!(view.complete(older, Ok(None)), ViewUpdate::Stale);
        assert_eq!(view.complete(newer, Ok(None)), ViewUpdate::Changed);
        assert!(view.displayed().is_none());
    }

    #[test]
    fn test_no_signal_first_result_is_absent() {
        let mut view = PredictionView::new();
        let patient = PatientId::generate();
        let ticket = view.select_patient(patient);

        let no_data = Some(Prediction::new("LOW", "No thermal image data available."));
        assert_eq!(view.complete(ticket, Ok(no_data)), ViewUpdate::Changed);
        assert_eq!(
            view.state(),
            &ViewState::Displaying {
                patient,
                prediction: None
            }
        );

        let ticket = view.begin_refresh().unwrap();
        let also_no_data = Some(Prediction::new("HIGH", "데이터가 없어 평가 불가"));
        assert_eq!(view.complete(ticket, Ok(also_no_data)), ViewUpdate::Unchanged);
    }

    #[test]
    fn test_error_then_recovery() {
        let mut view = PredictionView::new();
        let patient = PatientId::generate();
        let ticket = view.select_patient(patient);
        view.complete(ticket, Ok(high("a")));

        let ticket = view.begin_refresh().unwrap();
        assert_eq!(view.complete(ticket, Err("timeout".into())), ViewUpdate::Failed);
        assert!(matches!(view.state(), ViewState::Error { message, .. } if message == "timeout"));

        let ticket = view.begin_refresh().unwrap();
        assert_eq!(view.complete(ticket, Ok(high("a"))), ViewUpdate::Changed);
        assert!(matches!(view.state(), ViewState::Displaying { .. }));
    }

    #[test]
    fn test_clear_discards_in_flight() {
        let mut view = PredictionView::new();
        let ticket = view.select_patient(PatientId::generate());
        view.clear();

        assert_eq!(view.complete(ticket, Ok(high("a"))), ViewUpdate::Stale);
        assert_eq!(view.state(), &ViewState::Idle);
        assert!(view.begin_refresh().is_none());
    }

    #[test]
    fn test_watch_reports_changes_per_patient() {
        let watch = PredictionWatch::new();
        let a = PatientId::generate();
        let b = PatientId::generate();

        assert_eq!(watch.observe(a, high("x")), (true, high("x")));
        assert_eq!(watch.observe(a, high("y")), (false, high("x")));
        assert_eq!(watch.observe(b, None), (true, None));
        assert_eq!(watch.observe(b, None), (false, None));

        let low = Some(Prediction::new("LOW", "z"));
        assert_eq!(watch.observe(a, low.clone()), (true, low));

        watch.forget(&a);
        assert!(watch.observe(a, high("x")).0);
    }
}

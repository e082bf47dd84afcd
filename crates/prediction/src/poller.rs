//! Periodic prediction refresh for a patient view.

use crate::{CancellationToken, PredictionError, PredictionSource};
use puw_core::{FetchTicket, PatientId, PredictionView, ViewUpdate};
use std::sync::Arc;
use std::time::Duration;

/// Fetches predictions at a fixed interval and feeds them through a [`PredictionView`].
pub struct PredictionPoller {
    source: Arc<dyn PredictionSource>,
    interval: Duration,
}

impl PredictionPoller {
    pub fn new(source: Arc<dyn PredictionSource>, interval: Duration) -> Self {
        Self { source, interval }
    }

    /// Runs one fetch for `ticket` and applies it to `view`.
    ///
    /// Returns `None` if `cancel` fired before the fetch finished; the view is left as it was.
    pub async fn poll_once(
        &self,
        view: &mut PredictionView,
        ticket: FetchTicket,
        cancel: &CancellationToken,
    ) -> Option<ViewUpdate> {
        let outcome = match self.source.get_prediction(ticket.patient, cancel).await {
            Err(PredictionError::Cancelled) => return None,
            other => other.map_err(|e| e.to_string()),
        };
        Some(view.complete(ticket, outcome))
    }

    /// Selects `patient` in `view` and keeps refreshing until `cancel` fires.
    ///
    /// `on_update` is called after every completed fetch with the view and what changed.
    pub async fn run<F>(
        &self,
        view: &mut PredictionView,
        patient: PatientId,
        cancel: &CancellationToken,
        mut on_update: F,
    ) where
        F: FnMut(&PredictionView, ViewUpdate),
    {
        let mut ticket = view.select_patient(patient);
        tracing::info!(patient_id = %patient, interval = ?self.interval, "prediction polling started");

        loop {
            match self.poll_once(view, ticket, cancel).await {
                Some(update) => on_update(view, update),
                None => break,
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }

            ticket = match view.begin_refresh() {
                Some(ticket) => ticket,
                None => break,
            };
        }

        tracing::info!(patient_id = %patient, "prediction polling stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PredictionResult;
    use async_trait::async_trait;
    use puw_core::{Prediction, ViewState};
    use std::sync::Mutex;

    /// Replays a fixed script of outcomes, then repeats the last one.
    struct Scripted {
        script: Mutex<Vec<PredictionResult<Option<Prediction>>>>,
    }

    impl Scripted {
        fn new(mut script: Vec<PredictionResult<Option<Prediction>>>) -> Self {
            script.reverse();
            Self {
                script: Mutex::new(script),
            }
        }
    }

    #[async_trait]
    impl PredictionSource for Scripted {
        async fn get_prediction(
            &self,
            _patient: PatientId,
            _cancel: &CancellationToken,
        ) -> PredictionResult<Option<Prediction>> {
            let mut script = self.script.lock().unwrap();
            if script.len() > 1 {
                script.pop().unwrap()
            } else {
                match script.last() {
                    Some(Ok(p)) => Ok(p.clone()),
                    _ => Ok(None),
                }
            }
        }
    }

    #[tokio::test]
    async fn test_run_reports_only_meaningful_changes() {
        let source = Arc::new(Scripted::new(vec![
            Ok(Some(Prediction::new("HIGH", "a"))),
            Ok(Some(Prediction::new("HIGH", "b"))),
            Err(PredictionError::UpstreamStatus(503)),
            Ok(Some(Prediction::new("LOW", "c"))),
        ]));
        let poller = PredictionPoller::new(source, Duration::from_millis(5));
        let mut view = PredictionView::new();
        let cancel = CancellationToken::new();
        let patient = PatientId::generate();

        let mut updates = Vec::new();
        poller
            .run(&mut view, patient, &cancel, |_, update| {
                updates.push(update);
                if updates.len() == 5 {
                    cancel.cancel();
                }
            })
            .await;

        assert_eq!(
            updates,
            vec![
                ViewUpdate::Changed,
                ViewUpdate::Unchanged,
                ViewUpdate::Failed,
                ViewUpdate::Changed,
                ViewUpdate::Unchanged,
            ]
        );
        assert_eq!(
            view.displayed().map(|p| p.risk_level.as_str()),
            Some("LOW")
        );
        assert!(matches!(view.state(), ViewState::Displaying { .. }));
    }

    #[tokio::test]
    async fn test_poll_once_cancelled_leaves_view_fetching() {
        struct Cancelled;

        #[async_trait]
        impl PredictionSource for Cancelled {
            async fn get_prediction(
                &self,
                _patient: PatientId,
                _cancel: &CancellationToken,
            ) -> PredictionResult<Option<Prediction>> {
                Err(PredictionError::Cancelled)
            }
        }

        let poller = PredictionPoller::new(Arc::new(Cancelled), Duration::from_secs(1));
        let mut view = PredictionView::new();
        let patient = PatientId::generate();
        let ticket = view.select_patient(patient);

        let update = poller
            .poll_once(&mut view, ticket, &CancellationToken::new())
            .await;
        assert!(update.is_none());
        assert_eq!(view.state(), &ViewState::Fetching { patient });
    }
}

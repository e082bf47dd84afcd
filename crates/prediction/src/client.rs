//! Prediction service client.

use crate::{CancellationToken, PredictionError, PredictionResult};
use async_trait::async_trait;
use puw_core::{CoreConfig, PatientId, Prediction};
use reqwest::StatusCode;
use std::time::Duration;

/// Something that can produce a patient's current prediction.
///
/// `Ok(None)` means the source has no prediction for this patient.
#[async_trait]
pub trait PredictionSource: Send + Sync {
    async fn get_prediction(
        &self,
        patient: PatientId,
        cancel: &CancellationToken,
    ) -> PredictionResult<Option<Prediction>>;
}

/// HTTP client for the prediction service.
///
/// Requests go to `GET {base_url}/predict/{patient_id}`. A `404` is read as "no prediction"; any
/// other non-success status is an error.
#[derive(Clone, Debug)]
pub struct HttpPredictionClient {
    base_url: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpPredictionClient {
    /// # Errors
    ///
    /// Returns [`PredictionError::Http`] if the underlying HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> PredictionResult<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout,
        })
    }

    pub fn from_config(cfg: &CoreConfig) -> PredictionResult<Self> {
        Self::new(cfg.prediction_url(), cfg.prediction_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn prediction_url(&self, patient: PatientId) -> String {
        format!("{}/predict/{}", self.base_url, patient)
    }

    async fn fetch(&self, url: &str) -> PredictionResult<Option<Prediction>> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(PredictionError::UpstreamStatus(status.as_u16()));
        }

        let body = response.bytes().await?;
        serde_json::from_slice::<Prediction>(&body)
            .map(Some)
            .map_err(|e| PredictionError::Decode(e.to_string()))
    }
}

#[async_trait]
impl PredictionSource for HttpPredictionClient {
    async fn get_prediction(
        &self,
        patient: PatientId,
        cancel: &CancellationToken,
    ) -> PredictionResult<Option<Prediction>> {
        let url = self.prediction_url(patient);
        tracing::debug!(patient_id = %patient, %url, "fetching prediction");

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(PredictionError::Cancelled),
            result = tokio::time::timeout(self.timeout, self.fetch(&url)) => {
                result.map_err(|_| PredictionError::Timeout(self.timeout))?
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use axum::{extract::Path, http::StatusCode as AxumStatus, routing::get, Json, Router};
    use serde_json::json;
    use std::net::SocketAddr;

    /// Serves a fake prediction service on an ephemeral local port.
    pub(crate) async fn spawn_upstream(router: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        addr
    }

    pub(crate) fn fake_predictor() -> Router {
        Router::new().route(
            "/predict/:id",
            get(|Path(id): Path<String>| async move {
                match id.as_str() {
                    "00000000000000000000000000000001" => Ok(Json(json!({
                        "riskLevel": "HIGH",
                        "predictionMessage": "Sacral temperature elevated."
                    }))),
                    "00000000000000000000000000000002" => Err(AxumStatus::NOT_FOUND),
                    "00000000000000000000000000000003" => Err(AxumStatus::INTERNAL_SERVER_ERROR),
                    "00000000000000000000000000000004" => Ok(Json(json!({ "unexpected": true }))),
                    _ => {
                        tokio::time::sleep(Duration::from_secs(5)).await;
                        Err(AxumStatus::GATEWAY_TIMEOUT)
                    }
                }
            }),
        )
    }

    fn id(n: u8) -> PatientId {
        PatientId::parse(&format!("{:032x}", n)).unwrap()
    }

    async fn client(timeout: Duration) -> HttpPredictionClient {
        let addr = spawn_upstream(fake_predictor()).await;
        HttpPredictionClient::new(&format!("http://{}/", addr), timeout).unwrap()
    }

    #[tokio::test]
    async fn test_fetches_and_decodes_prediction() {
        let client = client(Duration::from_secs(2)).await;
        let prediction = client
            .get_prediction(id(1), &CancellationToken::new())
            .await
            .expect("fetch should succeed")
            .expect("prediction should be present");

        assert_eq!(prediction.risk_level.as_str(), "HIGH");
        assert_eq!(prediction.prediction_message, "Sacral temperature elevated.");
    }

    #[tokio::test]
    async fn test_not_found_is_absent() {
        let client = client(Duration::from_secs(2)).await;
        let result = client.get_prediction(id(2), &CancellationToken::new()).await;
        assert!(matches!(result, Ok(None)));
    }

    #[tokio::test]
    async fn test_server_error_is_upstream_status() {
        let client = client(Duration::from_secs(2)).await;
        let result = client.get_prediction(id(3), &CancellationToken::new()).await;
        assert!(matches!(result, Err(PredictionError::UpstreamStatus(500))));
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let client = client(Duration::from_secs(2)).await;
        let result = client.get_prediction(id(4), &CancellationToken::new()).await;
        assert!(matches!(result, Err(PredictionError::Decode(_))));
    }

    #[tokio::test]
    async fn test_slow_upstream_times_out() {
        let client = client(Duration::from_millis(100)).await;
        let result = client.get_prediction(id(9), &CancellationToken::new()).await;
        assert!(matches!(result, Err(PredictionError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_cancel_aborts_in_flight_request() {
        let client = client(Duration::from_secs(10)).await;
        let token = CancellationToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            canceller.cancel();
        });

        let result = client.get_prediction(id(9), &token).await;
        assert!(matches!(result, Err(PredictionError::Cancelled)));
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_http_error() {
        let client =
            HttpPredictionClient::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let result = client.get_prediction(id(1), &CancellationToken::new()).await;
        assert!(matches!(result, Err(PredictionError::Http(_))));
    }
}

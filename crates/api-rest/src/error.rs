//! HTTP error mapping.

use api_shared::ErrorRes;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use puw_core::{PatientError, RiskError};
use puw_prediction::PredictionError;

/// Errors a handler can return, each with a fixed status code.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    NotFound(String),
    #[error("prediction service unavailable: {0}")]
    Upstream(String),
    #[error("prediction service timed out: {0}")]
    Timeout(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RiskError> for ApiError {
    fn from(err: RiskError) -> Self {
        match err {
            RiskError::InvalidInput(msg) => ApiError::InvalidInput(msg),
        }
    }
}

impl From<PatientError> for ApiError {
    fn from(err: PatientError) -> Self {
        match err {
            PatientError::InvalidInput(msg) => ApiError::InvalidInput(msg),
            err @ PatientError::NotFound(_) => ApiError::NotFound(err.to_string()),
            PatientError::Risk(e) => e.into(),
            err @ PatientError::StoreLock => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<PredictionError> for ApiError {
    fn from(err: PredictionError) -> Self {
        let message = err.to_string();
        match err {
            PredictionError::Timeout(_) => ApiError::Timeout(message),
            PredictionError::InvalidUrl(msg) => ApiError::NotFound(msg),
            PredictionError::Cancelled => ApiError::Internal(message),
            PredictionError::Http(_)
            | PredictionError::UpstreamStatus(_)
            | PredictionError::Decode(_) => ApiError::Upstream(message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Internal(detail) => {
                tracing::error!(detail, "internal error");
                "Internal error".to_string()
            }
            ApiError::Upstream(detail) | ApiError::Timeout(detail) => {
                tracing::error!(detail, "prediction service failure");
                self.to_string()
            }
            other => other.to_string(),
        };

        (status, Json(ErrorRes { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::from(RiskError::InvalidInput("moisture is missing".into())).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::from(PatientError::NotFound("x".into())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(PredictionError::UpstreamStatus(500)).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::from(PredictionError::Timeout(Duration::from_secs(5))).status(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            ApiError::from(PatientError::StoreLock).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}

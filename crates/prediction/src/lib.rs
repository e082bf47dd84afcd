//! # PUW Prediction
//!
//! Everything that talks to the external prediction service:
//! - [`client`]: fetch a patient's prediction, bounded by a timeout and a caller-held
//!   [`CancellationToken`]
//! - [`poller`]: drive a [`puw_core::PredictionView`] by fetching at a fixed interval
//! - [`proxy`]: forward `/api/ai/*` requests to the service origin so browsers avoid CORS
//!
//! The service is opaque: it answers `{"riskLevel": ..., "predictionMessage": ...}` and nothing
//! in this crate interprets the answer beyond decoding it.

pub mod cancel;
pub mod client;
pub mod poller;
pub mod proxy;

pub use cancel::CancellationToken;
pub use client::{HttpPredictionClient, PredictionSource};
pub use poller::PredictionPoller;
pub use proxy::{ProxiedResponse, ReverseProxy};

use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum PredictionError {
    #[error("request to prediction service failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("prediction service did not answer within {0:?}")]
    Timeout(Duration),
    #[error("request cancelled")]
    Cancelled,
    #[error("prediction service returned status {0}")]
    UpstreamStatus(u16),
    #[error("failed to decode prediction: {0}")]
    Decode(String),
    #[error("invalid upstream URL: {0}")]
    InvalidUrl(String),
}

pub type PredictionResult<T> = std::result::Result<T, PredictionError>;

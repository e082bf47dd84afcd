//! # API REST
//!
//! REST API for Pressure Ulcer Watch.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - The CORS-avoiding reverse proxy to the prediction service
//!
//! Uses `api-shared` for wire types. [`router`] returns a composable `Router` that the
//! `puw-run` binary serves.

#![warn(rust_2018_idioms)]

pub mod error;
pub mod handlers;

use axum::{
    routing::{any, get, post},
    Router,
};
use puw_core::{CoreConfig, PatientRepository, PredictionWatch};
use puw_prediction::{PredictionSource, ReverseProxy};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use error::ApiError;

/// Shared state for every handler.
#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<CoreConfig>,
    pub repo: Arc<dyn PatientRepository>,
    pub predictions: Arc<dyn PredictionSource>,
    pub watch: Arc<PredictionWatch>,
    pub proxy: Arc<ReverseProxy>,
}

impl AppState {
    pub fn new(
        cfg: Arc<CoreConfig>,
        repo: Arc<dyn PatientRepository>,
        predictions: Arc<dyn PredictionSource>,
        proxy: ReverseProxy,
    ) -> Self {
        Self {
            cfg,
            repo,
            predictions,
            watch: Arc::new(PredictionWatch::new()),
            proxy: Arc::new(proxy),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::list_patients,
        handlers::create_patient,
        handlers::get_patient,
        handlers::update_patient,
        handlers::delete_patient,
        handlers::get_patient_risk,
        handlers::get_patient_prediction,
        handlers::score_risk,
        handlers::dashboard_stats,
    ),
    components(schemas(
        api_shared::HealthRes,
        api_shared::ErrorRes,
        api_shared::VitalsDto,
        api_shared::BradenReq,
        api_shared::BradenRes,
        api_shared::RiskRes,
        api_shared::PatientRes,
        api_shared::ListPatientsRes,
        api_shared::CreatePatientReq,
        api_shared::UpdatePatientReq,
        api_shared::PredictionDto,
        api_shared::RecommendationRes,
        api_shared::PredictionRes,
        api_shared::DashboardStatsRes,
    ))
)]
pub struct ApiDoc;

/// Builds the full application router: API routes, the proxy, Swagger UI and permissive CORS.
pub fn router(state: AppState) -> Router {
    let proxy_route = format!("{}/*rest", state.cfg.proxy_prefix());

    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/patients",
            get(handlers::list_patients).post(handlers::create_patient),
        )
        .route(
            "/patients/:id",
            get(handlers::get_patient)
                .put(handlers::update_patient)
                .delete(handlers::delete_patient),
        )
        .route("/patients/:id/risk", get(handlers::get_patient_risk))
        .route(
            "/patients/:id/prediction",
            get(handlers::get_patient_prediction),
        )
        .route("/risk/score", post(handlers::score_risk))
        .route("/dashboard/stats", get(handlers::dashboard_stats))
        .route(&proxy_route, any(handlers::proxy_request))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

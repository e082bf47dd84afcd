use std::sync::Arc;

use api_rest::AppState;
use puw_core::config::{
    prediction_timeout_from_env_value, prediction_url_from_env_value, proxy_prefix_from_env_value,
    tier_policy_from_env_value,
};
use puw_core::{CoreConfig, InMemoryPatientRepository};
use puw_prediction::{HttpPredictionClient, ReverseProxy};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Resolves configuration from the environment once, at startup.
fn config_from_env() -> anyhow::Result<CoreConfig> {
    let prediction_url = prediction_url_from_env_value(std::env::var("PUW_PREDICTION_URL").ok());
    let prediction_timeout =
        prediction_timeout_from_env_value(std::env::var("PUW_PREDICTION_TIMEOUT_SECS").ok())?;
    let proxy_prefix = proxy_prefix_from_env_value(std::env::var("PUW_PROXY_PREFIX").ok())?;
    let tier_policy = tier_policy_from_env_value(std::env::var("PUW_TIER_POLICY").ok())?;

    Ok(CoreConfig::new(
        prediction_url,
        prediction_timeout,
        proxy_prefix,
        tier_policy,
    )?)
}

fn build_state(cfg: Arc<CoreConfig>) -> anyhow::Result<AppState> {
    let predictions = HttpPredictionClient::from_config(&cfg)?;
    let proxy = ReverseProxy::from_config(&cfg)?;
    Ok(AppState::new(
        cfg,
        Arc::new(InMemoryPatientRepository::new()),
        Arc::new(predictions),
        proxy,
    ))
}

/// Main entry point for the Pressure Ulcer Watch server
///
/// Serves the REST API, Swagger UI and the prediction proxy until Ctrl-C.
///
/// # Environment Variables
/// - `PUW_REST_ADDR`: server address (default: "0.0.0.0:3000")
/// - `PUW_PREDICTION_URL`: prediction service origin (default: "http://localhost:8000")
/// - `PUW_PREDICTION_TIMEOUT_SECS`: prediction request timeout, 1 to 120 (default: 5)
/// - `PUW_PROXY_PREFIX`: path forwarded to the prediction service (default: "/api/ai")
/// - `PUW_TIER_POLICY`: `braden` or `legacy` (default: "braden")
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - any configuration value is invalid,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("puw=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("PUW_REST_ADDR")
        .unwrap_or_else(|_| puw_core::constants::DEFAULT_REST_ADDR.into());
    let cfg = Arc::new(config_from_env()?);

    tracing::info!("++ Starting Pressure Ulcer Watch REST on {}", rest_addr);
    tracing::info!(
        prediction_url = cfg.prediction_url(),
        timeout = ?cfg.prediction_timeout(),
        proxy_prefix = cfg.proxy_prefix(),
        tier_policy = ?cfg.tier_policy(),
        "configuration resolved"
    );

    let app = api_rest::router(build_state(cfg)?);
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await?;

    Ok(())
}

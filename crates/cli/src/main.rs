use clap::{Parser, Subcommand};
use puw_core::config::{prediction_timeout_from_env_value, prediction_url_from_env_value};
use puw_core::{
    has_no_signal, recommendation_for, BradenScore, PatientId, Prediction, PredictionView,
    RawBradenAssessment, RiskSummary, TierPolicy, ViewState, ViewUpdate,
};
use puw_prediction::{CancellationToken, HttpPredictionClient, PredictionPoller, PredictionSource};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "puw")]
#[command(about = "Pressure Ulcer Watch CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a Braden assessment and classify it
    Score {
        /// Sensory perception, 1 to 4
        sensory_perception: String,
        /// Moisture, 1 to 4
        moisture: String,
        /// Activity, 1 to 4
        activity: String,
        /// Tier policy: braden or legacy
        #[arg(long, default_value = "braden")]
        policy: TierPolicy,
    },
    /// Classify a Braden score into a risk tier
    Classify {
        /// Braden score, 3 to 12
        score: i64,
        /// Tier policy: braden or legacy
        #[arg(long, default_value = "braden")]
        policy: TierPolicy,
    },
    /// Check whether a prediction message reports missing data
    NoSignal {
        /// Prediction message text
        message: String,
    },
    /// Fetch one prediction for a patient
    Predict {
        /// Patient id (32 hex characters)
        patient_id: PatientId,
        /// Prediction service origin (defaults to PUW_PREDICTION_URL)
        #[arg(long)]
        url: Option<String>,
        /// Request timeout in seconds (defaults to PUW_PREDICTION_TIMEOUT_SECS)
        #[arg(long)]
        timeout: Option<String>,
    },
    /// Poll a patient's prediction and print it whenever it meaningfully changes
    Watch {
        /// Patient id (32 hex characters)
        patient_id: PatientId,
        /// Prediction service origin (defaults to PUW_PREDICTION_URL)
        #[arg(long)]
        url: Option<String>,
        /// Request timeout in seconds (defaults to PUW_PREDICTION_TIMEOUT_SECS)
        #[arg(long)]
        timeout: Option<String>,
        /// Seconds between fetches
        #[arg(long, default_value_t = puw_core::constants::DEFAULT_POLL_INTERVAL_SECS)]
        interval: u64,
    },
}

/// Reads a command-line sub-score as JSON so `2.5` and `two` are reported as non-integers.
fn raw_sub_score(arg: String) -> Value {
    serde_json::from_str(&arg).unwrap_or(Value::String(arg))
}

fn prediction_client(
    url: Option<String>,
    timeout: Option<String>,
) -> Result<HttpPredictionClient, Box<dyn std::error::Error>> {
    let url =
        prediction_url_from_env_value(url.or_else(|| std::env::var("PUW_PREDICTION_URL").ok()));
    let timeout = prediction_timeout_from_env_value(
        timeout.or_else(|| std::env::var("PUW_PREDICTION_TIMEOUT_SECS").ok()),
    )?;
    Ok(HttpPredictionClient::new(&url, timeout)?)
}

fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            canceller.cancel();
        }
    });
    token
}

fn print_prediction(prediction: Option<&Prediction>) {
    match prediction {
        Some(p) => {
            let rec = recommendation_for(&p.risk_level);
            println!(
                "Risk: {} ({}), Message: {}",
                p.risk_level,
                p.risk_level.language().tag(),
                p.prediction_message
            );
            println!("Recommendation: {}", rec.title);
            for action in rec.actions {
                println!("  - {}", action);
            }
        }
        None => println!("No prediction available."),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("puw=warn".parse()?))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Score {
            sensory_perception,
            moisture,
            activity,
            policy,
        }) => {
            let raw = RawBradenAssessment {
                sensory_perception: Some(raw_sub_score(sensory_perception)),
                moisture: Some(raw_sub_score(moisture)),
                activity: Some(raw_sub_score(activity)),
            };
            match raw.validate() {
                Ok(assessment) => {
                    let summary = RiskSummary::of(&assessment, policy);
                    println!(
                        "Score: {}, Tier: {}, Normalised risk: {}, Legacy tier: {}",
                        summary.score, summary.tier, summary.normalized_risk, summary.legacy_tier
                    );
                }
                Err(e) => eprintln!("Error scoring assessment: {}", e),
            }
        }
        Some(Commands::Classify { score, policy }) => match BradenScore::new(score) {
            Ok(score) => println!("Tier: {}", policy.classify(score)),
            Err(e) => eprintln!("Error classifying score: {}", e),
        },
        Some(Commands::NoSignal { message }) => {
            if has_no_signal(&Prediction::new("", message)) {
                println!("no signal");
            } else {
                println!("signal");
            }
        }
        Some(Commands::Predict {
            patient_id,
            url,
            timeout,
        }) => {
            let client = prediction_client(url, timeout)?;
            let cancel = cancel_on_ctrl_c();
            match client.get_prediction(patient_id, &cancel).await {
                Ok(prediction) => print_prediction(
                    puw_core::prediction::with_signal(prediction).as_ref(),
                ),
                Err(e) => eprintln!("Error fetching prediction: {}", e),
            }
        }
        Some(Commands::Watch {
            patient_id,
            url,
            timeout,
            interval,
        }) => {
            let client = prediction_client(url, timeout)?;
            let poller = PredictionPoller::new(
                Arc::new(client) as Arc<dyn PredictionSource>,
                Duration::from_secs(interval.max(1)),
            );
            let cancel = cancel_on_ctrl_c();
            let mut view = PredictionView::new();

            println!("Watching {} every {}s (Ctrl-C to stop)", patient_id, interval.max(1));
            poller
                .run(&mut view, patient_id, &cancel, |view, update| match update {
                    ViewUpdate::Changed => print_prediction(view.displayed()),
                    ViewUpdate::Failed => {
                        if let ViewState::Error { message, .. } = view.state() {
                            eprintln!("Error fetching prediction: {}", message);
                        }
                    }
                    ViewUpdate::Unchanged | ViewUpdate::Stale => {}
                })
                .await;
        }
        None => {
            println!("Use 'puw --help' for commands");
        }
    }

    Ok(())
}

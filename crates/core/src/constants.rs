//! Constants used throughout the PUW core crate.

/// Lowest value any Braden sub-score may take.
pub const SUB_SCORE_MIN: u8 = 1;

/// Highest value any Braden sub-score may take.
pub const SUB_SCORE_MAX: u8 = 4;

/// Lowest possible Braden score (three sub-scores at their minimum).
pub const BRADEN_SCORE_MIN: u8 = 3 * SUB_SCORE_MIN;

/// Highest possible Braden score (three sub-scores at their maximum).
pub const BRADEN_SCORE_MAX: u8 = 3 * SUB_SCORE_MAX;

/// Default address the REST server binds to.
pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:3000";

/// Default origin of the external prediction service.
pub const DEFAULT_PREDICTION_URL: &str = "http://localhost:8000";

/// Default request timeout for calls to the prediction service, in seconds.
pub const DEFAULT_PREDICTION_TIMEOUT_SECS: u64 = 5;

/// Upper bound accepted for the prediction timeout, in seconds.
pub const MAX_PREDICTION_TIMEOUT_SECS: u64 = 120;

/// Default path prefix forwarded to the prediction service by the reverse proxy.
pub const DEFAULT_PROXY_PREFIX: &str = "/api/ai";

/// Default interval between prediction polls, in seconds.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;

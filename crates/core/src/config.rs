//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and passed into services, so request
//! handlers never read process-wide environment variables. The `*_from_env_value` helpers take
//! the raw optional value rather than reading the environment themselves, which keeps them
//! testable without mutating global state.

use crate::constants::{
    DEFAULT_PREDICTION_TIMEOUT_SECS, DEFAULT_PREDICTION_URL, DEFAULT_PROXY_PREFIX,
    MAX_PREDICTION_TIMEOUT_SECS,
};
use crate::error::{ConfigError, ConfigResult};
use crate::risk::TierPolicy;
use std::time::Duration;

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    prediction_url: String,
    prediction_timeout: Duration,
    proxy_prefix: String,
    tier_policy: TierPolicy,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the prediction URL is not an absolute http(s) URL or
    /// the proxy prefix is not an absolute path.
    pub fn new(
        prediction_url: String,
        prediction_timeout: Duration,
        proxy_prefix: String,
        tier_policy: TierPolicy,
    ) -> ConfigResult<Self> {
        let prediction_url = prediction_url.trim().trim_end_matches('/').to_string();
        if !(prediction_url.starts_with("http://") || prediction_url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "prediction URL must start with http:// or https://, got '{}'",
                prediction_url
            )));
        }

        Ok(Self {
            prediction_url,
            prediction_timeout,
            proxy_prefix: proxy_prefix_from_env_value(Some(proxy_prefix))?,
            tier_policy,
        })
    }

    /// Origin of the prediction service, without a trailing slash.
    pub fn prediction_url(&self) -> &str {
        &self.prediction_url
    }

    pub fn prediction_timeout(&self) -> Duration {
        self.prediction_timeout
    }

    /// Path prefix forwarded by the reverse proxy, e.g. `/api/ai`.
    pub fn proxy_prefix(&self) -> &str {
        &self.proxy_prefix
    }

    pub fn tier_policy(&self) -> TierPolicy {
        self.tier_policy
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            prediction_url: DEFAULT_PREDICTION_URL.into(),
            prediction_timeout: Duration::from_secs(DEFAULT_PREDICTION_TIMEOUT_SECS),
            proxy_prefix: DEFAULT_PROXY_PREFIX.into(),
            tier_policy: TierPolicy::default(),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parses the prediction timeout in whole seconds.
///
/// Blank or absent values give the default of 5 seconds.
pub fn prediction_timeout_from_env_value(value: Option<String>) -> ConfigResult<Duration> {
    let Some(value) = non_blank(value) else {
        return Ok(Duration::from_secs(DEFAULT_PREDICTION_TIMEOUT_SECS));
    };

    let secs: u64 = value.parse().map_err(|_| {
        ConfigError::Invalid(format!("prediction timeout must be an integer, got '{}'", value))
    })?;
    if !(1..=MAX_PREDICTION_TIMEOUT_SECS).contains(&secs) {
        return Err(ConfigError::Invalid(format!(
            "prediction timeout must be between 1 and {} seconds, got {}",
            MAX_PREDICTION_TIMEOUT_SECS, secs
        )));
    }
    Ok(Duration::from_secs(secs))
}

/// Parses the tier policy (`braden` or `legacy`), defaulting to `braden`.
pub fn tier_policy_from_env_value(value: Option<String>) -> ConfigResult<TierPolicy> {
    non_blank(value)
        .map(|v| v.parse::<TierPolicy>().map_err(ConfigError::Invalid))
        .transpose()
        .map(Option::unwrap_or_default)
}

/// Normalises the proxy prefix to a leading slash and no trailing slash.
pub fn proxy_prefix_from_env_value(value: Option<String>) -> ConfigResult<String> {
    let Some(value) = non_blank(value) else {
        return Ok(DEFAULT_PROXY_PREFIX.into());
    };

    let trimmed = value.trim_end_matches('/');
    if !trimmed.starts_with('/') || trimmed.len() < 2 {
        return Err(ConfigError::Invalid(format!(
            "proxy prefix must be an absolute path such as /api/ai, got '{}'",
            value
        )));
    }
    if trimmed.contains(&['*', ':', '?', '#'][..]) {
        return Err(ConfigError::Invalid(format!(
            "proxy prefix must not contain route or query characters, got '{}'",
            value
        )));
    }
    Ok(trimmed.to_string())
}

/// Resolves the prediction service origin, defaulting to a local service.
pub fn prediction_url_from_env_value(value: Option<String>) -> String {
    non_blank(value).unwrap_or_else(|| DEFAULT_PREDICTION_URL.into())
}

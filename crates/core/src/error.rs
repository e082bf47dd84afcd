/// Errors raised by the risk engine.
///
/// These are input errors only: the engine performs no I/O.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RiskError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type RiskResult<T> = std::result::Result<T, RiskError>;

#[derive(Debug, thiserror::Error)]
pub enum PatientError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("patient not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Risk(#[from] RiskError),
    #[error("patient store lock poisoned")]
    StoreLock,
}

impl From<puw_types::TextError> for PatientError {
    fn from(err: puw_types::TextError) -> Self {
        PatientError::InvalidInput(err.to_string())
    }
}

impl From<puw_uuid::UuidError> for PatientError {
    fn from(err: puw_uuid::UuidError) -> Self {
        match err {
            puw_uuid::UuidError::InvalidInput(msg) => PatientError::InvalidInput(msg),
        }
    }
}

pub type PatientResult<T> = std::result::Result<T, PatientError>;

/// Errors raised while resolving startup configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

use crate::models::HealthRes;

/// Health service shared by the server and the CLI.
#[derive(Clone, Default)]
pub struct HealthService;

impl HealthService {
    pub fn new() -> Self {
        Self
    }

    /// Reports that the service is up.
    ///
    /// # Returns
    /// A `HealthRes` with `ok = true`.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "Pressure Ulcer Watch is alive".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_health_reports_ok() {
        let res = HealthService::check_health();
        assert!(res.ok);
        assert!(!res.message.is_empty());
    }
}

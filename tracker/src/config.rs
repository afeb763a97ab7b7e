use std::env;

/// Collection endpoint used when nothing else is configured.
pub const DEFAULT_ENDPOINT: &str = "https://app.ahsdlab.com/api/oracle";

/// Environment variable naming the collection endpoint, read at runtime and at build time.
pub const ENDPOINT_ENV: &str = "ORACLE_API";

/// Where tracked events are delivered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollectorConfig {
    endpoint: String,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

impl CollectorConfig {
    /// Resolves the endpoint: runtime `ORACLE_API`, then the value baked in at build
    /// time, then [`DEFAULT_ENDPOINT`]. Blank values are ignored.
    pub fn from_env() -> Self {
        let endpoint = env::var(ENDPOINT_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .or_else(|| {
                option_env!("ORACLE_API")
                    .filter(|value| !value.trim().is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        Self { endpoint }
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    /// Restores `ORACLE_API` when dropped.
    struct EnvGuard(Option<String>);

    impl EnvGuard {
        fn new() -> Self {
            EnvGuard(env::var(ENDPOINT_ENV).ok())
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.0 {
                Some(value) => env::set_var(ENDPOINT_ENV, value),
                None => env::remove_var(ENDPOINT_ENV),
            }
        }
    }

    #[test]
    #[serial]
    fn test_runtime_variable_takes_precedence() {
        let _guard = EnvGuard::new();
        env::set_var(ENDPOINT_ENV, "http://collector.local/events");

        assert_eq!(
            CollectorConfig::from_env().endpoint(),
            "http://collector.local/events"
        );
    }

    #[test]
    #[serial]
    fn test_blank_variable_falls_back() {
        let _guard = EnvGuard::new();
        env::set_var(ENDPOINT_ENV, "   ");

        let expected = option_env!("ORACLE_API")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or(DEFAULT_ENDPOINT);
        assert_eq!(CollectorConfig::from_env().endpoint(), expected);
    }

    #[test]
    fn test_with_endpoint() {
        let config = CollectorConfig::with_endpoint("http://localhost:9999/collect");
        assert_eq!(config.endpoint(), "http://localhost:9999/collect");
    }
}

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::SecretString;

use crate::{CallContext, Span, SpanOptions, TracevineError};

pub const DEFAULT_BATCH_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_BATCH_SIZE: usize = 512;

/// Abstract write path into an observability backend.
///
/// Recording is synchronous so it can run inside a stream poll; exporters
/// queue behind it. `flush` and `shutdown` are where the waiting happens.
#[async_trait]
pub trait ObservationProvider: Send + Sync {
    /// Open a span. A failure here must leave the caller free to proceed
    /// unobserved; it never fails the operation being observed.
    fn start_span(
        &self,
        ctx: &CallContext,
        name: &str,
        options: SpanOptions,
    ) -> Result<Arc<dyn Span>, TracevineError>;

    /// Wait until queued records reach the backend or `timeout` elapses.
    async fn flush(&self, timeout: Duration) -> Result<(), TracevineError>;

    /// Release sink resources. Later `start_span` calls fail with
    /// [`TracevineError::Shutdown`].
    async fn shutdown(&self) -> Result<(), TracevineError>;
}

/// Enumerated, forward-compatible configuration shared by remote sinks.
///
/// Sinks ignore the fields they have no use for.
#[derive(Clone, Debug)]
pub struct ProviderConfig {
    pub enabled: bool,
    pub service_name: String,
    pub endpoint: String,
    pub api_key: Option<SecretString>,
    pub batch_timeout: Duration,
    pub batch_size: usize,
    pub sampling_rate: f64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            service_name: String::new(),
            endpoint: String::new(),
            api_key: None,
            batch_timeout: DEFAULT_BATCH_TIMEOUT,
            batch_size: DEFAULT_BATCH_SIZE,
            sampling_rate: 1.0,
        }
    }
}

impl ProviderConfig {
    pub fn new(service_name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            enabled: true,
            service_name: service_name.into(),
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    pub fn with_api_key(mut self, api_key: SecretString) -> Self {
        self.api_key = Some(api_key);
        self
    }

    /// Construction-time validation. Fails loudly: a half-configured sink
    /// is never handed out.
    pub fn validate(&self) -> Result<(), TracevineError> {
        if !self.enabled {
            return Err(TracevineError::ProviderDisabled);
        }
        if self.service_name.is_empty() {
            return Err(TracevineError::MissingServiceName);
        }
        if self.endpoint.is_empty() {
            return Err(TracevineError::MissingEndpoint);
        }
        if self.api_key.is_none() {
            return Err(TracevineError::MissingApiKey);
        }
        if !(0.0..=1.0).contains(&self.sampling_rate) {
            return Err(TracevineError::config(
                "sampling_rate",
                format!("{} is outside 0.0..=1.0", self.sampling_rate),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn valid() -> ProviderConfig {
        ProviderConfig::new("svc", "https://collector.example")
            .with_api_key(SecretString::new("sk-test".to_string()))
    }

    #[test]
    fn defaults_match_contract() {
        let config = ProviderConfig::default();
        assert!(!config.enabled);
        assert_eq!(config.batch_timeout, Duration::from_secs(5));
        assert_eq!(config.batch_size, 512);
    }

    #[test]
    fn validate_accepts_complete_config() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn validate_rejects_disabled() {
        let config = ProviderConfig {
            enabled: false,
            ..valid()
        };
        assert_eq!(
            config.validate().unwrap_err().kind(),
            ErrorKind::ProviderDisabled
        );
    }

    #[test]
    fn validate_requires_each_field() {
        let mut config = valid();
        config.service_name.clear();
        assert_eq!(
            config.validate().unwrap_err().kind(),
            ErrorKind::MissingServiceName
        );

        let mut config = valid();
        config.endpoint.clear();
        assert_eq!(
            config.validate().unwrap_err().kind(),
            ErrorKind::MissingEndpoint
        );

        let mut config = valid();
        config.api_key = None;
        assert_eq!(
            config.validate().unwrap_err().kind(),
            ErrorKind::MissingApiKey
        );
    }

    #[test]
    fn validate_bounds_sampling_rate() {
        let mut config = valid();
        config.sampling_rate = 1.5;
        assert_eq!(config.validate().unwrap_err().kind(), ErrorKind::Config);
    }
}

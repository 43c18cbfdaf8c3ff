use std::error::Error as StdError;

use thiserror::Error;

use crate::telemetry::Signal;

#[derive(Debug, Error)]
pub enum TracevineError {
    #[error("observability provider is disabled")]
    ProviderDisabled,
    #[error("service name is required")]
    MissingServiceName,
    #[error("endpoint is required")]
    MissingEndpoint,
    #[error("API key is required")]
    MissingApiKey,
    #[error("provider has been shut down")]
    Shutdown,
    #[error("operation is not supported by this provider")]
    NotSupported,
    #[error("invalid configuration for '{field}': {message}")]
    Config { field: String, message: String },
    #[error("provider '{provider}' failed during {op}")]
    Provider {
        provider: String,
        op: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
    #[error("failed to export {count} {signal} records: {details}")]
    Export {
        signal: Signal,
        count: usize,
        details: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

/// Discriminant for comparing errors without formatting them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    ProviderDisabled,
    MissingServiceName,
    MissingEndpoint,
    MissingApiKey,
    Shutdown,
    NotSupported,
    Config,
    Provider,
    Export,
}

impl TracevineError {
    pub fn provider(
        provider: impl Into<String>,
        op: impl Into<String>,
        source: impl Into<Box<dyn StdError + Send + Sync>>,
    ) -> Self {
        Self::Provider {
            provider: provider.into(),
            op: op.into(),
            source: source.into(),
        }
    }

    pub fn export(
        signal: Signal,
        count: usize,
        details: impl Into<String>,
        source: impl Into<Box<dyn StdError + Send + Sync>>,
    ) -> Self {
        Self::Export {
            signal,
            count,
            details: details.into(),
            source: source.into(),
        }
    }

    pub fn config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ProviderDisabled => ErrorKind::ProviderDisabled,
            Self::MissingServiceName => ErrorKind::MissingServiceName,
            Self::MissingEndpoint => ErrorKind::MissingEndpoint,
            Self::MissingApiKey => ErrorKind::MissingApiKey,
            Self::Shutdown => ErrorKind::Shutdown,
            Self::NotSupported => ErrorKind::NotSupported,
            Self::Config { .. } => ErrorKind::Config,
            Self::Provider { .. } => ErrorKind::Provider,
            Self::Export { .. } => ErrorKind::Export,
        }
    }

    /// Innermost `TracevineError` in the source chain, the wrapped sentinel
    /// for composite errors and `self` otherwise.
    pub fn root_cause(&self) -> &TracevineError {
        let mut current = self;
        while let Some(inner) = StdError::source(current)
            .and_then(|source| source.downcast_ref::<TracevineError>())
        {
            current = inner;
        }
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composite_preserves_cause_kind() {
        let err = TracevineError::provider("langfuse", "start_span", TracevineError::Shutdown);
        assert_eq!(err.kind(), ErrorKind::Provider);
        assert_eq!(err.root_cause().kind(), ErrorKind::Shutdown);
    }

    #[test]
    fn export_error_carries_signal_and_count() {
        let cause = TracevineError::provider("otlp", "export", TracevineError::MissingEndpoint);
        let err = TracevineError::export(Signal::Traces, 12, "collector unreachable", cause);
        match &err {
            TracevineError::Export { signal, count, .. } => {
                assert_eq!(*signal, Signal::Traces);
                assert_eq!(*count, 12);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(err.root_cause().kind(), ErrorKind::MissingEndpoint);
    }

    #[test]
    fn kind_equality_ignores_message() {
        let a = TracevineError::config("endpoint", "not a url");
        let b = TracevineError::config("api_key", "empty");
        assert_eq!(a.kind(), b.kind());
        assert_ne!(a.to_string(), b.to_string());
    }

    #[test]
    fn non_composite_cause_is_self() {
        let err = TracevineError::NotSupported;
        assert_eq!(err.root_cause().kind(), ErrorKind::NotSupported);
    }
}

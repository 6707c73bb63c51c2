use thiserror::Error;

/// Errors returned by brokerage providers.
///
/// All variants are retryable from the caller's point of view: the engine
/// takes no state-changing action before a provider call succeeds.
#[derive(Error, Debug)]
pub enum BrokerageError {
    #[error("HTTP request to {provider} failed: {source}")]
    Http {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} API error (status {status}): {message}")]
    Api {
        provider: &'static str,
        status: u16,
        message: String,
    },

    #[error("Failed to decode {provider} response: {message}")]
    Decode {
        provider: &'static str,
        message: String,
    },

    #[error("No data available from {provider} for {context}")]
    NoData {
        provider: &'static str,
        context: String,
    },

    #[error("Operation '{operation}' is not supported by provider {provider}")]
    NotSupported {
        operation: String,
        provider: &'static str,
    },

    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),
}

use thiserror::Error;

/// Errors raised by the external gateway clients.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The call exceeded the bounded per-call timeout.
    #[error("{service} service call timed out")]
    Timeout { service: &'static str },

    /// The transport failed or the service answered with an error status.
    #[error("{service} service request failed: {source}")]
    Http {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The service answered, but the payload is unusable.
    #[error("{service} service returned an unusable response: {reason}")]
    InvalidResponse {
        service: &'static str,
        reason: String,
    },

    /// The service refused the call (in-memory fakes use this for injected
    /// failures).
    #[error("{service} service rejected the call: {reason}")]
    Rejected {
        service: &'static str,
        reason: String,
    },
}

impl GatewayError {
    /// The service this error originated from.
    pub fn service(&self) -> &'static str {
        match self {
            GatewayError::Timeout { service }
            | GatewayError::Http { service, .. }
            | GatewayError::InvalidResponse { service, .. }
            | GatewayError::Rejected { service, .. } => service,
        }
    }
}

/// Result type for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;

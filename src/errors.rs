use thiserror::Error;

/// Failures that can end a single poll cycle.
///
/// Every variant is recoverable: the poller logs it, reports it to the
/// operator and tries again after the retry interval.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CycleError {
    /// DNS, connect, timeout or body read failure talking to the endpoint.
    #[error("status endpoint request failed: {0}")]
    EndpointTransport(String),

    /// The endpoint answered, but not with a usable 200 JSON body.
    #[error("status endpoint unavailable: {0}")]
    EndpointUnavailable(String),

    #[error("malformed status response: {0}")]
    MalformedResponse(String),

    #[error("unknown homework status: {0}")]
    UnknownStatusCode(String),

    #[error("message delivery failed: {0}")]
    DeliveryFailure(String),
}

impl CycleError {
    /// Stable label used in structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            CycleError::EndpointTransport(_) => "endpoint_transport",
            CycleError::EndpointUnavailable(_) => "endpoint_unavailable",
            CycleError::MalformedResponse(_) => "malformed_response",
            CycleError::UnknownStatusCode(_) => "unknown_status_code",
            CycleError::DeliveryFailure(_) => "delivery_failure",
        }
    }
}

/// Fatal startup conditions. Raised before the poll loop is entered.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variables: {}", names.join(", "))]
    MissingCredentials { names: Vec<&'static str> },

    #[error("invalid value for {name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },
}

use clinica_core::envelope::EnvelopeFailure;
use clinica_core::error::CoreError;

/// Errors surfaced by the data-fetching layer.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// A caller passed an invalid query or request; never retried.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status and no usable envelope.
    #[error("Backend API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The backend answered with `success: false`.
    #[error("Backend reported failure: {0}")]
    Backend(EnvelopeFailure),

    /// A successful envelope arrived without the expected `data`.
    #[error("Backend response carried no data")]
    MissingData,

    /// The response body did not match the expected shape.
    #[error("Failed to decode backend response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<EnvelopeFailure> for ClientError {
    fn from(failure: EnvelopeFailure) -> Self {
        ClientError::Backend(failure)
    }
}

/// Convenience alias for results in this crate.
pub type ClientResult<T> = Result<T, ClientError>;

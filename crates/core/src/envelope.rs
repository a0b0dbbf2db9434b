//! The `{ success, data, error, message }` envelope every backend call returns.
//!
//! Deserialization rejects envelopes that break the invariant (a failure
//! carrying data, or a success carrying an error), so callers can unwrap
//! every envelope the same way through [`StandardResult::into_result`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Uniform success/error wrapper around a backend payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "RawStandardResult<T>",
    bound(deserialize = "T: Deserialize<'de>")
)]
pub struct StandardResult<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

/// Wire shape before the invariant is checked.
#[derive(Deserialize)]
struct RawStandardResult<T> {
    success: bool,
    data: Option<T>,
    error: Option<String>,
    message: Option<String>,
}

impl<T> TryFrom<RawStandardResult<T>> for StandardResult<T> {
    type Error = CoreError;

    fn try_from(raw: RawStandardResult<T>) -> Result<Self, Self::Error> {
        if raw.success && raw.error.is_some() {
            return Err(CoreError::Validation(
                "successful envelope must not carry an error".to_string(),
            ));
        }
        if !raw.success && raw.data.is_some() {
            return Err(CoreError::Validation(
                "failed envelope must not carry data".to_string(),
            ));
        }
        Ok(Self {
            success: raw.success,
            data: raw.data,
            error: raw.error,
            message: raw.message,
        })
    }
}

impl<T> StandardResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message: None,
        }
    }

    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::ok(data)
        }
    }

    /// A success that carries no payload (e.g. a delete).
    pub fn ok_empty() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
            message: None,
        }
    }

    pub fn err(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            message: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Unwrap the envelope: the (possibly absent) payload on success, the
    /// backend's error and message on failure.
    pub fn into_result(self) -> Result<Option<T>, EnvelopeFailure> {
        if self.success {
            Ok(self.data)
        } else {
            Err(EnvelopeFailure {
                error: self.error,
                message: self.message,
            })
        }
    }
}

/// The error side of a failed [`StandardResult`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeFailure {
    pub error: Option<String>,
    pub message: Option<String>,
}

impl fmt::Display for EnvelopeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.error, &self.message) {
            (Some(error), Some(message)) => write!(f, "{error} ({message})"),
            (Some(text), None) | (None, Some(text)) => f.write_str(text),
            (None, None) => f.write_str("backend reported failure without details"),
        }
    }
}

impl std::error::Error for EnvelopeFailure {}

/// Errors raised by the pure logic in this crate.
///
/// Masking never fails; only the query composer and the field validators
/// produce errors, and they always surface them to the caller unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// A caller passed a value the composer refuses to clamp or guess
    /// (non-positive page/limit, unknown sort direction or column).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A user-entered field failed a domain check (CPF check digits, etc.).
    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Convenience alias for results produced by this crate.
pub type CoreResult<T> = Result<T, CoreError>;

//! Common result and error types for invariant violations.

/// The result type for operations that can only fail on a broken invariant.
///
/// `Err` never describes a problem with user input. Input problems are
/// reported through the error enums of the crates that parse that input.
pub type EcdResult<T> = Result<T, InternalError>;

/// An internal consistency error indicating a bug, not a user input problem.
#[derive(Debug, thiserror::Error)]
#[error("internal consistency error: {message}")]
pub struct InternalError {
    /// Description of the broken invariant.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

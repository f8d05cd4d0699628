use super::Error;

/// A compiler invariant was broken.
///
/// Seeing this means validation let through an input that an adapter does
/// not handle. It is never caused by user input alone.
#[derive(Debug)]
pub(super) struct InternalError {
    message: Box<str>,
}

impl std::error::Error for InternalError {}

impl core::fmt::Display for InternalError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "internal error: {}", self.message)
    }
}

impl Error {
    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::Internal(InternalError {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is an internal error.
    pub fn is_internal(&self) -> bool {
        matches!(self.root_kind(), super::ErrorKind::Internal(_))
    }
}

mod adhoc;
mod field_reference;
mod internal;
mod unsupported_feature;
mod validation;

use adhoc::AdhocError;
use field_reference::FieldReferenceCompatibilityError;
use internal::InternalError;
use std::sync::Arc;
use unsupported_feature::UnsupportedFeature;
use validation::ValidationError;

/// Creates an ad-hoc error from format arguments.
///
/// Mostly used to attach context to an error produced further down, for
/// example the field a failing date filter belongs to.
#[macro_export]
macro_rules! err {
    ($($arg:tt)*) => {
        $crate::Error::from_args(format_args!($($arg)*))
    };
}

/// An error that can occur while compiling a query fragment.
#[derive(Clone)]
pub struct Error {
    inner: Option<Arc<ErrorInner>>,
}

#[derive(Debug)]
struct ErrorInner {
    kind: ErrorKind,
    cause: Option<Error>,
}

impl Error {
    /// Creates an error from a format string.
    pub fn from_args(args: core::fmt::Arguments<'_>) -> Error {
        Error::from(ErrorKind::Adhoc(AdhocError::from_args(args)))
    }

    /// Adds context to this error.
    ///
    /// Context is displayed in reverse order: the most recently added context
    /// is shown first, followed by earlier context, ending with the root cause.
    #[inline(always)]
    pub fn context(self, consequent: impl IntoError) -> Error {
        self.context_impl(consequent.into_error())
    }

    #[inline(never)]
    #[cold]
    fn context_impl(self, consequent: Error) -> Error {
        let kind = match consequent.inner {
            Some(inner) => match Arc::try_unwrap(inner) {
                Ok(inner) => inner.kind,
                Err(shared) => ErrorKind::Adhoc(AdhocError::from_args(format_args!(
                    "{}",
                    shared.kind
                ))),
            },
            None => ErrorKind::Unknown,
        };

        Error {
            inner: Some(Arc::new(ErrorInner {
                kind,
                cause: Some(self),
            })),
        }
    }

    fn root(&self) -> &Error {
        let mut err = self;
        while let Some(cause) = err.inner.as_ref().and_then(|inner| inner.cause.as_ref()) {
            err = cause;
        }
        err
    }

    fn chain(&self) -> impl Iterator<Item = &Error> {
        let mut err = self;
        core::iter::once(err).chain(core::iter::from_fn(move || {
            err = err.inner.as_ref().and_then(|inner| inner.cause.as_ref())?;
            Some(err)
        }))
    }

    fn kind(&self) -> &ErrorKind {
        self.inner
            .as_ref()
            .map(|inner| &inner.kind)
            .unwrap_or(&ErrorKind::Unknown)
    }

    /// The kind of the innermost error in the context chain.
    fn root_kind(&self) -> &ErrorKind {
        self.root().kind()
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.inner
            .as_ref()
            .and_then(|inner| inner.cause.as_ref())
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let mut it = self.chain().peekable();
        while let Some(err) = it.next() {
            core::fmt::Display::fmt(err.kind(), f)?;
            if it.peek().is_some() {
                f.write_str(": ")?;
            }
        }
        Ok(())
    }
}

impl core::fmt::Debug for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        if !f.alternate() {
            core::fmt::Display::fmt(self, f)
        } else {
            let Some(ref inner) = self.inner else {
                return f.debug_struct("Error").field("kind", &"None").finish();
            };
            f.debug_struct("Error")
                .field("kind", &inner.kind)
                .field("cause", &inner.cause)
                .finish()
        }
    }
}

#[derive(Debug)]
enum ErrorKind {
    Adhoc(AdhocError),
    Validation(ValidationError),
    FieldReferenceCompatibility(FieldReferenceCompatibilityError),
    UnsupportedFeature(UnsupportedFeature),
    Internal(InternalError),
    Unknown,
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        use self::ErrorKind::*;

        match self {
            Adhoc(err) => core::fmt::Display::fmt(err, f),
            Validation(err) => core::fmt::Display::fmt(err, f),
            FieldReferenceCompatibility(err) => core::fmt::Display::fmt(err, f),
            UnsupportedFeature(err) => core::fmt::Display::fmt(err, f),
            Internal(err) => core::fmt::Display::fmt(err, f),
            Unknown => f.write_str("unknown gridql error"),
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error {
            inner: Some(Arc::new(ErrorInner { kind, cause: None })),
        }
    }
}

impl From<jiff::Error> for Error {
    fn from(err: jiff::Error) -> Error {
        Error::from_args(format_args!("date arithmetic failed: {err}"))
    }
}

/// Trait for types that can be converted into an Error.
pub trait IntoError {
    /// Converts this type into an Error.
    fn into_error(self) -> Error;
}

impl IntoError for Error {
    #[inline(always)]
    fn into_error(self) -> Error {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stmt::{DateMode, Operator};

    #[test]
    fn error_size() {
        // Ensure Error stays at one word (size of pointer/Arc)
        let expected_size = core::mem::size_of::<usize>();
        assert_eq!(expected_size, core::mem::size_of::<Error>());
    }

    #[test]
    fn error_from_args() {
        let err = err!("test error: {}", 42);
        assert_eq!(err.to_string(), "test error: 42");
    }

    #[test]
    fn error_chain_display() {
        let chained = err!("root cause")
            .context(err!("middle context"))
            .context(err!("top context"));
        assert_eq!(
            chained.to_string(),
            "top context: middle context: root cause"
        );
    }

    #[test]
    fn predicates_look_through_context() {
        let err = Error::missing_date_input(DateMode::DateRange, "exactDateEnd")
            .context(err!("filter on field \"Due\""));

        assert!(err.is_validation());
        assert!(!err.is_internal());
        assert_eq!(
            err.to_string(),
            "filter on field \"Due\": date mode `dateRange` requires `exactDateEnd`"
        );
    }

    #[test]
    fn invalid_operator_lists_allowed_set() {
        let err = Error::invalid_operator(
            "Done",
            Operator::Contains,
            &[Operator::Is, Operator::IsEmpty],
        );
        assert_eq!(
            err.to_string(),
            "operator `contains` is not allowed for field \"Done\"; allowed: is, isEmpty"
        );
    }

    #[test]
    fn field_reference_names_both_fields() {
        let err = Error::field_reference_compatibility("Price", "Due");
        assert!(err.is_field_reference_compatibility());
        assert_eq!(
            err.to_string(),
            "field \"Price\" cannot be compared with field \"Due\""
        );
    }

    #[test]
    fn internal_error() {
        let err = Error::internal("boolean adapter has no `contains` handler");
        assert!(err.is_internal());
        assert_eq!(
            err.to_string(),
            "internal error: boolean adapter has no `contains` handler"
        );
    }
}

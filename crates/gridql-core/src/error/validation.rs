use super::Error;
use crate::stmt::{DateMode, Operator};

use jiff::Timestamp;

/// Error when a user-authored specification is rejected.
#[derive(Debug)]
pub(super) struct ValidationError {
    pub(super) kind: ValidationErrorKind,
}

#[derive(Debug)]
pub(super) enum ValidationErrorKind {
    /// The operator is not available for the field's cell value type.
    InvalidOperator {
        field: Box<str>,
        operator: Operator,
        allowed: Vec<Operator>,
    },

    /// The date sub-mode is not available for the operator.
    InvalidDateMode {
        field: Box<str>,
        operator: Operator,
        mode: DateMode,
        allowed: Vec<DateMode>,
    },

    /// A date mode was used without one of the inputs it needs.
    MissingDateInput { mode: DateMode, input: &'static str },

    /// A day offset mode received zero or a negative number of days.
    NonPositiveDays { mode: DateMode, days: i64 },

    /// A number of days moves the date outside the supported calendar.
    DaysOutOfRange { mode: DateMode, days: i64 },

    /// A date range starts after it ends.
    DateRangeReversed { start: Timestamp, end: Timestamp },

    /// A set operator received a scalar literal.
    ListRequired { field: Box<str>, operator: Operator },

    /// An operator that only compares against literals received a field
    /// reference.
    LiteralRequired { field: Box<str>, operator: Operator },

    /// A literal could not be coerced to the field's cell value type.
    InvalidLiteral {
        field: Box<str>,
        expected: &'static str,
    },

    /// The time zone name is not in the time zone database.
    InvalidTimeZone { name: Box<str> },

    /// The field description breaks one of its own invariants.
    InvalidField {
        field: Box<str>,
        reason: &'static str,
    },
}

impl std::error::Error for ValidationError {}

impl core::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        use ValidationErrorKind::*;

        match &self.kind {
            InvalidOperator {
                field,
                operator,
                allowed,
            } => {
                write!(
                    f,
                    "operator `{operator}` is not allowed for field {field:?}; allowed: "
                )?;
                write_list(f, allowed)
            }
            InvalidDateMode {
                field,
                operator,
                mode,
                allowed,
            } => {
                write!(
                    f,
                    "date mode `{mode}` is not allowed for operator `{operator}` on field {field:?}; allowed: "
                )?;
                write_list(f, allowed)
            }
            MissingDateInput { mode, input } => {
                write!(f, "date mode `{mode}` requires `{input}`")
            }
            NonPositiveDays { mode, days } => {
                write!(
                    f,
                    "date mode `{mode}` requires a positive `numberOfDays`, got {days}"
                )
            }
            DaysOutOfRange { mode, days } => {
                write!(
                    f,
                    "date mode `{mode}` cannot move {days} days from today"
                )
            }
            DateRangeReversed { start, end } => {
                write!(f, "date range starts at {start}, after its end {end}")
            }
            ListRequired { field, operator } => {
                write!(
                    f,
                    "operator `{operator}` on field {field:?} requires a list value"
                )
            }
            LiteralRequired { field, operator } => {
                write!(
                    f,
                    "operator `{operator}` on field {field:?} cannot compare against another field"
                )
            }
            InvalidLiteral { field, expected } => {
                write!(f, "value for field {field:?} is not a valid {expected}")
            }
            InvalidTimeZone { name } => write!(f, "unknown time zone {name:?}"),
            InvalidField { field, reason } => write!(f, "field {field:?} is invalid: {reason}"),
        }
    }
}

fn write_list<T: core::fmt::Display>(
    f: &mut core::fmt::Formatter,
    items: &[T],
) -> core::fmt::Result {
    let mut s = "";
    for item in items {
        write!(f, "{s}{item}")?;
        s = ", ";
    }
    Ok(())
}

impl Error {
    fn validation(kind: ValidationErrorKind) -> Error {
        Error::from(super::ErrorKind::Validation(ValidationError { kind }))
    }

    /// Creates an error for an operator the field does not support.
    pub fn invalid_operator(field: &str, operator: Operator, allowed: &[Operator]) -> Error {
        Error::validation(ValidationErrorKind::InvalidOperator {
            field: field.into(),
            operator,
            allowed: allowed.to_vec(),
        })
    }

    /// Creates an error for a date sub-mode the operator does not support.
    pub fn invalid_date_mode(
        field: &str,
        operator: Operator,
        mode: DateMode,
        allowed: &[DateMode],
    ) -> Error {
        Error::validation(ValidationErrorKind::InvalidDateMode {
            field: field.into(),
            operator,
            mode,
            allowed: allowed.to_vec(),
        })
    }

    pub fn missing_date_input(mode: DateMode, input: &'static str) -> Error {
        Error::validation(ValidationErrorKind::MissingDateInput { mode, input })
    }

    pub fn non_positive_days(mode: DateMode, days: i64) -> Error {
        Error::validation(ValidationErrorKind::NonPositiveDays { mode, days })
    }

    pub fn days_out_of_range(mode: DateMode, days: i64) -> Error {
        Error::validation(ValidationErrorKind::DaysOutOfRange { mode, days })
    }

    pub fn date_range_reversed(start: Timestamp, end: Timestamp) -> Error {
        Error::validation(ValidationErrorKind::DateRangeReversed { start, end })
    }

    pub fn list_required(field: &str, operator: Operator) -> Error {
        Error::validation(ValidationErrorKind::ListRequired {
            field: field.into(),
            operator,
        })
    }

    pub fn literal_required(field: &str, operator: Operator) -> Error {
        Error::validation(ValidationErrorKind::LiteralRequired {
            field: field.into(),
            operator,
        })
    }

    pub fn invalid_literal(field: &str, expected: &'static str) -> Error {
        Error::validation(ValidationErrorKind::InvalidLiteral {
            field: field.into(),
            expected,
        })
    }

    pub fn invalid_time_zone(name: &str) -> Error {
        Error::validation(ValidationErrorKind::InvalidTimeZone { name: name.into() })
    }

    pub fn invalid_field(field: &str, reason: &'static str) -> Error {
        Error::validation(ValidationErrorKind::InvalidField {
            field: field.into(),
            reason,
        })
    }

    /// Returns `true` if this error is a validation error.
    pub fn is_validation(&self) -> bool {
        matches!(self.root_kind(), super::ErrorKind::Validation(_))
    }
}

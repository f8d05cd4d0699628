use super::Error;

/// Error when a filter compares two fields whose values cannot be compared.
///
/// Raised when the referenced field is missing from the reference lookup,
/// when the two fields hold different cell value types, or when the operator
/// is not available for the source field and the value is a reference.
#[derive(Debug)]
pub(super) struct FieldReferenceCompatibilityError {
    field: Box<str>,
    reference: Box<str>,
}

impl std::error::Error for FieldReferenceCompatibilityError {}

impl core::fmt::Display for FieldReferenceCompatibilityError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "field {:?} cannot be compared with field {:?}",
            self.field, self.reference
        )
    }
}

impl Error {
    /// Creates a field reference compatibility error naming both fields.
    pub fn field_reference_compatibility(
        field: impl Into<String>,
        reference: impl Into<String>,
    ) -> Error {
        Error::from(super::ErrorKind::FieldReferenceCompatibility(
            FieldReferenceCompatibilityError {
                field: field.into().into(),
                reference: reference.into().into(),
            },
        ))
    }

    /// Returns `true` if this error is a field reference compatibility error.
    pub fn is_field_reference_compatibility(&self) -> bool {
        matches!(
            self.root_kind(),
            super::ErrorKind::FieldReferenceCompatibility(_)
        )
    }
}

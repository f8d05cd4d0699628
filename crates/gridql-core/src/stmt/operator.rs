use crate::schema::{CellValueType, Multiplicity};

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// A filter operator.
///
/// Operators deserialize from their camelCase name or from a symbolic alias
/// (`=`, `!=`, `>`, `>=`, `<`, `<=`, `LIKE`, `NOT LIKE`, `IN`, `NOT IN`,
/// `IS NULL`, `IS NOT NULL`). Symbols resolve to the numeric spelling of the
/// ordering operators; [`Operator::canonical`] maps them to the date
/// spelling for date fields.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operator {
    #[serde(alias = "=")]
    Is,
    #[serde(alias = "!=")]
    IsNot,
    #[serde(alias = "LIKE")]
    Contains,
    #[serde(alias = "NOT LIKE")]
    DoesNotContain,
    #[serde(alias = ">")]
    IsGreater,
    #[serde(alias = ">=")]
    IsGreaterEqual,
    #[serde(alias = "<")]
    IsLess,
    #[serde(alias = "<=")]
    IsLessEqual,
    IsAfter,
    IsOnOrAfter,
    IsBefore,
    IsOnOrBefore,
    #[serde(alias = "isWithIn")]
    IsWithin,
    #[serde(alias = "IN")]
    IsAnyOf,
    #[serde(alias = "NOT IN")]
    IsNoneOf,
    HasAnyOf,
    HasAllOf,
    HasNoneOf,
    IsExactly,
    IsNotExactly,
    #[serde(alias = "IS NULL")]
    IsEmpty,
    #[serde(alias = "IS NOT NULL")]
    IsNotEmpty,
}

use Operator::*;

const BOOLEAN: &[Operator] = &[Is, IsNot, IsEmpty, IsNotEmpty];

const BOOLEAN_MULTIPLE: &[Operator] = &[Is, IsNot, HasAnyOf, HasNoneOf, IsEmpty, IsNotEmpty];

const NUMBER: &[Operator] = &[
    Is,
    IsNot,
    IsGreater,
    IsGreaterEqual,
    IsLess,
    IsLessEqual,
    IsAnyOf,
    IsNoneOf,
    IsEmpty,
    IsNotEmpty,
];

const NUMBER_MULTIPLE: &[Operator] = &[
    Is,
    IsNot,
    IsGreater,
    IsGreaterEqual,
    IsLess,
    IsLessEqual,
    IsAnyOf,
    IsNoneOf,
    HasAnyOf,
    HasAllOf,
    HasNoneOf,
    IsExactly,
    IsNotExactly,
    IsEmpty,
    IsNotEmpty,
];

const DATE_TIME: &[Operator] = &[
    Is,
    IsNot,
    IsWithin,
    IsAfter,
    IsOnOrAfter,
    IsBefore,
    IsOnOrBefore,
    IsEmpty,
    IsNotEmpty,
];

const STRING: &[Operator] = &[
    Is,
    IsNot,
    Contains,
    DoesNotContain,
    IsAnyOf,
    IsNoneOf,
    IsEmpty,
    IsNotEmpty,
];

const STRING_MULTIPLE: &[Operator] = &[
    Is,
    IsNot,
    Contains,
    DoesNotContain,
    IsAnyOf,
    IsNoneOf,
    HasAnyOf,
    HasAllOf,
    HasNoneOf,
    IsExactly,
    IsNotExactly,
    IsEmpty,
    IsNotEmpty,
];

impl Operator {
    pub const fn as_str(self) -> &'static str {
        match self {
            Is => "is",
            IsNot => "isNot",
            Contains => "contains",
            DoesNotContain => "doesNotContain",
            IsGreater => "isGreater",
            IsGreaterEqual => "isGreaterEqual",
            IsLess => "isLess",
            IsLessEqual => "isLessEqual",
            IsAfter => "isAfter",
            IsOnOrAfter => "isOnOrAfter",
            IsBefore => "isBefore",
            IsOnOrBefore => "isOnOrBefore",
            IsWithin => "isWithin",
            IsAnyOf => "isAnyOf",
            IsNoneOf => "isNoneOf",
            HasAnyOf => "hasAnyOf",
            HasAllOf => "hasAllOf",
            HasNoneOf => "hasNoneOf",
            IsExactly => "isExactly",
            IsNotExactly => "isNotExactly",
            IsEmpty => "isEmpty",
            IsNotEmpty => "isNotEmpty",
        }
    }

    /// Maps the ordering operators to the spelling used for `ty`.
    ///
    /// Date fields use `isAfter`/`isBefore`, every other type uses
    /// `isGreater`/`isLess`. Other operators are returned unchanged.
    pub const fn canonical(self, ty: CellValueType) -> Operator {
        match (ty, self) {
            (CellValueType::DateTime, IsGreater) => IsAfter,
            (CellValueType::DateTime, IsGreaterEqual) => IsOnOrAfter,
            (CellValueType::DateTime, IsLess) => IsBefore,
            (CellValueType::DateTime, IsLessEqual) => IsOnOrBefore,
            (CellValueType::DateTime, op) => op,
            (_, IsAfter) => IsGreater,
            (_, IsOnOrAfter) => IsGreaterEqual,
            (_, IsBefore) => IsLess,
            (_, IsOnOrBefore) => IsLessEqual,
            (_, op) => op,
        }
    }

    /// Operators available for a field of the given shape.
    pub const fn allowed_for(ty: CellValueType, multiplicity: Multiplicity) -> &'static [Operator] {
        match (ty, multiplicity) {
            (CellValueType::Boolean, Multiplicity::Single) => BOOLEAN,
            (CellValueType::Boolean, Multiplicity::Multiple) => BOOLEAN_MULTIPLE,
            (CellValueType::Number, Multiplicity::Single) => NUMBER,
            (CellValueType::Number, Multiplicity::Multiple) => NUMBER_MULTIPLE,
            (CellValueType::DateTime, _) => DATE_TIME,
            (CellValueType::String, Multiplicity::Single) => STRING,
            (CellValueType::String, Multiplicity::Multiple) => STRING_MULTIPLE,
        }
    }

    /// True when the operator takes no comparison value.
    pub const fn is_emptiness(self) -> bool {
        matches!(self, IsEmpty | IsNotEmpty)
    }

    /// True when the comparison value must be a list literal (or a field
    /// reference).
    pub const fn takes_list(self) -> bool {
        matches!(
            self,
            IsAnyOf | IsNoneOf | HasAnyOf | HasAllOf | HasNoneOf | IsExactly | IsNotExactly
        )
    }

    /// True when the operator can compare against another field.
    pub const fn accepts_reference(self) -> bool {
        !matches!(
            self,
            Contains | DoesNotContain | IsWithin | IsEmpty | IsNotEmpty
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Operator> {
        use serde::de::{value::StrDeserializer, IntoDeserializer};

        let de: StrDeserializer<'_, serde::de::value::Error> = s.into_deserializer();
        Operator::deserialize(de).map_err(|_| crate::err!("unknown filter operator {s:?}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_parse_to_operators() {
        assert_eq!("=".parse::<Operator>().unwrap(), Is);
        assert_eq!("NOT IN".parse::<Operator>().unwrap(), IsNoneOf);
        assert_eq!("IS NOT NULL".parse::<Operator>().unwrap(), IsNotEmpty);
        assert_eq!("isWithIn".parse::<Operator>().unwrap(), IsWithin);
        assert_eq!("hasAllOf".parse::<Operator>().unwrap(), HasAllOf);
        assert!("~".parse::<Operator>().is_err());
    }

    #[test]
    fn ordering_spelling_depends_on_type() {
        assert_eq!(IsGreater.canonical(CellValueType::DateTime), IsAfter);
        assert_eq!(IsBefore.canonical(CellValueType::Number), IsLess);
        assert_eq!(IsOnOrAfter.canonical(CellValueType::DateTime), IsOnOrAfter);
        assert_eq!(Contains.canonical(CellValueType::String), Contains);
    }

    #[test]
    fn display_matches_wire_name() {
        for op in NUMBER_MULTIPLE.iter().chain(DATE_TIME).chain(STRING) {
            let json = serde_json::to_string(op).unwrap();
            assert_eq!(json, format!("\"{op}\""));
        }
    }
}

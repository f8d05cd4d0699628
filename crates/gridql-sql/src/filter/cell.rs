mod array;
mod boolean;
mod date_time;
mod number;
mod string;

use crate::serializer::{
    like_pattern, Column, Comma, Elements, Flavor, Formatter, Params, Scalar, ToSql, Truncate, Zone,
};

use gridql_core::{
    schema::{CellValueType, DateGranularity, FieldSpec},
    stmt::{self, Operator, Value},
    Error, Result,
};

/// The right-hand side of a validated predicate.
#[derive(Debug, Copy, Clone)]
pub(super) enum Operand<'a> {
    /// Emptiness operators take no value.
    None,

    /// A null literal. Only boolean fields keep these through normalization.
    Null,

    Scalar(&'a stmt::Scalar),

    List(&'a [stmt::Scalar]),

    Reference(&'a FieldSpec),
}

/// One operand of a comparison: a bound literal or another field.
pub(super) enum Rhs<'a> {
    Value(Value),
    Reference(&'a FieldSpec),
}

/// The operand of a set operator.
pub(super) enum Set<'a> {
    Values(Vec<Value>),
    Reference(&'a FieldSpec),
}

/// Writes the predicate for one operator against one kind of cell.
///
/// Every operator has a method. Adapters override the ones their cell type
/// supports; the rest report an internal error, since validation should have
/// rejected the operator already.
pub(super) trait CellFilter {
    /// Name used in internal errors.
    fn name(&self) -> &'static str;

    fn is<P: Params>(&self, _f: &mut Formatter<'_, P>, _rhs: Operand<'_>) -> Result<()> {
        Err(unhandled(self.name(), Operator::Is))
    }

    fn is_not<P: Params>(&self, _f: &mut Formatter<'_, P>, _rhs: Operand<'_>) -> Result<()> {
        Err(unhandled(self.name(), Operator::IsNot))
    }

    fn contains<P: Params>(&self, _f: &mut Formatter<'_, P>, _rhs: Operand<'_>) -> Result<()> {
        Err(unhandled(self.name(), Operator::Contains))
    }

    fn does_not_contain<P: Params>(
        &self,
        _f: &mut Formatter<'_, P>,
        _rhs: Operand<'_>,
    ) -> Result<()> {
        Err(unhandled(self.name(), Operator::DoesNotContain))
    }

    fn is_greater<P: Params>(&self, _f: &mut Formatter<'_, P>, _rhs: Operand<'_>) -> Result<()> {
        Err(unhandled(self.name(), Operator::IsGreater))
    }

    fn is_greater_equal<P: Params>(
        &self,
        _f: &mut Formatter<'_, P>,
        _rhs: Operand<'_>,
    ) -> Result<()> {
        Err(unhandled(self.name(), Operator::IsGreaterEqual))
    }

    fn is_less<P: Params>(&self, _f: &mut Formatter<'_, P>, _rhs: Operand<'_>) -> Result<()> {
        Err(unhandled(self.name(), Operator::IsLess))
    }

    fn is_less_equal<P: Params>(&self, _f: &mut Formatter<'_, P>, _rhs: Operand<'_>) -> Result<()> {
        Err(unhandled(self.name(), Operator::IsLessEqual))
    }

    fn is_after<P: Params>(&self, _f: &mut Formatter<'_, P>, _rhs: Operand<'_>) -> Result<()> {
        Err(unhandled(self.name(), Operator::IsAfter))
    }

    fn is_on_or_after<P: Params>(&self, _f: &mut Formatter<'_, P>, _rhs: Operand<'_>) -> Result<()> {
        Err(unhandled(self.name(), Operator::IsOnOrAfter))
    }

    fn is_before<P: Params>(&self, _f: &mut Formatter<'_, P>, _rhs: Operand<'_>) -> Result<()> {
        Err(unhandled(self.name(), Operator::IsBefore))
    }

    fn is_on_or_before<P: Params>(
        &self,
        _f: &mut Formatter<'_, P>,
        _rhs: Operand<'_>,
    ) -> Result<()> {
        Err(unhandled(self.name(), Operator::IsOnOrBefore))
    }

    fn is_within<P: Params>(&self, _f: &mut Formatter<'_, P>, _rhs: Operand<'_>) -> Result<()> {
        Err(unhandled(self.name(), Operator::IsWithin))
    }

    fn is_any_of<P: Params>(&self, _f: &mut Formatter<'_, P>, _rhs: Operand<'_>) -> Result<()> {
        Err(unhandled(self.name(), Operator::IsAnyOf))
    }

    fn is_none_of<P: Params>(&self, _f: &mut Formatter<'_, P>, _rhs: Operand<'_>) -> Result<()> {
        Err(unhandled(self.name(), Operator::IsNoneOf))
    }

    fn has_any_of<P: Params>(&self, _f: &mut Formatter<'_, P>, _rhs: Operand<'_>) -> Result<()> {
        Err(unhandled(self.name(), Operator::HasAnyOf))
    }

    fn has_all_of<P: Params>(&self, _f: &mut Formatter<'_, P>, _rhs: Operand<'_>) -> Result<()> {
        Err(unhandled(self.name(), Operator::HasAllOf))
    }

    fn has_none_of<P: Params>(&self, _f: &mut Formatter<'_, P>, _rhs: Operand<'_>) -> Result<()> {
        Err(unhandled(self.name(), Operator::HasNoneOf))
    }

    fn is_exactly<P: Params>(&self, _f: &mut Formatter<'_, P>, _rhs: Operand<'_>) -> Result<()> {
        Err(unhandled(self.name(), Operator::IsExactly))
    }

    fn is_not_exactly<P: Params>(
        &self,
        _f: &mut Formatter<'_, P>,
        _rhs: Operand<'_>,
    ) -> Result<()> {
        Err(unhandled(self.name(), Operator::IsNotExactly))
    }

    fn is_empty<P: Params>(&self, _f: &mut Formatter<'_, P>) -> Result<()> {
        Err(unhandled(self.name(), Operator::IsEmpty))
    }

    fn is_not_empty<P: Params>(&self, _f: &mut Formatter<'_, P>) -> Result<()> {
        Err(unhandled(self.name(), Operator::IsNotEmpty))
    }
}

/// The adapter for each `(cell value type, multiplicity)` pair.
pub(super) enum Cell<'a> {
    Boolean(boolean::Boolean<'a>),
    BooleanArray(boolean::BooleanArray<'a>),
    Number(number::Number<'a>),
    NumberArray(number::NumberArray<'a>),
    DateTime(date_time::DateTime<'a>),
    DateTimeArray(date_time::DateTimeArray<'a>),
    String(string::Text<'a>),
    StringArray(string::TextArray<'a>),
}

impl<'a> Cell<'a> {
    pub(super) fn of(field: &'a FieldSpec) -> Cell<'a> {
        match (field.cell_value_type, field.is_multiple()) {
            (CellValueType::Boolean, false) => Cell::Boolean(boolean::Boolean(field)),
            (CellValueType::Boolean, true) => Cell::BooleanArray(boolean::BooleanArray(field)),
            (CellValueType::Number, false) => Cell::Number(number::Number(field)),
            (CellValueType::Number, true) => Cell::NumberArray(number::NumberArray(field)),
            (CellValueType::DateTime, false) => Cell::DateTime(date_time::DateTime(field)),
            (CellValueType::DateTime, true) => {
                Cell::DateTimeArray(date_time::DateTimeArray(field))
            }
            (CellValueType::String, false) => Cell::String(string::Text(field)),
            (CellValueType::String, true) => Cell::StringArray(string::TextArray(field)),
        }
    }

    pub(super) fn filter<P: Params>(
        &self,
        f: &mut Formatter<'_, P>,
        operator: Operator,
        rhs: Operand<'_>,
    ) -> Result<()> {
        match self {
            Cell::Boolean(cell) => apply(cell, f, operator, rhs),
            Cell::BooleanArray(cell) => apply(cell, f, operator, rhs),
            Cell::Number(cell) => apply(cell, f, operator, rhs),
            Cell::NumberArray(cell) => apply(cell, f, operator, rhs),
            Cell::DateTime(cell) => apply(cell, f, operator, rhs),
            Cell::DateTimeArray(cell) => apply(cell, f, operator, rhs),
            Cell::String(cell) => apply(cell, f, operator, rhs),
            Cell::StringArray(cell) => apply(cell, f, operator, rhs),
        }
    }
}

fn apply<C: CellFilter, P: Params>(
    cell: &C,
    f: &mut Formatter<'_, P>,
    operator: Operator,
    rhs: Operand<'_>,
) -> Result<()> {
    use Operator::*;

    match operator {
        Is => cell.is(f, rhs),
        IsNot => cell.is_not(f, rhs),
        Contains => cell.contains(f, rhs),
        DoesNotContain => cell.does_not_contain(f, rhs),
        IsGreater => cell.is_greater(f, rhs),
        IsGreaterEqual => cell.is_greater_equal(f, rhs),
        IsLess => cell.is_less(f, rhs),
        IsLessEqual => cell.is_less_equal(f, rhs),
        IsAfter => cell.is_after(f, rhs),
        IsOnOrAfter => cell.is_on_or_after(f, rhs),
        IsBefore => cell.is_before(f, rhs),
        IsOnOrBefore => cell.is_on_or_before(f, rhs),
        IsWithin => cell.is_within(f, rhs),
        IsAnyOf => cell.is_any_of(f, rhs),
        IsNoneOf => cell.is_none_of(f, rhs),
        HasAnyOf => cell.has_any_of(f, rhs),
        HasAllOf => cell.has_all_of(f, rhs),
        HasNoneOf => cell.has_none_of(f, rhs),
        IsExactly => cell.is_exactly(f, rhs),
        IsNotExactly => cell.is_not_exactly(f, rhs),
        IsEmpty => cell.is_empty(f),
        IsNotEmpty => cell.is_not_empty(f),
    }
}

fn unhandled(adapter: &str, operator: Operator) -> Error {
    Error::internal(format!("{adapter} adapter has no `{operator}` handler"))
}

/// Comparison operators.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(super) enum Cmp {
    Eq,

    /// Null-safe inequality
    Ne,

    Gt,
    Ge,
    Lt,
    Le,
}

impl ToSql for Cmp {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let op = match (self, f.serializer.flavor) {
            (Cmp::Eq, _) => " = ",
            (Cmp::Ne, Flavor::Postgresql) => " IS DISTINCT FROM ",
            (Cmp::Ne, Flavor::Sqlite) => " IS NOT ",
            (Cmp::Gt, _) => " > ",
            (Cmp::Ge, _) => " >= ",
            (Cmp::Lt, _) => " < ",
            (Cmp::Le, _) => " <= ",
        };
        fmt!(f, op);
    }
}

/// A parenthesized list of placeholders.
pub(super) struct List<'a>(pub(super) &'a [Value]);

impl ToSql for List<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(f, "(" Comma(self.0) ")");
    }
}

/// Date truncation applied to both sides of a reference comparison.
#[derive(Debug, Copy, Clone)]
pub(super) struct DateUnit<'a> {
    pub(super) unit: DateGranularity,
    pub(super) zone: &'a Zone,
}

#[derive(Debug, Copy, Clone)]
struct MaybeTruncate<'a, E>(E, Option<DateUnit<'a>>);

impl<E: ToSql> ToSql for MaybeTruncate<'_, E> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        match self.1 {
            Some(DateUnit { unit, zone }) => fmt!(f, Truncate { expr: self.0, unit, zone }),
            None => fmt!(f, self.0),
        }
    }
}

/// Writes `lhs <cmp> reference`.
///
/// A multi-valued reference matches when any of its elements satisfies the
/// comparison. Null-safe inequality against a multi-valued reference means
/// none of its elements is equal.
pub(super) fn compare_reference<P: Params, L: ToSql + Copy>(
    f: &mut Formatter<'_, P>,
    lhs: L,
    cmp: Cmp,
    reference: &FieldSpec,
    unit: Option<DateUnit<'_>>,
) {
    let lhs = MaybeTruncate(lhs, unit);

    if reference.is_multiple() {
        let elements = Elements::new(reference, "y");
        let rhs = MaybeTruncate(elements.elem(), unit);

        if cmp == Cmp::Ne {
            fmt!(
                f,
                "NOT EXISTS (SELECT 1 FROM " elements.coalesce() " WHERE " lhs Cmp::Eq rhs ")"
            );
        } else {
            fmt!(f, "EXISTS (SELECT 1 FROM " elements " WHERE " lhs cmp rhs ")");
        }
    } else {
        fmt!(f, lhs cmp MaybeTruncate(Scalar(reference), unit));
    }
}

/// Writes `lhs <cmp> rhs` for a literal or a reference.
pub(super) fn compare<P: Params, L: ToSql + Copy>(
    f: &mut Formatter<'_, P>,
    lhs: L,
    cmp: Cmp,
    rhs: &Rhs<'_>,
) {
    match rhs {
        Rhs::Value(value) => fmt!(f, lhs cmp value),
        Rhs::Reference(reference) => compare_reference(f, lhs, cmp, reference, None),
    }
}

/// Writes set membership of a single-valued cell. `isNoneOf` also matches
/// null cells.
pub(super) fn member_of<P: Params, L: ToSql + Copy>(
    f: &mut Formatter<'_, P>,
    lhs: L,
    set: &Set<'_>,
    negate: bool,
) {
    match (set, negate) {
        (Set::Values(values), false) => fmt!(f, lhs " IN " List(values)),
        (Set::Values(values), true) => {
            fmt!(f, "(" lhs " NOT IN " List(values) " OR " lhs " IS NULL)")
        }
        (Set::Reference(reference), false) => compare_reference(f, lhs, Cmp::Eq, reference, None),
        (Set::Reference(reference), true) => compare_reference(f, lhs, Cmp::Ne, reference, None),
    }
}

/// `col IS NULL` / `col IS NOT NULL`
pub(super) fn is_null<P: Params>(f: &mut Formatter<'_, P>, field: &FieldSpec, negate: bool) {
    if negate {
        fmt!(f, Column(field) " IS NOT NULL");
    } else {
        fmt!(f, Column(field) " IS NULL");
    }
}

impl<'a> Operand<'a> {
    /// The comparison operand of `is`, `isNot` and the ordering operators.
    pub(super) fn rhs(self, field: &FieldSpec) -> Result<Rhs<'a>> {
        match self {
            Operand::Scalar(scalar) => Ok(Rhs::Value(coerce(field, scalar)?)),
            Operand::Reference(reference) => Ok(Rhs::Reference(reference)),
            operand => Err(Error::internal(format!(
                "expected a single value for field {:?}, got {operand:?}",
                field.name
            ))),
        }
    }

    pub(super) fn set(self, field: &FieldSpec) -> Result<Set<'a>> {
        match self {
            Operand::List(items) => Ok(Set::Values(
                items
                    .iter()
                    .map(|item| coerce(field, item))
                    .collect::<Result<_>>()?,
            )),
            Operand::Reference(reference) => Ok(Set::Reference(reference)),
            operand => Err(Error::internal(format!(
                "expected a list for field {:?}, got {operand:?}",
                field.name
            ))),
        }
    }

    /// The `%term%` pattern of `contains` and `doesNotContain`.
    pub(super) fn pattern(self, field: &FieldSpec) -> Result<Value> {
        match self.rhs(field)? {
            Rhs::Value(Value::String(term)) => Ok(Value::String(like_pattern(&term))),
            Rhs::Value(_) => Err(Error::invalid_literal(&field.name, "text")),
            Rhs::Reference(_) => Err(Error::literal_required(&field.name, Operator::Contains)),
        }
    }
}

/// Coerces a literal to the field's cell value type.
pub(super) fn coerce(field: &FieldSpec, scalar: &stmt::Scalar) -> Result<Value> {
    use stmt::Scalar::*;

    let value = match (field.cell_value_type, scalar) {
        (CellValueType::Boolean, Bool(value)) => Value::Bool(*value),
        (CellValueType::Boolean, String(value)) => match value.trim() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => return Err(Error::invalid_literal(&field.name, "boolean")),
        },
        (CellValueType::Number, Number(value)) => Value::F64(*value),
        (CellValueType::Number, String(value)) => match value.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => Value::F64(value),
            _ => return Err(Error::invalid_literal(&field.name, "number")),
        },
        (CellValueType::String, String(value)) => Value::String(value.clone()),
        (CellValueType::String, Number(value)) => Value::String(format_number(*value)),
        (CellValueType::String, Bool(value)) => Value::String(value.to_string()),
        (ty, _) => {
            return Err(Error::invalid_literal(
                &field.name,
                match ty {
                    CellValueType::Boolean => "boolean",
                    CellValueType::Number => "number",
                    CellValueType::DateTime => "date filter value",
                    CellValueType::String => "text",
                },
            ))
        }
    };

    Ok(value)
}

/// Integral numbers print without a fractional part.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridql_core::schema::FieldKind;

    #[test]
    fn numeric_strings_coerce_for_number_fields() {
        let field = FieldSpec::new("fld1", "Price", FieldKind::Number);
        assert_eq!(
            coerce(&field, &stmt::Scalar::String(" 12.5 ".into())).unwrap(),
            Value::F64(12.5)
        );

        let err = coerce(&field, &stmt::Scalar::String("twelve".into())).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn numbers_coerce_to_text() {
        let field = FieldSpec::new("fld1", "Code", FieldKind::Text);
        assert_eq!(
            coerce(&field, &stmt::Scalar::Number(42.0)).unwrap(),
            Value::String("42".into())
        );
        assert_eq!(
            coerce(&field, &stmt::Scalar::Number(4.5)).unwrap(),
            Value::String("4.5".into())
        );
    }
}

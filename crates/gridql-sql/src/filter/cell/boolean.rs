use super::{array, compare_reference, CellFilter, Cmp, Operand};
use crate::serializer::{Column, Formatter, Params, Scalar, ToSql};

use gridql_core::{schema::FieldSpec, stmt::Value, Error, Result};

/// Checkbox cells. Unchecked cells are stored as null, so null counts as
/// `false` everywhere.
#[derive(Debug)]
pub(crate) struct Boolean<'a>(pub(crate) &'a FieldSpec);

/// Arrays of booleans, as produced by lookups of checkbox fields.
#[derive(Debug)]
pub(crate) struct BooleanArray<'a>(pub(crate) &'a FieldSpec);

impl CellFilter for Boolean<'_> {
    fn name(&self) -> &'static str {
        "boolean"
    }

    fn is<P: Params>(&self, f: &mut Formatter<'_, P>, rhs: Operand<'_>) -> Result<()> {
        checked(f, self.0, rhs, true)
    }

    fn is_not<P: Params>(&self, f: &mut Formatter<'_, P>, rhs: Operand<'_>) -> Result<()> {
        checked(f, self.0, rhs, false)
    }

    fn is_empty<P: Params>(&self, f: &mut Formatter<'_, P>) -> Result<()> {
        super::is_null(f, self.0, false);
        Ok(())
    }

    fn is_not_empty<P: Params>(&self, f: &mut Formatter<'_, P>) -> Result<()> {
        super::is_null(f, self.0, true);
        Ok(())
    }
}

impl CellFilter for BooleanArray<'_> {
    fn name(&self) -> &'static str {
        "boolean array"
    }

    fn is<P: Params>(&self, f: &mut Formatter<'_, P>, rhs: Operand<'_>) -> Result<()> {
        match rhs {
            Operand::Reference(reference) => array::any(f, self.0, |f, elem| {
                compare_reference(f, elem, Cmp::Eq, reference, None);
                Ok(())
            }),
            rhs => {
                let value = Value::Bool(flag(self.0, rhs)?);
                array::any(f, self.0, |f, elem| {
                    fmt!(f, elem " = " value);
                    Ok(())
                })
            }
        }
    }

    fn is_not<P: Params>(&self, f: &mut Formatter<'_, P>, rhs: Operand<'_>) -> Result<()> {
        match rhs {
            Operand::Reference(reference) => array::none(f, self.0, |f, elem| {
                compare_reference(f, elem, Cmp::Eq, reference, None);
                Ok(())
            }),
            rhs => {
                let value = Value::Bool(flag(self.0, rhs)?);
                array::none(f, self.0, |f, elem| {
                    fmt!(f, elem " = " value);
                    Ok(())
                })
            }
        }
    }

    fn has_any_of<P: Params>(&self, f: &mut Formatter<'_, P>, rhs: Operand<'_>) -> Result<()> {
        array::intersects(f, self.0, &rhs.set(self.0)?)
    }

    fn has_none_of<P: Params>(&self, f: &mut Formatter<'_, P>, rhs: Operand<'_>) -> Result<()> {
        array::disjoint(f, self.0, &rhs.set(self.0)?)
    }

    fn is_empty<P: Params>(&self, f: &mut Formatter<'_, P>) -> Result<()> {
        super::is_null(f, self.0, false);
        Ok(())
    }

    fn is_not_empty<P: Params>(&self, f: &mut Formatter<'_, P>) -> Result<()> {
        super::is_null(f, self.0, true);
        Ok(())
    }
}

/// `is` (`expect = true`) or `isNot` against a literal or another field.
fn checked<P: Params>(
    f: &mut Formatter<'_, P>,
    field: &FieldSpec,
    rhs: Operand<'_>,
    expect: bool,
) -> Result<()> {
    let column = Column(field);

    if let Operand::Reference(reference) = rhs {
        let cmp = if expect { Cmp::Eq } else { Cmp::Ne };

        if reference.is_multiple() {
            compare_reference(f, column, cmp, reference, None);
        } else {
            fmt!(
                f,
                "COALESCE(" column ", FALSE)" cmp "COALESCE(" Scalar(reference) ", FALSE)"
            );
        }
        return Ok(());
    }

    // `isNot x` is `is !x`
    if flag(field, rhs)? == expect {
        fmt!(f, column " = " Value::Bool(true));
    } else {
        fmt!(f, "(" column " = " Value::Bool(false) " OR " column " IS NULL)");
    }

    Ok(())
}

/// The literal a boolean predicate compares against. Null means unchecked.
fn flag(field: &FieldSpec, rhs: Operand<'_>) -> Result<bool> {
    match rhs {
        Operand::Null => Ok(false),
        Operand::Scalar(_) => match rhs.rhs(field)? {
            super::Rhs::Value(Value::Bool(value)) => Ok(value),
            _ => Err(Error::invalid_literal(&field.name, "boolean")),
        },
        _ => Err(Error::invalid_literal(&field.name, "boolean")),
    }
}

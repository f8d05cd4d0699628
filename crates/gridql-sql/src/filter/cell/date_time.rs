use super::{array, compare_reference, CellFilter, Cmp, DateUnit, Operand};
use crate::serializer::{Column, Formatter, Params, ToSql, Zone};

use gridql_core::{
    err,
    schema::FieldSpec,
    stmt::{self, Value},
    DateRange, Error, Result,
};

/// Date and time cells, compared at the granularity the field displays.
#[derive(Debug)]
pub(crate) struct DateTime<'a>(pub(crate) &'a FieldSpec);

/// Arrays of dates, as produced by lookups of date fields.
#[derive(Debug)]
pub(crate) struct DateTimeArray<'a>(pub(crate) &'a FieldSpec);

/// What a date predicate compares against once resolved.
enum Bound<'a> {
    Range(DateRange),

    /// Another date field, both sides truncated in this field's zone.
    Reference(&'a FieldSpec, Zone),
}

/// How a predicate uses the resolved range.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Test {
    Within,
    After,
    OnOrAfter,
    Before,
    OnOrBefore,
}

impl Test {
    /// The comparison used against another date field.
    fn cmp(self) -> Cmp {
        match self {
            Test::Within => Cmp::Eq,
            Test::After => Cmp::Gt,
            Test::OnOrAfter => Cmp::Ge,
            Test::Before => Cmp::Lt,
            Test::OnOrBefore => Cmp::Le,
        }
    }

    fn write<P: Params, E: ToSql + Copy>(self, f: &mut Formatter<'_, P>, expr: E, range: &DateRange) {
        let start = Value::Timestamp(range.start);
        let end = Value::Timestamp(range.end);

        match self {
            Test::Within => fmt!(f, expr " BETWEEN " start " AND " end),
            Test::After => fmt!(f, expr " > " end),
            Test::OnOrAfter => fmt!(f, expr " >= " start),
            Test::Before => fmt!(f, expr " < " start),
            Test::OnOrBefore => fmt!(f, expr " <= " end),
        }
    }
}

/// Writes `test` for one side of a predicate.
fn write<P: Params, E: ToSql + Copy>(
    f: &mut Formatter<'_, P>,
    field: &FieldSpec,
    expr: E,
    test: Test,
    bound: &Bound<'_>,
) {
    match bound {
        Bound::Range(range) => test.write(f, expr, range),
        Bound::Reference(reference, zone) => {
            let unit = DateUnit {
                unit: field.options.date_granularity(),
                zone,
            };
            compare_reference(f, expr, test.cmp(), reference, Some(unit));
        }
    }
}

/// Resolves the operand of a date predicate.
fn bound<'a>(field: &FieldSpec, rhs: Operand<'a>, now: jiff::Timestamp) -> Result<Bound<'a>> {
    match rhs {
        Operand::Scalar(stmt::Scalar::Date(value)) => {
            let range = DateRange::resolve_at(value, &field.options.date, now)
                .map_err(|e| e.context(err!("filter on field {:?}", field.name)))?;
            Ok(Bound::Range(range))
        }
        Operand::Reference(reference) => Ok(Bound::Reference(reference, Zone::of(field, now)?)),
        _ => Err(Error::invalid_literal(&field.name, "date filter value")),
    }
}

impl DateTime<'_> {
    fn test<P: Params>(&self, f: &mut Formatter<'_, P>, test: Test, rhs: Operand<'_>) -> Result<()> {
        let bound = bound(self.0, rhs, f.now)?;
        write(f, self.0, Column(self.0), test, &bound);
        Ok(())
    }
}

impl CellFilter for DateTime<'_> {
    fn name(&self) -> &'static str {
        "date"
    }

    fn is<P: Params>(&self, f: &mut Formatter<'_, P>, rhs: Operand<'_>) -> Result<()> {
        self.test(f, Test::Within, rhs)
    }

    fn is_not<P: Params>(&self, f: &mut Formatter<'_, P>, rhs: Operand<'_>) -> Result<()> {
        let column = Column(self.0);

        match bound(self.0, rhs, f.now)? {
            Bound::Range(range) => {
                let start = Value::Timestamp(range.start);
                let end = Value::Timestamp(range.end);
                fmt!(
                    f,
                    "(" column " NOT BETWEEN " start " AND " end " OR " column " IS NULL)"
                );
            }
            Bound::Reference(reference, zone) => {
                let unit = DateUnit {
                    unit: self.0.options.date_granularity(),
                    zone: &zone,
                };
                compare_reference(f, column, Cmp::Ne, reference, Some(unit));
            }
        }

        Ok(())
    }

    fn is_within<P: Params>(&self, f: &mut Formatter<'_, P>, rhs: Operand<'_>) -> Result<()> {
        self.test(f, Test::Within, rhs)
    }

    fn is_after<P: Params>(&self, f: &mut Formatter<'_, P>, rhs: Operand<'_>) -> Result<()> {
        self.test(f, Test::After, rhs)
    }

    fn is_on_or_after<P: Params>(&self, f: &mut Formatter<'_, P>, rhs: Operand<'_>) -> Result<()> {
        self.test(f, Test::OnOrAfter, rhs)
    }

    fn is_before<P: Params>(&self, f: &mut Formatter<'_, P>, rhs: Operand<'_>) -> Result<()> {
        self.test(f, Test::Before, rhs)
    }

    fn is_on_or_before<P: Params>(
        &self,
        f: &mut Formatter<'_, P>,
        rhs: Operand<'_>,
    ) -> Result<()> {
        self.test(f, Test::OnOrBefore, rhs)
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

impl DateTimeArray<'_> {
    /// Some element passes the test, or with `negate`, none passes.
    fn test<P: Params>(
        &self,
        f: &mut Formatter<'_, P>,
        test: Test,
        rhs: Operand<'_>,
        negate: bool,
    ) -> Result<()> {
        let bound = bound(self.0, rhs, f.now)?;
        let field = self.0;

        if negate {
            array::none(f, field, |f, elem| {
                write(f, field, elem, test, &bound);
                Ok(())
            })
        } else {
            array::any(f, field, |f, elem| {
                write(f, field, elem, test, &bound);
                Ok(())
            })
        }
    }
}

impl CellFilter for DateTimeArray<'_> {
    fn name(&self) -> &'static str {
        "date array"
    }

    fn is<P: Params>(&self, f: &mut Formatter<'_, P>, rhs: Operand<'_>) -> Result<()> {
        self.test(f, Test::Within, rhs, false)
    }

    fn is_not<P: Params>(&self, f: &mut Formatter<'_, P>, rhs: Operand<'_>) -> Result<()> {
        self.test(f, Test::Within, rhs, true)
    }

    fn is_within<P: Params>(&self, f: &mut Formatter<'_, P>, rhs: Operand<'_>) -> Result<()> {
        self.test(f, Test::Within, rhs, false)
    }

    fn is_after<P: Params>(&self, f: &mut Formatter<'_, P>, rhs: Operand<'_>) -> Result<()> {
        self.test(f, Test::After, rhs, false)
    }

    fn is_on_or_after<P: Params>(&self, f: &mut Formatter<'_, P>, rhs: Operand<'_>) -> Result<()> {
        self.test(f, Test::OnOrAfter, rhs, false)
    }

    fn is_before<P: Params>(&self, f: &mut Formatter<'_, P>, rhs: Operand<'_>) -> Result<()> {
        self.test(f, Test::Before, rhs, false)
    }

    fn is_on_or_before<P: Params>(
        &self,
        f: &mut Formatter<'_, P>,
        rhs: Operand<'_>,
    ) -> Result<()> {
        self.test(f, Test::OnOrBefore, rhs, false)
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

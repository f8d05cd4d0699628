use super::{array, compare, member_of, CellFilter, Cmp, Operand};
use crate::serializer::{Formatter, Params, Scalar};

use gridql_core::{schema::FieldSpec, Result};

#[derive(Debug)]
pub(crate) struct Number<'a>(pub(crate) &'a FieldSpec);

/// Arrays of numbers, as produced by lookups and rollups.
#[derive(Debug)]
pub(crate) struct NumberArray<'a>(pub(crate) &'a FieldSpec);

impl Number<'_> {
    fn compare<P: Params>(&self, f: &mut Formatter<'_, P>, cmp: Cmp, rhs: Operand<'_>) -> Result<()> {
        let rhs = rhs.rhs(self.0)?;
        compare(f, Scalar(self.0), cmp, &rhs);
        Ok(())
    }
}

impl CellFilter for Number<'_> {
    fn name(&self) -> &'static str {
        "number"
    }

    fn is<P: Params>(&self, f: &mut Formatter<'_, P>, rhs: Operand<'_>) -> Result<()> {
        self.compare(f, Cmp::Eq, rhs)
    }

    fn is_not<P: Params>(&self, f: &mut Formatter<'_, P>, rhs: Operand<'_>) -> Result<()> {
        self.compare(f, Cmp::Ne, rhs)
    }

    fn is_greater<P: Params>(&self, f: &mut Formatter<'_, P>, rhs: Operand<'_>) -> Result<()> {
        self.compare(f, Cmp::Gt, rhs)
    }

    fn is_greater_equal<P: Params>(
        &self,
        f: &mut Formatter<'_, P>,
        rhs: Operand<'_>,
    ) -> Result<()> {
        self.compare(f, Cmp::Ge, rhs)
    }

    fn is_less<P: Params>(&self, f: &mut Formatter<'_, P>, rhs: Operand<'_>) -> Result<()> {
        self.compare(f, Cmp::Lt, rhs)
    }

    fn is_less_equal<P: Params>(&self, f: &mut Formatter<'_, P>, rhs: Operand<'_>) -> Result<()> {
        self.compare(f, Cmp::Le, rhs)
    }

    fn is_any_of<P: Params>(&self, f: &mut Formatter<'_, P>, rhs: Operand<'_>) -> Result<()> {
        member_of(f, Scalar(self.0), &rhs.set(self.0)?, false);
        Ok(())
    }

    fn is_none_of<P: Params>(&self, f: &mut Formatter<'_, P>, rhs: Operand<'_>) -> Result<()> {
        member_of(f, Scalar(self.0), &rhs.set(self.0)?, true);
        Ok(())
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

impl CellFilter for NumberArray<'_> {
    fn name(&self) -> &'static str {
        "number array"
    }

    fn is<P: Params>(&self, f: &mut Formatter<'_, P>, rhs: Operand<'_>) -> Result<()> {
        array::any_compare(f, self.0, Cmp::Eq, rhs)
    }

    fn is_not<P: Params>(&self, f: &mut Formatter<'_, P>, rhs: Operand<'_>) -> Result<()> {
        array::none_equal(f, self.0, rhs)
    }

    fn is_greater<P: Params>(&self, f: &mut Formatter<'_, P>, rhs: Operand<'_>) -> Result<()> {
        array::any_compare(f, self.0, Cmp::Gt, rhs)
    }

    fn is_greater_equal<P: Params>(
        &self,
        f: &mut Formatter<'_, P>,
        rhs: Operand<'_>,
    ) -> Result<()> {
        array::any_compare(f, self.0, Cmp::Ge, rhs)
    }

    fn is_less<P: Params>(&self, f: &mut Formatter<'_, P>, rhs: Operand<'_>) -> Result<()> {
        array::any_compare(f, self.0, Cmp::Lt, rhs)
    }

    fn is_less_equal<P: Params>(&self, f: &mut Formatter<'_, P>, rhs: Operand<'_>) -> Result<()> {
        array::any_compare(f, self.0, Cmp::Le, rhs)
    }

    fn is_any_of<P: Params>(&self, f: &mut Formatter<'_, P>, rhs: Operand<'_>) -> Result<()> {
        array::intersects(f, self.0, &rhs.set(self.0)?)
    }

    fn is_none_of<P: Params>(&self, f: &mut Formatter<'_, P>, rhs: Operand<'_>) -> Result<()> {
        array::disjoint(f, self.0, &rhs.set(self.0)?)
    }

    fn has_any_of<P: Params>(&self, f: &mut Formatter<'_, P>, rhs: Operand<'_>) -> Result<()> {
        array::intersects(f, self.0, &rhs.set(self.0)?)
    }

    fn has_all_of<P: Params>(&self, f: &mut Formatter<'_, P>, rhs: Operand<'_>) -> Result<()> {
        array::contains_all(f, self.0, &rhs.set(self.0)?)
    }

    fn has_none_of<P: Params>(&self, f: &mut Formatter<'_, P>, rhs: Operand<'_>) -> Result<()> {
        array::disjoint(f, self.0, &rhs.set(self.0)?)
    }

    fn is_exactly<P: Params>(&self, f: &mut Formatter<'_, P>, rhs: Operand<'_>) -> Result<()> {
        array::equals(f, self.0, &rhs.set(self.0)?, false)
    }

    fn is_not_exactly<P: Params>(
        &self,
        f: &mut Formatter<'_, P>,
        rhs: Operand<'_>,
    ) -> Result<()> {
        array::equals(f, self.0, &rhs.set(self.0)?, true)
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

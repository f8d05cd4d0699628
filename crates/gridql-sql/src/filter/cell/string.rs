use super::{array, compare, member_of, CellFilter, Cmp, Operand};
use crate::serializer::{Column, Formatter, Like, Params, Scalar, Title, ToSql, ESCAPE};

use gridql_core::{schema::FieldSpec, Result};

/// Text cells, and structured cells (users, links) compared by key.
#[derive(Debug)]
pub(crate) struct Text<'a>(pub(crate) &'a FieldSpec);

/// Arrays of text or of structured objects: multiple selects, links,
/// attachments.
#[derive(Debug)]
pub(crate) struct TextArray<'a>(pub(crate) &'a FieldSpec);

impl Text<'_> {
    fn compare<P: Params>(&self, f: &mut Formatter<'_, P>, cmp: Cmp, rhs: Operand<'_>) -> Result<()> {
        let rhs = rhs.rhs(self.0)?;
        compare(f, Scalar(self.0), cmp, &rhs);
        Ok(())
    }
}

impl CellFilter for Text<'_> {
    fn name(&self) -> &'static str {
        "string"
    }

    fn is<P: Params>(&self, f: &mut Formatter<'_, P>, rhs: Operand<'_>) -> Result<()> {
        self.compare(f, Cmp::Eq, rhs)
    }

    fn is_not<P: Params>(&self, f: &mut Formatter<'_, P>, rhs: Operand<'_>) -> Result<()> {
        self.compare(f, Cmp::Ne, rhs)
    }

    fn contains<P: Params>(&self, f: &mut Formatter<'_, P>, rhs: Operand<'_>) -> Result<()> {
        let pattern = rhs.pattern(self.0)?;
        fmt!(f, Title(self.0) Like { negate: false } pattern ESCAPE);
        Ok(())
    }

    fn does_not_contain<P: Params>(
        &self,
        f: &mut Formatter<'_, P>,
        rhs: Operand<'_>,
    ) -> Result<()> {
        let pattern = rhs.pattern(self.0)?;
        let lhs = Title(self.0);
        fmt!(f, "(" lhs Like { negate: true } pattern ESCAPE " OR " lhs " IS NULL)");
        Ok(())
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
        let column = Column(self.0);
        if self.0.is_plain_text() {
            fmt!(f, "(" column " IS NULL OR " column " = '')");
        } else {
            super::is_null(f, self.0, false);
        }
        Ok(())
    }

    fn is_not_empty<P: Params>(&self, f: &mut Formatter<'_, P>) -> Result<()> {
        let column = Column(self.0);
        if self.0.is_plain_text() {
            fmt!(f, "(" column " IS NOT NULL AND " column " <> '')");
        } else {
            super::is_null(f, self.0, true);
        }
        Ok(())
    }
}

impl CellFilter for TextArray<'_> {
    fn name(&self) -> &'static str {
        "string array"
    }

    fn is<P: Params>(&self, f: &mut Formatter<'_, P>, rhs: Operand<'_>) -> Result<()> {
        array::any_compare(f, self.0, Cmp::Eq, rhs)
    }

    fn is_not<P: Params>(&self, f: &mut Formatter<'_, P>, rhs: Operand<'_>) -> Result<()> {
        array::none_equal(f, self.0, rhs)
    }

    fn contains<P: Params>(&self, f: &mut Formatter<'_, P>, rhs: Operand<'_>) -> Result<()> {
        let pattern = rhs.pattern(self.0)?;
        array::any(f, self.0, |f, elem| {
            fmt!(f, elem.title() Like { negate: false } pattern ESCAPE);
            Ok(())
        })
    }

    fn does_not_contain<P: Params>(
        &self,
        f: &mut Formatter<'_, P>,
        rhs: Operand<'_>,
    ) -> Result<()> {
        let pattern = rhs.pattern(self.0)?;
        array::none(f, self.0, |f, elem| {
            fmt!(f, elem.title() Like { negate: false } pattern ESCAPE);
            Ok(())
        })
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

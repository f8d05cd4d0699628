//! Filter trees to `WHERE` fragments.
//!
//! Compilation runs in three steps. The tree is normalized into a copy with
//! every predicate that cannot apply removed. Each remaining predicate is
//! validated against its field, which settles the operator spelling and the
//! operand. Finally the predicate is written by the adapter for the field's
//! cell value type and multiplicity.

mod cell;
use cell::Cell;

mod normalize;
use normalize::CurrentUser;

mod validate;

use crate::serializer::{CompiledExpression, Formatter, Params, Serializer, ToSql};

use gridql_core::{
    schema::FieldLookup,
    stmt::{Conjunction, FilterNode, Predicate},
    Error, Result,
};
use jiff::Timestamp;
use tracing::debug;

/// Compiles filter trees for one serializer.
///
/// ```ignore
/// let filter = serializer
///     .filter()
///     .current_user("usr42")
///     .compile(&tree)?;
/// ```
pub struct FilterCompiler<'a> {
    serializer: &'a Serializer<'a>,

    /// Fields references resolve against. Defaults to the serializer's
    /// fields.
    references: Option<&'a dyn FieldLookup>,

    /// Id substituted for the current-user placeholder in people filters
    current_user: Option<&'a str>,

    now: Option<Timestamp>,
}

impl<'a> FilterCompiler<'a> {
    pub(crate) fn new(serializer: &'a Serializer<'a>) -> FilterCompiler<'a> {
        FilterCompiler {
            serializer,
            references: None,
            current_user: None,
            now: None,
        }
    }

    /// Resolve field references against another catalog, for example the
    /// fields of a joined table.
    pub fn references(mut self, references: &'a dyn FieldLookup) -> Self {
        self.references = Some(references);
        self
    }

    pub fn current_user(mut self, user_id: &'a str) -> Self {
        self.current_user = Some(user_id);
        self
    }

    /// Evaluate relative date modes at `now` instead of the current time.
    pub fn now(mut self, now: Timestamp) -> Self {
        self.now = Some(now);
        self
    }

    /// Compiles a filter tree.
    ///
    /// Returns `None` when nothing is left of the tree once predicates on
    /// unknown fields and predicates without a value are removed.
    pub fn compile(&self, filter: &FilterNode) -> Result<Option<CompiledExpression>> {
        let fields = self.serializer.fields();
        let current_user = self.current_user.map(|id| CurrentUser {
            placeholder: &self.serializer.options().current_user_placeholder,
            id,
        });

        let Some(filter) = normalize::normalize(filter, fields, current_user) else {
            return Ok(None);
        };

        let references = self.references.unwrap_or(fields);
        let now = self.now.unwrap_or_else(Timestamp::now);

        let expr = self
            .serializer
            .render(now, |f| write_node(f, &filter, references))?;

        debug!(
            flavor = %self.serializer.flavor,
            sql = %expr.sql,
            params = expr.params.len(),
            "compiled filter"
        );

        Ok(Some(expr))
    }
}

fn write_node<P: Params>(
    f: &mut Formatter<'_, P>,
    node: &FilterNode,
    references: &dyn FieldLookup,
) -> Result<()> {
    match node {
        FilterNode::Group(group) => {
            if let [child] = &group.children[..] {
                return write_node(f, child, references);
            }

            let separator = match group.conjunction {
                Conjunction::And => " AND ",
                Conjunction::Or => " OR ",
            };

            fmt!(f, "(");
            for (i, child) in group.children.iter().enumerate() {
                if i > 0 {
                    fmt!(f, separator);
                }
                write_node(f, child, references)?;
            }
            fmt!(f, ")");

            Ok(())
        }
        FilterNode::Predicate(predicate) => write_predicate(f, predicate, references),
    }
}

fn write_predicate<P: Params>(
    f: &mut Formatter<'_, P>,
    predicate: &Predicate,
    references: &dyn FieldLookup,
) -> Result<()> {
    // Normalization removed predicates on unknown fields
    let Some(field) = f.serializer.fields().field(&predicate.field_id) else {
        return Err(Error::internal(format!(
            "field {} vanished after normalization",
            predicate.field_id
        )));
    };

    field.validate()?;

    let (operator, operand) = validate::validate(predicate, field, references)?;
    Cell::of(field).filter(f, operator, operand)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridql_core::{
        schema::{FieldKind, FieldSpec},
        stmt::{FilterValue, Operator, Value},
    };
    use pretty_assertions::assert_eq;

    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("fldTitle", "Title", FieldKind::Text).db_field_name("title"),
            FieldSpec::new("fldPrice", "Price", FieldKind::Number).db_field_name("price"),
            FieldSpec::new("fldDone", "Done", FieldKind::Checkbox).db_field_name("done"),
        ]
    }

    #[test]
    fn single_child_groups_have_no_parentheses() {
        let fields = fields();
        let serializer = Serializer::sqlite(&fields);

        let expr = serializer
            .filter()
            .compile(&FilterNode::and([FilterNode::predicate(
                "fldPrice",
                Operator::IsGreater,
                10,
            )]))
            .unwrap()
            .unwrap();

        assert_eq!(expr.sql, r#""price" > ?"#);
        assert_eq!(expr.params, [Value::F64(10.0)]);
    }

    #[test]
    fn params_follow_the_text_depth_first() {
        let fields = fields();
        let serializer = Serializer::postgresql(&fields);

        let expr = serializer
            .filter()
            .compile(&FilterNode::or([
                FilterNode::predicate("fldTitle", Operator::Is, "a"),
                FilterNode::and([
                    FilterNode::predicate("fldPrice", Operator::IsAnyOf, FilterValue::list([1, 2])),
                    FilterNode::predicate("fldDone", Operator::Is, true),
                ]),
            ]))
            .unwrap()
            .unwrap();

        assert_eq!(
            expr.sql,
            r#"("title" = ? OR ("price" IN (?, ?) AND "done" = ?))"#
        );
        assert_eq!(
            expr.params,
            [
                Value::String("a".into()),
                Value::F64(1.0),
                Value::F64(2.0),
                Value::Bool(true),
            ]
        );
    }

    #[test]
    fn nothing_left_compiles_to_none() {
        let fields = fields();
        let serializer = Serializer::sqlite(&fields);

        let compiled = serializer
            .filter()
            .compile(&FilterNode::and([
                FilterNode::predicate("fldGone", Operator::Is, 1),
                FilterNode::predicate("fldTitle", Operator::Is, FilterValue::null()),
            ]))
            .unwrap();

        assert_eq!(compiled, None);
    }

    #[test]
    fn invalid_field_specs_are_rejected() {
        let fields = vec![FieldSpec::new("fldTitle", "Title", FieldKind::Text).db_field_name("")];
        let serializer = Serializer::sqlite(&fields);

        let err = serializer
            .filter()
            .compile(&FilterNode::predicate("fldTitle", Operator::Is, "x"))
            .unwrap_err();
        assert!(err.is_validation());
    }
}

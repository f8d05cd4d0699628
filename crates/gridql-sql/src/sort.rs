use crate::serializer::{
    Column, CompiledExpression, Flavor, Formatter, Ident, JsonText, Params, Quoted, Serializer,
    ToSql,
};

use gridql_core::{
    schema::{CellValueType, FieldSpec},
    stmt::{Direction, SortSpec},
    Result,
};
use jiff::Timestamp;
use tracing::{debug, trace};

/// Compiles sort specifications to `ORDER BY` bodies.
pub struct SortCompiler<'a> {
    serializer: &'a Serializer<'a>,
}

/// The value a field sorts by.
///
/// Structured cells sort by title. Multi-valued cells sort by their first
/// element.
#[derive(Debug, Copy, Clone)]
struct SortKey<'a>(&'a FieldSpec);

struct Term<'a> {
    key: SortKey<'a>,
    direction: Direction,
}

impl<'a> SortCompiler<'a> {
    pub(crate) fn new(serializer: &'a Serializer<'a>) -> SortCompiler<'a> {
        SortCompiler { serializer }
    }

    /// Compiles `spec` to a comma separated list of sort terms.
    ///
    /// Unknown fields are skipped. The configured tie-break column always
    /// ends the list, so the result is never empty.
    pub fn compile(&self, spec: &SortSpec) -> Result<CompiledExpression> {
        let fields = self.serializer.fields();
        let mut terms = vec![];

        for item in spec.iter() {
            let Some(field) = fields.field(&item.field_id) else {
                trace!(field_id = %item.field_id, "skipping sort on unknown field");
                continue;
            };

            field.validate()?;
            terms.push(Term {
                key: SortKey(field),
                direction: item.direction,
            });
        }

        let tie_break = &self.serializer.options().tie_break_column;

        let expr = self.serializer.render(Timestamp::now(), |f| {
            for term in terms {
                fmt!(f, term ", ");
            }
            fmt!(f, Ident(tie_break) " ASC");
            Ok(())
        })?;

        debug!(flavor = %self.serializer.flavor, sql = %expr.sql, "compiled sort");
        Ok(expr)
    }
}

impl ToSql for Term<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let direction = match self.direction {
            Direction::Asc => " ASC NULLS FIRST",
            Direction::Desc => " DESC NULLS LAST",
        };
        fmt!(f, self.key direction);
    }
}

impl ToSql for SortKey<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let field = self.0;
        let column = Column(field);

        match (field.is_multiple(), f.serializer.flavor) {
            (false, _) if field.structured => fmt!(f, JsonText { json: column, key: "title" }),
            (false, _) => fmt!(f, column),
            (true, Flavor::Postgresql) if field.structured => {
                fmt!(f, column "->0->>'title'")
            }
            (true, Flavor::Postgresql) => {
                let cast = match field.cell_value_type {
                    CellValueType::String => "",
                    CellValueType::Number => "::double precision",
                    CellValueType::DateTime => "::timestamptz",
                    CellValueType::Boolean => "::boolean",
                };
                fmt!(f, "(" column "->>0)" cast)
            }
            (true, Flavor::Sqlite) => {
                let path = if field.structured {
                    "$[0].title"
                } else {
                    "$[0]"
                };
                fmt!(f, "json_extract(" column ", " Quoted(path) ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridql_core::{schema::FieldKind, CompileOptions};
    use pretty_assertions::assert_eq;

    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("fldTitle", "Title", FieldKind::Text).db_field_name("title"),
            FieldSpec::new("fldOwner", "Owner", FieldKind::User).db_field_name("owner"),
            FieldSpec::new("fldScores", "Scores", FieldKind::Rollup)
                .db_field_name("scores")
                .cell_value_type(CellValueType::Number)
                .multiple(),
        ]
    }

    #[test]
    fn empty_spec_sorts_by_tie_break_only() {
        let fields = fields();
        let serializer = Serializer::sqlite(&fields);

        let expr = serializer.sort().compile(&SortSpec::new()).unwrap();
        assert_eq!(expr.sql, r#""__auto_number" ASC"#);
        assert!(expr.params.is_empty());
    }

    #[test]
    fn structured_and_multiple_keys() {
        let fields = fields();
        let spec = SortSpec::new()
            .desc("fldOwner")
            .asc("fldScores")
            .asc("fldMissing")
            .asc("fldTitle");

        let pg = Serializer::postgresql(&fields).sort().compile(&spec).unwrap();
        assert_eq!(
            pg.sql,
            r#""owner"->>'title' DESC NULLS LAST, ("scores"->>0)::double precision ASC NULLS FIRST, "title" ASC NULLS FIRST, "__auto_number" ASC"#
        );

        let sqlite = Serializer::sqlite(&fields).sort().compile(&spec).unwrap();
        assert_eq!(
            sqlite.sql,
            r#"json_extract("owner", '$.title') DESC NULLS LAST, json_extract("scores", '$[0]') ASC NULLS FIRST, "title" ASC NULLS FIRST, "__auto_number" ASC"#
        );
    }

    #[test]
    fn tie_break_column_is_configurable() {
        let fields = fields();
        let serializer = Serializer::postgresql(&fields).with_options(CompileOptions {
            tie_break_column: "__row_seq".to_string(),
            ..CompileOptions::default()
        });

        let expr = serializer
            .sort()
            .compile(&SortSpec::new().asc("fldTitle"))
            .unwrap();
        assert_eq!(expr.sql, r#""title" ASC NULLS FIRST, "__row_seq" ASC"#);
    }
}

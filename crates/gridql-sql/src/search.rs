//! Free-text search predicates.
//!
//! Every field has one searchable text expression: what the user sees in the
//! cell, flattened to a single string. A search matches that text against the
//! term. The index planner builds its trigram indexes over the same
//! expressions.

use crate::serializer::{
    like_pattern, Column, CompiledExpression, DateText, Flavor, Formatter, JsonText, Like,
    Params, Quoted, Serializer, Title, ToSql, Zone, ESCAPE,
};

use gridql_core::{
    schema::{CellValueType, FieldId, FieldSpec},
    stmt::{SearchScope, SearchSpec, Value},
    Result,
};
use jiff::Timestamp;
use tracing::{debug, trace};

/// What PostgreSQL prints between the elements of a jsonb array.
const JSONB_SEPARATOR: &str = ", ";

pub struct SearchCompiler<'a> {
    serializer: &'a Serializer<'a>,
    now: Option<Timestamp>,
}

/// A compiled search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    /// Matches rows where any searched field matches.
    pub predicate: CompiledExpression,

    /// Per searched field, `CASE WHEN <match> THEN '<column>' END`, telling
    /// which fields of a row matched.
    pub projections: Vec<(FieldId, CompiledExpression)>,
}

/// The display text of a field, as one string.
#[derive(Debug, Copy, Clone)]
pub(crate) struct SearchText<'a> {
    pub(crate) field: &'a FieldSpec,
    pub(crate) zone: &'a Zone,
}

/// `text` matches the term.
#[derive(Debug, Copy, Clone)]
struct Match<'a> {
    text: SearchText<'a>,
    term: &'a str,
    case_sensitive: bool,
}

impl<'a> SearchCompiler<'a> {
    pub(crate) fn new(serializer: &'a Serializer<'a>) -> SearchCompiler<'a> {
        SearchCompiler {
            serializer,
            now: None,
        }
    }

    /// The instant dates are rendered at, for engines that shift by a fixed
    /// zone offset.
    pub fn now(mut self, now: Timestamp) -> Self {
        self.now = Some(now);
        self
    }

    /// Case-insensitive match of one field against `term`.
    ///
    /// Returns `None` for blank terms, and for checkbox and date fields when
    /// searching all fields.
    pub fn field(
        &self,
        term: &str,
        field: &FieldSpec,
        scope: &SearchScope,
    ) -> Result<Option<CompiledExpression>> {
        let term = term.trim();
        if term.is_empty() || !searchable(field, scope) {
            return Ok(None);
        }

        field.validate()?;
        let now = self.instant();
        let zone = Zone::of(field, now)?;
        let m = Match {
            text: SearchText { field, zone: &zone },
            term,
            case_sensitive: false,
        };

        self.serializer
            .render(now, |f| {
                fmt!(f, m);
                Ok(())
            })
            .map(Some)
    }

    /// Compiles a search request.
    ///
    /// Returns `None` when the term is blank or no field in scope can be
    /// searched.
    pub fn compile(&self, spec: &SearchSpec) -> Result<Option<SearchQuery>> {
        let term = spec.term.trim();
        if term.is_empty() {
            return Ok(None);
        }

        let fields: Vec<&FieldSpec> = match &spec.scope {
            SearchScope::AllFields => self
                .serializer
                .fields()
                .fields()
                .filter(|field| searchable(field, &spec.scope))
                .collect(),
            SearchScope::SingleField(field_id) => match self.serializer.fields().field(field_id) {
                Some(field) => vec![field],
                None => {
                    trace!(%field_id, "search on unknown field");
                    vec![]
                }
            },
        };

        if fields.is_empty() {
            return Ok(None);
        }

        let now = self.instant();
        let mut zones = Vec::with_capacity(fields.len());
        for field in &fields {
            field.validate()?;
            zones.push(Zone::of(field, now)?);
        }

        let matches: Vec<Match<'_>> = fields
            .iter()
            .zip(&zones)
            .map(|(&field, zone)| Match {
                text: SearchText { field, zone },
                term,
                case_sensitive: spec.case_sensitive,
            })
            .collect();

        let predicate = self.serializer.render(now, |f| {
            if matches.len() > 1 {
                fmt!(f, "(");
            }
            for (i, &m) in matches.iter().enumerate() {
                if i > 0 {
                    fmt!(f, " OR ");
                }
                fmt!(f, m);
            }
            if matches.len() > 1 {
                fmt!(f, ")");
            }
            Ok(())
        })?;

        let mut projections = Vec::with_capacity(matches.len());
        for &m in &matches {
            let field = m.text.field;
            let projection = self.serializer.render(now, |f| {
                fmt!(f, "CASE WHEN " m " THEN " Quoted(&field.db_field_name) " END");
                Ok(())
            })?;
            projections.push((field.id.clone(), projection));
        }

        debug!(
            flavor = %self.serializer.flavor,
            sql = %predicate.sql,
            fields = matches.len(),
            "compiled search"
        );

        Ok(Some(SearchQuery {
            predicate,
            projections,
        }))
    }

    fn instant(&self) -> Timestamp {
        self.now.unwrap_or_else(Timestamp::now)
    }
}

/// Checkbox and date fields are only searched when asked for by name.
fn searchable(field: &FieldSpec, scope: &SearchScope) -> bool {
    match scope {
        SearchScope::SingleField(_) => true,
        SearchScope::AllFields => !matches!(
            field.cell_value_type,
            CellValueType::Boolean | CellValueType::DateTime
        ),
    }
}

impl ToSql for Match<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let text = self.text;

        if self.case_sensitive {
            let term = Value::String(self.term.to_string());
            match f.serializer.flavor {
                Flavor::Postgresql => fmt!(f, "strpos(" text ", " term ") > 0"),
                Flavor::Sqlite => fmt!(f, "instr(" text ", " term ") > 0"),
            }
        } else {
            let pattern = Value::String(like_pattern(self.term));
            fmt!(f, text Like { negate: false } pattern ESCAPE);
        }
    }
}

/// The stored JSON array as text: titles only for structured cells.
#[derive(Debug, Copy, Clone)]
struct JsonArray<'a>(&'a FieldSpec);

impl ToSql for JsonArray<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let column = Column(self.0);
        if self.0.structured {
            fmt!(f, "jsonb_path_query_array(" column ", '$[*].title')::text");
        } else {
            fmt!(f, column "::text");
        }
    }
}

impl ToSql for SearchText<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let SearchText { field, zone } = self;
        let column = Column(field);
        let precision = field.options.number.precision;
        let with_time = field.options.date.has_time();

        if field.is_multiple() {
            let serializer = f.serializer;
            let separator = Quoted(&serializer.options().search_separator);

            match f.serializer.flavor {
                // Trigram indexes hold this same expression, and index
                // expressions cannot contain subqueries. jsonb prints arrays
                // as `["a", "b"]`, so dropping brackets and quotes leaves the
                // elements joined by ", ".
                Flavor::Postgresql => {
                    let json = JsonArray(field);
                    if serializer.options().search_separator == JSONB_SEPARATOR {
                        fmt!(f, "translate(" json ", '[]\"', '')");
                    } else {
                        fmt!(
                            f,
                            "replace(translate(" json ", '[]\"', ''), "
                            Quoted(JSONB_SEPARATOR) ", " separator ")"
                        );
                    }
                }
                Flavor::Sqlite => {
                    fmt!(f, "(SELECT group_concat(");
                    match field.cell_value_type {
                        CellValueType::String if field.structured => {
                            fmt!(f, JsonText { json: "x.value", key: "title" })
                        }
                        CellValueType::Number => {
                            fmt!(f, "CAST(ROUND(x.value, " precision ") AS TEXT)")
                        }
                        CellValueType::DateTime => {
                            fmt!(f, DateText { expr: "x.value", with_time, zone })
                        }
                        CellValueType::Boolean => {
                            fmt!(f, "CASE WHEN x.value THEN 'true' ELSE 'false' END")
                        }
                        CellValueType::String => fmt!(f, "x.value"),
                    }
                    fmt!(f, ", " separator ") FROM json_each(" column ") AS x)");
                }
            }
            return;
        }

        match field.cell_value_type {
            CellValueType::String if field.structured => fmt!(f, Title(field)),
            CellValueType::String if field.is_long_text() => {
                let chr = match f.serializer.flavor {
                    Flavor::Postgresql => "CHR",
                    Flavor::Sqlite => "char",
                };
                fmt!(
                    f,
                    "REPLACE(REPLACE(" column ", " chr "(13), ' '), " chr "(10), ' ')"
                );
            }
            CellValueType::String => fmt!(f, column),
            CellValueType::Number => match f.serializer.flavor {
                Flavor::Postgresql => {
                    fmt!(f, "ROUND(" column "::numeric, " precision ")::text")
                }
                Flavor::Sqlite => fmt!(f, "CAST(ROUND(" column ", " precision ") AS TEXT)"),
            },
            CellValueType::DateTime => fmt!(f, DateText { expr: column, with_time, zone }),
            CellValueType::Boolean => {
                fmt!(f, "CASE WHEN " column " THEN 'true' ELSE 'false' END")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridql_core::schema::FieldKind;
    use pretty_assertions::assert_eq;

    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("fldNotes", "Notes", FieldKind::LongText).db_field_name("notes"),
            FieldSpec::new("fldPrice", "Price", FieldKind::Number).db_field_name("price"),
            FieldSpec::new("fldDone", "Done", FieldKind::Checkbox).db_field_name("done"),
        ]
    }

    #[test]
    fn blank_terms_search_nothing() {
        let fields = fields();
        let serializer = Serializer::postgresql(&fields);

        assert_eq!(serializer.search().compile(&SearchSpec::new("  ")).unwrap(), None);
        assert_eq!(
            serializer
                .search()
                .field("", &fields[0], &SearchScope::AllFields)
                .unwrap(),
            None
        );
    }

    #[test]
    fn long_text_folds_line_breaks() {
        let fields = fields();
        let expr = Serializer::postgresql(&fields)
            .search()
            .field("road", &fields[0], &SearchScope::AllFields)
            .unwrap()
            .unwrap();

        assert_eq!(
            expr.sql,
            r#"REPLACE(REPLACE("notes", CHR(13), ' '), CHR(10), ' ') ILIKE ? ESCAPE '\'"#
        );
        assert_eq!(expr.params, [Value::String("%road%".into())]);
    }

    #[test]
    fn checkboxes_only_when_named() {
        let fields = fields();
        let serializer = Serializer::sqlite(&fields);
        let search = serializer.search();

        assert_eq!(
            search.field("true", &fields[2], &SearchScope::AllFields).unwrap(),
            None
        );

        let expr = search
            .field("true", &fields[2], &SearchScope::SingleField("fldDone".into()))
            .unwrap()
            .unwrap();
        assert_eq!(
            expr.sql,
            r#"CASE WHEN "done" THEN 'true' ELSE 'false' END LIKE ? ESCAPE '\'"#
        );
    }
}

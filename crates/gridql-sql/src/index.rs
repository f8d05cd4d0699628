//! Trigram indexes backing substring search.
//!
//! Each searchable field gets one `pg_trgm` GIN index over the text search
//! matches against, so `ILIKE '%term%'` can use it. The planner derives the
//! indexes a table should have and compares them with a catalog snapshot the
//! caller reads.

use crate::search::SearchText;
use crate::serializer::{Formatter, Ident, Params, Period, Serializer, ToSql, Zone};

use gridql_core::{
    schema::{CellValueType, FieldSpec},
    Result,
};
use jiff::Timestamp;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::debug;

/// Every index the planner manages starts with this.
const PREFIX: &str = "idx_trgm_";

/// `::type` and `::type[]` casts, after whitespace is removed.
static CAST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"::[a-z_]+(\[\])?").expect("valid regex"));

pub struct IndexPlanner<'a> {
    serializer: &'a Serializer<'a>,
}

/// A search index, expected or found in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexDescriptor {
    pub name: String,

    /// Table the index is on, optionally schema qualified (`schema.table`).
    pub table: String,

    /// The indexed expression. For indexes read from the catalog this may be
    /// the whole index definition.
    pub expression: String,
}

/// A difference between the expected indexes and the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexDrift {
    /// Expected but absent.
    Missing(IndexDescriptor),

    /// Present but not expected.
    Unexpected(IndexDescriptor),

    /// Present under the expected name, over a different expression.
    Changed {
        expected: IndexDescriptor,
        actual: IndexDescriptor,
    },
}

/// An expression this planner produced.
#[derive(Debug, Copy, Clone)]
struct Planned<'a>(&'a str);

impl ToSql for Planned<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        f.dst.push_str(self.0);
    }
}

impl<'a> IndexPlanner<'a> {
    pub(crate) fn new(serializer: &'a Serializer<'a>) -> IndexPlanner<'a> {
        IndexPlanner { serializer }
    }

    /// The indexed search expression of `field`. Checkbox and date fields are
    /// not indexed.
    ///
    /// This is exactly the text search matches against, so the index serves
    /// both whole-row and single-field searches.
    pub fn expression_for(&self, field: &FieldSpec) -> Result<Option<String>> {
        if matches!(
            field.cell_value_type,
            CellValueType::Boolean | CellValueType::DateTime
        ) {
            return Ok(None);
        }

        field.validate()?;
        let now = Timestamp::now();
        let zone = Zone::of(field, now)?;

        let expr = self.serializer.render(now, |f| {
            fmt!(f, SearchText { field, zone: &zone });
            Ok(())
        })?;

        Ok(Some(expr.sql))
    }

    /// A deterministic index name for `field` on `table`.
    ///
    /// The name is `idx_trgm_<table>_<column>_<field id>` with the table and
    /// column shortened to fit the engine's identifier limit. The table keeps
    /// its full name when it fits in half the space left after the prefix,
    /// separators and id; so does the column; otherwise each gets half.
    pub fn index_name_for(&self, table: &str, field: &FieldSpec) -> String {
        let limit = self.serializer.capability().max_identifier_len;
        let id = field.id.0.as_str();

        let table = table.rsplit('.').next().unwrap_or(table).trim_matches('"');
        let column = field.db_field_name.as_str();

        let budget = limit.saturating_sub(PREFIX.len() + 2 + id.len());
        let half = budget / 2;

        let (table_len, column_len) = if table.len() <= half {
            (table.len(), column.len().min(budget - table.len()))
        } else if column.len() <= half {
            (table.len().min(budget - column.len()), column.len())
        } else {
            (half, budget - half)
        };

        let name = format!(
            "{PREFIX}{}_{}_{id}",
            truncate(table, table_len),
            truncate(column, column_len)
        );

        // The id alone may exceed the limit
        truncate(&name, limit).to_string()
    }

    /// The indexes `table` should have for `fields`.
    pub fn expected<'f>(
        &self,
        table: &str,
        fields: impl IntoIterator<Item = &'f FieldSpec>,
    ) -> Result<Vec<IndexDescriptor>> {
        let mut indexes = vec![];

        for field in fields {
            if let Some(expression) = self.expression_for(field)? {
                indexes.push(IndexDescriptor {
                    name: self.index_name_for(table, field),
                    table: table.to_string(),
                    expression,
                });
            }
        }

        Ok(indexes)
    }

    pub fn create_index(&self, index: &IndexDescriptor) -> Result<String> {
        let expr = self.serializer.render(Timestamp::now(), |f| {
            fmt!(
                f,
                "CREATE INDEX IF NOT EXISTS " Ident(&index.name) " ON "
                Period(index.table.split('.').map(Ident)) " USING gin (("
                Planned(&index.expression) ") gin_trgm_ops)"
            );
            Ok(())
        })?;

        Ok(expr.sql)
    }

    pub fn drop_index(&self, name: &str) -> Result<String> {
        let expr = self.serializer.render(Timestamp::now(), |f| {
            fmt!(f, "DROP INDEX IF EXISTS " Ident(name));
            Ok(())
        })?;

        Ok(expr.sql)
    }

    /// Compares the expected indexes with `existing`, a catalog snapshot.
    ///
    /// Indexes without the planner's prefix are ignored. Names are compared
    /// first; only when both sides have the same names are the expressions
    /// compared, after normalizing away formatting the catalog adds.
    pub fn diff<'f>(
        &self,
        table: &str,
        fields: impl IntoIterator<Item = &'f FieldSpec>,
        existing: &[IndexDescriptor],
    ) -> Result<Vec<IndexDrift>> {
        let expected = self.expected(table, fields)?;
        let existing: Vec<_> = existing
            .iter()
            .filter(|index| index.name.starts_with(PREFIX))
            .collect();

        let mut drift = vec![];

        for index in &expected {
            if !existing.iter().any(|actual| actual.name == index.name) {
                drift.push(IndexDrift::Missing(index.clone()));
            }
        }

        for actual in &existing {
            if !expected.iter().any(|index| index.name == actual.name) {
                drift.push(IndexDrift::Unexpected((*actual).clone()));
            }
        }

        if drift.is_empty() {
            for index in &expected {
                let Some(actual) = existing.iter().find(|actual| actual.name == index.name) else {
                    continue;
                };

                if normalize(&index.expression) != normalize(&actual.expression) {
                    drift.push(IndexDrift::Changed {
                        expected: index.clone(),
                        actual: (*actual).clone(),
                    });
                }
            }
        }

        debug!(table, drift = drift.len(), "diffed search indexes");
        Ok(drift)
    }
}

/// Reduces an index expression or definition to what matters for
/// comparison.
fn normalize(expression: &str) -> String {
    let mut s: String = expression
        .to_lowercase()
        .chars()
        .filter(|ch| !ch.is_whitespace())
        .collect();

    if let Some(pos) = s.find("usinggin") {
        s = s[pos + "usinggin".len()..].to_string();
    }

    let s = s.replace("gin_trgm_ops", "");
    let s = CAST.replace_all(&s, "");

    s.chars()
        .filter(|ch| !matches!(ch, '"' | '\'' | '(' | ')'))
        .collect()
}

/// The longest prefix of `s` at most `max` bytes long that ends on a char
/// boundary.
fn truncate(s: &str, max: usize) -> &str {
    let mut end = max.min(s.len());
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_ignores_catalog_formatting() {
        let ours = r#"REPLACE(REPLACE("notes", CHR(13), ' '), CHR(10), ' ')"#;
        let catalog = "CREATE INDEX idx_trgm_tasks_notes_fld1 ON public.tasks USING gin \
                       ((replace(replace(notes, chr(13), ' '::text), chr(10), ' '::text)) gin_trgm_ops)";

        assert_eq!(normalize(ours), normalize(catalog));
        assert_ne!(normalize(ours), normalize(r#""notes""#));
    }

    #[test]
    fn array_casts_are_stripped() {
        assert_eq!(normalize("(\"tags\")::text[]"), "tags");
        assert_eq!(
            normalize("round(price::numeric, 2)::text"),
            normalize("ROUND(\"price\"::numeric, 2)::text")
        );
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "h");
        assert_eq!(truncate("héllo", 3), "hé");
        assert_eq!(truncate("abc", 10), "abc");
    }
}

use crate::serializer::{
    Bucket, Column, Elements, Flavor, Formatter, Ident, JsonText, Params, Serializer, ToSql,
    Zone,
};

use gridql_core::{
    schema::{CellValueType, FieldId, FieldSpec},
    stmt::GroupSpec,
    Result,
};
use jiff::Timestamp;
use tracing::{debug, trace};

/// Compiles group specifications to grouping keys.
pub struct GroupCompiler<'a> {
    serializer: &'a Serializer<'a>,
    now: Option<Timestamp>,
}

/// The grouping expression of one field.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupColumn {
    pub field_id: FieldId,
    pub expr: GroupExpr,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GroupExpr {
    /// Group rows by the field's bucket.
    Bucket {
        /// The bucket aliased to the field's column name, for the select list
        select: String,

        /// The bucket, for `GROUP BY`
        group_by: String,
    },

    /// Count distinct buckets, aliased to the field's column name.
    DistinctCount(String),
}

/// The value rows of one group share.
///
/// Multi-valued cells group by the whole transformed array. Element order is
/// significant, so `[a, b]` and `[b, a]` are different groups.
#[derive(Debug, Copy, Clone)]
struct GroupKey<'a> {
    field: &'a FieldSpec,
    zone: &'a Zone,
}

/// `{id, title}` of a structured cell as one JSON value.
#[derive(Debug, Copy, Clone)]
struct Pair<E>(E);

/// A number rounded to the field's display precision.
#[derive(Debug, Copy, Clone)]
struct Rounded<E> {
    expr: E,
    precision: u32,
}

impl<'a> GroupCompiler<'a> {
    pub(crate) fn new(serializer: &'a Serializer<'a>) -> GroupCompiler<'a> {
        GroupCompiler {
            serializer,
            now: None,
        }
    }

    /// The instant zone offsets are taken at on engines without a time zone
    /// database.
    pub fn now(mut self, now: Timestamp) -> Self {
        self.now = Some(now);
        self
    }

    /// Compiles one grouping column per known field, in order.
    pub fn compile(&self, spec: &GroupSpec) -> Result<Vec<GroupColumn>> {
        let fields = self.serializer.fields();
        let now = self.now.unwrap_or_else(Timestamp::now);
        let mut columns = Vec::with_capacity(spec.field_ids.len());

        for field_id in &spec.field_ids {
            let Some(field) = fields.field(field_id) else {
                trace!(%field_id, "skipping group on unknown field");
                continue;
            };

            field.validate()?;
            let zone = Zone::of(field, now)?;
            let key = GroupKey { field, zone: &zone };
            let alias = Ident(&field.db_field_name);

            let expr = if spec.distinct {
                let count = self.serializer.render(now, |f| {
                    fmt!(f, "COUNT(DISTINCT " key ") AS " alias);
                    Ok(())
                })?;
                GroupExpr::DistinctCount(count.sql)
            } else {
                let select = self.serializer.render(now, |f| {
                    fmt!(f, key " AS " alias);
                    Ok(())
                })?;
                let group_by = self.serializer.render(now, |f| {
                    fmt!(f, key);
                    Ok(())
                })?;
                GroupExpr::Bucket {
                    select: select.sql,
                    group_by: group_by.sql,
                }
            };

            debug!(flavor = %self.serializer.flavor, %field_id, ?expr, "compiled group");

            columns.push(GroupColumn {
                field_id: field.id.clone(),
                expr,
            });
        }

        Ok(columns)
    }
}

impl ToSql for GroupKey<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let GroupKey { field, zone } = self;
        let column = Column(field);
        let unit = field.options.date_granularity();
        let precision = field.options.number.precision;

        if !field.is_multiple() {
            match field.cell_value_type {
                CellValueType::String if field.structured => {
                    let id = JsonText { json: column, key: "id" };
                    let title = JsonText { json: column, key: "title" };
                    fmt!(
                        f,
                        "CASE WHEN " id " IS NULL AND " title " IS NULL THEN NULL ELSE "
                        Pair(column) " END"
                    );
                }
                CellValueType::Number => fmt!(f, Rounded { expr: column, precision }),
                CellValueType::DateTime => fmt!(f, Bucket { expr: column, unit, zone }),
                CellValueType::String | CellValueType::Boolean => fmt!(f, column),
            }
            return;
        }

        match f.serializer.flavor {
            Flavor::Postgresql => {
                let elements = Elements::new(field, "x").json().ordinality();
                let text = "(x.v #>> '{}')";

                fmt!(f, "(SELECT jsonb_agg(");
                match field.cell_value_type {
                    CellValueType::String if field.structured => fmt!(f, Pair("x.v")),
                    CellValueType::Number => fmt!(f, Rounded { expr: text, precision }),
                    CellValueType::DateTime => {
                        fmt!(f, Bucket { expr: (text, "::timestamptz"), unit, zone })
                    }
                    CellValueType::String | CellValueType::Boolean => fmt!(f, "x.v"),
                }
                fmt!(f, " ORDER BY x.i) FROM " elements ")");
            }
            Flavor::Sqlite => {
                let elements = Elements::new(field, "x");

                fmt!(f, "(SELECT json_group_array(v) FROM (SELECT ");
                match field.cell_value_type {
                    CellValueType::String if field.structured => fmt!(f, Pair("x.value")),
                    CellValueType::Number => fmt!(f, Rounded { expr: "x.value", precision }),
                    CellValueType::DateTime => fmt!(f, Bucket { expr: "x.value", unit, zone }),
                    CellValueType::String | CellValueType::Boolean => fmt!(f, "x.value"),
                }
                fmt!(f, " AS v FROM " elements " ORDER BY x.key))");
            }
        }
    }
}

impl<E: ToSql + Copy> ToSql for Pair<E> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let id = JsonText { json: self.0, key: "id" };
        let title = JsonText { json: self.0, key: "title" };

        match f.serializer.flavor {
            Flavor::Postgresql => {
                fmt!(f, "jsonb_build_object('id', " id ", 'title', " title ")")
            }
            Flavor::Sqlite => fmt!(f, "json_object('id', " id ", 'title', " title ")"),
        }
    }
}

impl<E: ToSql> ToSql for Rounded<E> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        match f.serializer.flavor {
            // `ROUND(double precision, int)` does not exist
            Flavor::Postgresql => fmt!(f, "ROUND(" self.expr "::numeric, " self.precision ")"),
            Flavor::Sqlite => fmt!(f, "ROUND(" self.expr ", " self.precision ")"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridql_core::schema::{DateFormatting, FieldKind};
    use pretty_assertions::assert_eq;

    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("fldStatus", "Status", FieldKind::SingleSelect).db_field_name("status"),
            FieldSpec::new("fldPrice", "Price", FieldKind::Number)
                .db_field_name("price")
                .precision(1),
            FieldSpec::new("fldDue", "Due", FieldKind::Date)
                .db_field_name("due")
                .date_formatting(DateFormatting::new("Asia/Tokyo")),
            FieldSpec::new("fldOwner", "Owner", FieldKind::User).db_field_name("owner"),
            FieldSpec::new("fldTags", "Tags", FieldKind::MultipleSelect).db_field_name("tags"),
        ]
    }

    fn bucket(column: &GroupColumn) -> (&str, &str) {
        match &column.expr {
            GroupExpr::Bucket { select, group_by } => (select.as_str(), group_by.as_str()),
            expr => panic!("expected a bucket; expr={expr:?}"),
        }
    }

    #[test]
    fn postgresql_buckets() {
        let fields = fields();
        let serializer = Serializer::postgresql(&fields);
        let spec = GroupSpec::new(["fldStatus", "fldPrice", "fldDue", "fldMissing", "fldOwner"]);

        let columns = serializer.group().compile(&spec).unwrap();
        assert_eq!(columns.len(), 4);

        assert_eq!(bucket(&columns[0]), (r#""status" AS "status""#, r#""status""#));
        assert_eq!(bucket(&columns[1]).1, r#"ROUND("price"::numeric, 1)"#);
        assert_eq!(
            bucket(&columns[2]).1,
            r#"(date_trunc('day', "due" AT TIME ZONE 'Asia/Tokyo') AT TIME ZONE 'Asia/Tokyo')"#
        );
        assert_eq!(
            bucket(&columns[3]).1,
            r#"CASE WHEN "owner"->>'id' IS NULL AND "owner"->>'title' IS NULL THEN NULL ELSE jsonb_build_object('id', "owner"->>'id', 'title', "owner"->>'title') END"#
        );
    }

    #[test]
    fn multiple_values_group_by_the_ordered_array() {
        let fields = fields();
        let spec = GroupSpec::new(["fldTags"]);

        let pg = Serializer::postgresql(&fields).group().compile(&spec).unwrap();
        assert_eq!(
            bucket(&pg[0]).1,
            r#"(SELECT jsonb_agg(x.v ORDER BY x.i) FROM jsonb_array_elements("tags") WITH ORDINALITY AS x(v, i))"#
        );

        let sqlite = Serializer::sqlite(&fields).group().compile(&spec).unwrap();
        assert_eq!(
            bucket(&sqlite[0]).1,
            r#"(SELECT json_group_array(v) FROM (SELECT x.value AS v FROM json_each("tags") AS x ORDER BY x.key))"#
        );
    }

    #[test]
    fn sqlite_dates_shift_by_the_zone_offset() {
        let fields = fields();
        let columns = Serializer::sqlite(&fields)
            .group()
            .now("2024-03-13T10:30:00Z".parse().unwrap())
            .compile(&GroupSpec::new(["fldDue"]))
            .unwrap();

        assert_eq!(
            bucket(&columns[0]).1,
            r#"datetime(strftime('%Y-%m-%d', "due", '+09:00'), '-09:00')"#
        );
    }

    #[test]
    fn distinct_counts_keys() {
        let fields = fields();
        let columns = Serializer::sqlite(&fields)
            .group()
            .compile(&GroupSpec::new(["fldPrice"]).distinct())
            .unwrap();

        assert_eq!(
            columns[0].expr,
            GroupExpr::DistinctCount(r#"COUNT(DISTINCT ROUND("price", 1)) AS "price""#.into())
        );
    }
}

use super::{Flavor, Formatter, Params, Quoted, ToSql};

use gridql_core::schema::{CellValueType, FieldSpec};

/// The whole cell of a field: its selection override or quoted column.
#[derive(Debug, Copy, Clone)]
pub(crate) struct Column<'a>(pub(crate) &'a FieldSpec);

/// The comparable value of a single-valued cell. Structured cells compare by
/// their key (`id` for people, `title` otherwise).
#[derive(Debug, Copy, Clone)]
pub(crate) struct Scalar<'a>(pub(crate) &'a FieldSpec);

/// The displayed text of a single-valued cell. Structured cells show their
/// `title` even when they compare by `id`.
#[derive(Debug, Copy, Clone)]
pub(crate) struct Title<'a>(pub(crate) &'a FieldSpec);

/// Text of one key of a JSON object.
#[derive(Debug, Copy, Clone)]
pub(crate) struct JsonText<E> {
    pub(crate) json: E,
    pub(crate) key: &'static str,
}

/// Row source iterating the elements of a multi-valued cell.
///
/// On PostgreSQL the alias exposes the element as `<alias>.v` (and its
/// 1-based position as `<alias>.i` when `ordinality` is set); on SQLite
/// `json_each` exposes `<alias>.value` and `<alias>.key`.
#[derive(Debug, Copy, Clone)]
pub(crate) struct Elements<'a> {
    pub(crate) field: &'a FieldSpec,
    pub(crate) alias: &'static str,

    /// Treat a null cell as an empty array.
    pub(crate) coalesce: bool,

    /// Yield `jsonb` elements on PostgreSQL even for unstructured arrays.
    pub(crate) json: bool,

    pub(crate) ordinality: bool,
}

/// The comparable value of the current element of an [`Elements`] source.
#[derive(Debug, Copy, Clone)]
pub(crate) struct Elem<'a> {
    pub(crate) field: &'a FieldSpec,
    pub(crate) alias: &'static str,

    /// Read the `title` of structured elements instead of their key.
    pub(crate) title: bool,
}

impl ToSql for Column<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        f.dst.push_str(&self.0.column_ref());
    }
}

impl ToSql for Scalar<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        if self.0.structured {
            let key = self.0.structured_key();
            fmt!(f, JsonText { json: Column(self.0), key });
        } else {
            fmt!(f, Column(self.0));
        }
    }
}

impl ToSql for Title<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        if self.0.structured {
            fmt!(f, JsonText { json: Column(self.0), key: "title" });
        } else {
            fmt!(f, Column(self.0));
        }
    }
}

impl<E: ToSql> ToSql for JsonText<E> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        match f.serializer.flavor {
            Flavor::Postgresql => fmt!(f, self.json "->>" Quoted(self.key)),
            Flavor::Sqlite => {
                let path = format!("$.{}", self.key);
                fmt!(f, "json_extract(" self.json ", " Quoted(path) ")")
            }
        }
    }
}

impl<'a> Elements<'a> {
    pub(crate) fn new(field: &'a FieldSpec, alias: &'static str) -> Elements<'a> {
        Elements {
            field,
            alias,
            coalesce: false,
            json: false,
            ordinality: false,
        }
    }

    pub(crate) fn coalesce(self) -> Self {
        Elements {
            coalesce: true,
            ..self
        }
    }

    pub(crate) fn json(self) -> Self {
        Elements { json: true, ..self }
    }

    pub(crate) fn ordinality(self) -> Self {
        Elements {
            ordinality: true,
            ..self
        }
    }

    pub(crate) fn elem(&self) -> Elem<'a> {
        Elem {
            field: self.field,
            alias: self.alias,
            title: false,
        }
    }
}

impl ToSql for Elements<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let column = Column(self.field);

        match f.serializer.flavor {
            Flavor::Postgresql => {
                if self.json || self.field.structured {
                    fmt!(f, "jsonb_array_elements(");
                } else {
                    fmt!(f, "jsonb_array_elements_text(");
                }

                if self.coalesce {
                    fmt!(f, "COALESCE(" column ", '[]'::jsonb)");
                } else {
                    fmt!(f, column);
                }

                if self.ordinality {
                    fmt!(f, ") WITH ORDINALITY AS " self.alias "(v, i)");
                } else {
                    fmt!(f, ") AS " self.alias "(v)");
                }
            }
            Flavor::Sqlite => {
                if self.coalesce {
                    fmt!(f, "json_each(COALESCE(" column ", '[]')) AS " self.alias);
                } else {
                    fmt!(f, "json_each(" column ") AS " self.alias);
                }
            }
        }
    }
}

impl Elem<'_> {
    pub(crate) fn title(self) -> Self {
        Elem {
            title: true,
            ..self
        }
    }

    fn key(&self) -> &'static str {
        if self.title {
            "title"
        } else {
            self.field.structured_key()
        }
    }
}

impl ToSql for Elem<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let alias = self.alias;

        match f.serializer.flavor {
            Flavor::Postgresql if self.field.structured => {
                fmt!(f, alias ".v->>" Quoted(self.key()))
            }
            Flavor::Postgresql => {
                // `jsonb_array_elements_text` yields text
                let cast = match self.field.cell_value_type {
                    CellValueType::String => "",
                    CellValueType::Number => "::double precision",
                    CellValueType::DateTime => "::timestamptz",
                    CellValueType::Boolean => "::boolean",
                };
                fmt!(f, alias ".v" cast)
            }
            Flavor::Sqlite if self.field.structured => {
                let path = format!("$.{}", self.key());
                fmt!(f, "json_extract(" alias ".value, " Quoted(path) ")")
            }
            Flavor::Sqlite => fmt!(f, alias ".value"),
        }
    }
}

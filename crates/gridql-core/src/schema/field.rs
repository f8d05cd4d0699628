use super::{DateFormatting, FieldOptions};
use crate::{Error, Result};

use serde::{Deserialize, Serialize};
use std::{borrow::Cow, fmt};

/// Uniquely identifies a field within a table.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldId(pub String);

/// The logical kind of value a cell holds, independent of storage.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CellValueType {
    Boolean,
    Number,
    DateTime,
    String,
}

/// Whether a cell holds one value or a JSON array of values.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Multiplicity {
    #[default]
    Single,
    Multiple,
}

/// The product-level kind of a field.
///
/// The compilers mostly work off [`CellValueType`], but a few rules depend on
/// the kind: the "me" placeholder only applies to people fields, long text
/// folds line breaks before matching, and structured cells compare by `id`
/// for people and by `title` otherwise.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKind {
    Text,
    LongText,
    Number,
    Rating,
    AutoNumber,
    Checkbox,
    Date,
    CreatedTime,
    LastModifiedTime,
    SingleSelect,
    MultipleSelect,
    User,
    CreatedBy,
    LastModifiedBy,
    Link,
    Attachment,
    Formula,
    Rollup,
}

/// Describes one user-defined column a query can target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    pub id: FieldId,

    /// Display name, used in error messages.
    pub name: String,

    /// Physical column name.
    pub db_field_name: String,

    /// Expression to select instead of the physical column, when the caller
    /// has already projected or aliased the field.
    #[serde(default)]
    pub selection_override: Option<String>,

    pub kind: FieldKind,

    pub cell_value_type: CellValueType,

    #[serde(default)]
    pub multiplicity: Multiplicity,

    /// True when every cell (or array element) is a JSON object carrying at
    /// least `{id, title}`.
    #[serde(default)]
    pub structured: bool,

    #[serde(default)]
    pub options: FieldOptions,
}

impl FieldSpec {
    /// Creates a field with the storage shape a field of `kind` has by default.
    ///
    /// Formula and rollup fields default to a single string; use
    /// [`FieldSpec::cell_value_type`] to describe what they evaluate to.
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: FieldKind) -> FieldSpec {
        use FieldKind::*;

        let id = id.into();
        let (cell_value_type, multiplicity, structured) = match kind {
            Text | LongText | SingleSelect | Formula | Rollup => {
                (CellValueType::String, Multiplicity::Single, false)
            }
            MultipleSelect => (CellValueType::String, Multiplicity::Multiple, false),
            Number | Rating | AutoNumber => (CellValueType::Number, Multiplicity::Single, false),
            Checkbox => (CellValueType::Boolean, Multiplicity::Single, false),
            Date | CreatedTime | LastModifiedTime => {
                (CellValueType::DateTime, Multiplicity::Single, false)
            }
            User | CreatedBy | LastModifiedBy => (CellValueType::String, Multiplicity::Single, true),
            Link | Attachment => (CellValueType::String, Multiplicity::Multiple, true),
        };

        FieldSpec {
            db_field_name: id.clone(),
            id: FieldId(id),
            name: name.into(),
            selection_override: None,
            kind,
            cell_value_type,
            multiplicity,
            structured,
            options: FieldOptions::default(),
        }
    }

    pub fn db_field_name(mut self, name: impl Into<String>) -> Self {
        self.db_field_name = name.into();
        self
    }

    pub fn selection(mut self, expr: impl Into<String>) -> Self {
        self.selection_override = Some(expr.into());
        self
    }

    pub fn cell_value_type(mut self, ty: CellValueType) -> Self {
        self.cell_value_type = ty;
        self
    }

    pub fn multiple(mut self) -> Self {
        self.multiplicity = Multiplicity::Multiple;
        self
    }

    pub fn single(mut self) -> Self {
        self.multiplicity = Multiplicity::Single;
        self
    }

    pub fn precision(mut self, precision: u32) -> Self {
        self.options.number.precision = precision;
        self
    }

    pub fn date_formatting(mut self, formatting: DateFormatting) -> Self {
        self.options.date = formatting;
        self
    }

    /// Checks the invariants the compilers rely on.
    pub fn validate(&self) -> Result<()> {
        if self.db_field_name.is_empty() && self.selection_override.is_none() {
            return Err(Error::invalid_field(&self.name, "missing column name"));
        }

        if self.structured && self.cell_value_type != CellValueType::String {
            return Err(Error::invalid_field(
                &self.name,
                "structured cells must hold string values",
            ));
        }

        Ok(())
    }

    /// Returns the SQL that selects this field: the override expression when
    /// one is set, otherwise the quoted column name.
    pub fn column_ref(&self) -> Cow<'_, str> {
        match &self.selection_override {
            Some(expr) => Cow::Borrowed(expr),
            None => quote_ident(&self.db_field_name),
        }
    }

    pub fn is_multiple(&self) -> bool {
        self.multiplicity == Multiplicity::Multiple
    }

    pub fn is_people(&self) -> bool {
        matches!(
            self.kind,
            FieldKind::User | FieldKind::CreatedBy | FieldKind::LastModifiedBy
        )
    }

    pub fn is_long_text(&self) -> bool {
        self.kind == FieldKind::LongText
    }

    /// The key structured cells are compared by.
    pub fn structured_key(&self) -> &'static str {
        if self.is_people() {
            "id"
        } else {
            "title"
        }
    }

    /// True when `isEmpty` must also match the empty string.
    pub fn is_plain_text(&self) -> bool {
        self.cell_value_type == CellValueType::String && !self.is_multiple() && !self.structured
    }
}

/// Quotes an identifier with double quotes, escaping embedded quotes.
///
/// Quoting is idempotent: an identifier that is already wrapped in double
/// quotes is returned unchanged.
pub fn quote_ident(ident: &str) -> Cow<'_, str> {
    if ident.len() >= 2 && ident.starts_with('"') && ident.ends_with('"') {
        return Cow::Borrowed(ident);
    }

    Cow::Owned(format!("\"{}\"", ident.replace('"', "\"\"")))
}

impl fmt::Debug for FieldId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "FieldId({})", self.0)
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str(&self.0)
    }
}

impl From<&str> for FieldId {
    fn from(value: &str) -> Self {
        FieldId(value.to_string())
    }
}

impl From<String> for FieldId {
    fn from(value: String) -> Self {
        FieldId(value)
    }
}

impl fmt::Display for CellValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CellValueType::Boolean => "boolean",
            CellValueType::Number => "number",
            CellValueType::DateTime => "dateTime",
            CellValueType::String => "string",
        })
    }
}

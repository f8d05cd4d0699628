mod field;
pub use field::{quote_ident, CellValueType, FieldId, FieldKind, FieldSpec, Multiplicity};

mod lookup;
pub use lookup::FieldLookup;

mod options;
pub(crate) use options::resolve_time_zone;
pub use options::{DateFormatting, DateGranularity, DatePreset, FieldOptions, NumberFormatting, TimeFormat};

mod capability;
pub use capability::{Capability, CompileOptions};

pub mod date_range;
pub use date_range::DateRange;

mod error;
pub use error::Error;

pub mod schema;
pub use schema::{FieldId, FieldLookup, FieldSpec};

pub mod stmt;

/// A Result type alias that uses gridql's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;

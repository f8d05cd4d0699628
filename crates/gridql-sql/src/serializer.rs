#[macro_use]
mod fmt;
pub(crate) use fmt::ToSql;

mod column;
pub(crate) use column::{Column, Elem, Elements, JsonText, Scalar, Title};

mod compiled;
pub use compiled::CompiledExpression;

mod delim;
pub(crate) use delim::{Comma, Period};

mod flavor;
pub(crate) use flavor::Flavor;

mod ident;
pub(crate) use ident::{Ident, Quoted};

mod params;
pub use params::{Params, Placeholder};

mod pattern;
pub(crate) use pattern::{like_pattern, Like, ESCAPE};

mod time;
pub(crate) use time::{Bucket, DateText, Truncate, Zone};

mod value;

use crate::{
    filter::FilterCompiler, group::GroupCompiler, index::IndexPlanner, search::SearchCompiler,
    sort::SortCompiler,
};

use gridql_core::{stmt::Value, CompileOptions, Error, FieldLookup, Result};
use jiff::Timestamp;

/// Compiles query specifications into SQL fragments for one database flavor.
///
/// A serializer borrows the field catalog for the duration of a request and
/// hands out one compiler per concern. Compilers hold no mutable state.
pub struct Serializer<'a> {
    /// Fields the specifications refer to
    fields: &'a dyn FieldLookup,

    /// The database flavor handles the differences between SQL dialects and
    /// supported features.
    pub(crate) flavor: Flavor,

    options: CompileOptions,
}

pub(crate) struct Formatter<'a, T> {
    /// Handle to the serializer
    pub(crate) serializer: &'a Serializer<'a>,

    /// Where to write the serialized SQL
    pub(crate) dst: &'a mut String,

    /// Where to store parameters
    pub(crate) params: &'a mut T,

    /// Instant relative date modes and zone offsets are evaluated at.
    pub(crate) now: Timestamp,
}

impl<'a> Serializer<'a> {
    pub fn with_options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    pub fn fields(&self) -> &'a dyn FieldLookup {
        self.fields
    }

    pub fn filter(&self) -> FilterCompiler<'_> {
        FilterCompiler::new(self)
    }

    pub fn sort(&self) -> SortCompiler<'_> {
        SortCompiler::new(self)
    }

    pub fn group(&self) -> GroupCompiler<'_> {
        GroupCompiler::new(self)
    }

    pub fn search(&self) -> SearchCompiler<'_> {
        SearchCompiler::new(self)
    }

    /// The search index planner. Only PostgreSQL has trigram indexes.
    pub fn index_planner(&self) -> Result<IndexPlanner<'_>> {
        if !self.capability().trigram_index {
            return Err(Error::unsupported_feature(format!(
                "{} has no trigram search indexes",
                self.flavor
            )));
        }

        Ok(IndexPlanner::new(self))
    }

    /// Runs `write` against a fresh formatter and collects the result.
    pub(crate) fn render(
        &self,
        now: Timestamp,
        write: impl FnOnce(&mut Formatter<'_, Vec<Value>>) -> Result<()>,
    ) -> Result<CompiledExpression> {
        let mut sql = String::new();
        let mut params = vec![];

        let mut f = Formatter {
            serializer: self,
            dst: &mut sql,
            params: &mut params,
            now,
        };

        write(&mut f)?;

        Ok(CompiledExpression { sql, params })
    }
}

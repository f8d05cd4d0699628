use super::{Formatter, Params, ToSql};

use gridql_core::schema::quote_ident;

/// A double-quoted identifier.
#[derive(Debug, Copy, Clone)]
pub(crate) struct Ident<S>(pub(crate) S);

/// A single-quoted string literal built from trusted text: time zone names,
/// JSON keys, configured separators and column names. Never user input.
#[derive(Debug, Copy, Clone)]
pub(crate) struct Quoted<S>(pub(crate) S);

impl<S: AsRef<str>> ToSql for Ident<S> {
    fn to_sql<T: Params>(self, f: &mut Formatter<'_, T>) {
        f.dst.push_str(&quote_ident(self.0.as_ref()));
    }
}

impl<S: AsRef<str>> ToSql for Quoted<S> {
    fn to_sql<T: Params>(self, f: &mut Formatter<'_, T>) {
        f.dst.push('\'');
        f.dst.push_str(&self.0.as_ref().replace('\'', "''"));
        f.dst.push('\'');
    }
}

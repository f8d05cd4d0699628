use super::{Formatter, ToSql};

use gridql_core::stmt::Value;

/// Collects the values bound to a fragment's placeholders.
pub trait Params {
    fn push(&mut self, param: &Value) -> Placeholder;
}

/// Position (1-based) of a bound value.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Placeholder(pub usize);

impl Params for Vec<Value> {
    fn push(&mut self, value: &Value) -> Placeholder {
        self.push(value.clone());
        Placeholder(self.len())
    }
}

impl ToSql for Placeholder {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        // Fragments are spliced into larger statements, so placeholders stay
        // positional. `CompiledExpression::numbered` renumbers them.
        f.dst.push('?');
    }
}

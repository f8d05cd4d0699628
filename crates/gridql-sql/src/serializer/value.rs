use super::{Formatter, Params, ToSql};

use gridql_core::stmt::Value;

impl ToSql for &Value {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let placeholder = f.params.push(self);
        fmt!(f, placeholder);
    }
}

impl ToSql for Value {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        (&self).to_sql(f);
    }
}

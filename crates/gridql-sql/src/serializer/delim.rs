use super::{Formatter, Params, ToSql};

/// Comma delimited
pub(crate) struct Comma<L>(pub(crate) L);

/// Delimited by an arbitrary separator
pub(crate) struct Delimited<L>(pub(crate) L, pub(crate) &'static str);

/// Period delimited
pub(crate) struct Period<L>(pub(crate) L);

impl<L> ToSql for Comma<L>
where
    L: IntoIterator,
    L::Item: ToSql,
{
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(f, Delimited(self.0, ", "));
    }
}

impl<L> ToSql for Delimited<L>
where
    L: IntoIterator,
    L::Item: ToSql,
{
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let mut s = "";
        for i in self.0 {
            fmt!(f, s i);
            s = self.1;
        }
    }
}

impl<L, I> ToSql for Period<L>
where
    L: IntoIterator<Item = I>,
    I: ToSql,
{
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let mut s = "";
        for i in self.0.into_iter() {
            fmt!(f, s i);
            s = ".";
        }
    }
}

use super::{Formatter, Params, ToSql};

/// Case-insensitive pattern match operator.
#[derive(Debug, Copy, Clone)]
pub(crate) struct Like {
    pub(crate) negate: bool,
}

/// Written after every pattern so the escapes of [`like_pattern`] apply.
pub(crate) const ESCAPE: &str = " ESCAPE '\\'";

impl ToSql for Like {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let op = match (self.negate, f.serializer.capability().ilike) {
            (false, true) => " ILIKE ",
            (true, true) => " NOT ILIKE ",
            // SQLite's LIKE is case-insensitive for ASCII
            (false, false) => " LIKE ",
            (true, false) => " NOT LIKE ",
        };
        fmt!(f, op);
    }
}

/// Escapes `LIKE` metacharacters and wraps the term in `%`.
pub(crate) fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metacharacters_are_escaped() {
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
        assert_eq!(like_pattern(""), "%%");
    }
}

use gridql_core::stmt::Value;

/// A SQL fragment and the values bound to its placeholders.
///
/// `sql` never embeds user input. Placeholders are written as `?` and bound
/// in order of appearance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledExpression {
    pub sql: String,
    pub params: Vec<Value>,
}

impl CompiledExpression {
    pub fn new(sql: impl Into<String>, params: Vec<Value>) -> CompiledExpression {
        CompiledExpression {
            sql: sql.into(),
            params,
        }
    }

    /// Rewrites `?` placeholders to PostgreSQL's `$n` form, numbering from
    /// `start`.
    ///
    /// Question marks inside quoted identifiers or string literals are left
    /// alone.
    pub fn numbered(&self, start: usize) -> String {
        let mut ret = String::with_capacity(self.sql.len() + self.params.len() * 2);
        let mut next = start;
        let mut quote = None;

        for ch in self.sql.chars() {
            match (quote, ch) {
                (None, '\'' | '"') => quote = Some(ch),
                (Some(open), _) if open == ch => quote = None,
                (None, '?') => {
                    ret.push('$');
                    ret.push_str(&next.to_string());
                    next += 1;
                    continue;
                }
                _ => {}
            }
            ret.push(ch);
        }

        ret
    }

    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_skips_quoted_text() {
        let expr = CompiledExpression::new(
            r#"("a?" = ? OR 'why?' = ?) AND x = ?"#,
            vec![1i64.into(), 2i64.into(), 3i64.into()],
        );

        assert_eq!(expr.numbered(1), r#"("a?" = $1 OR 'why?' = $2) AND x = $3"#);
        assert_eq!(expr.numbered(4), r#"("a?" = $4 OR 'why?' = $5) AND x = $6"#);
    }

    #[test]
    fn doubled_quotes_stay_inside_literal() {
        let expr = CompiledExpression::new("'it''s?' = ?", vec![Value::Null]);
        assert_eq!(expr.numbered(1), "'it''s?' = $1");
    }
}

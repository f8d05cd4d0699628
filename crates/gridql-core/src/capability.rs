use serde::{Deserialize, Serialize};

/// What a backing engine can express.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capability {
    /// Longest identifier, in bytes, the engine keeps without truncating.
    pub max_identifier_len: usize,

    /// Supports the case-insensitive `ILIKE` operator.
    pub ilike: bool,

    /// Supports `pg_trgm` GIN indexes for substring search.
    pub trigram_index: bool,
}

impl Capability {
    /// SQLite capabilities.
    pub const SQLITE: Self = Self {
        // SQLite does not limit identifier length. The value only bounds the
        // names this crate generates.
        max_identifier_len: 1024,
        ilike: false,
        trigram_index: false,
    };

    /// PostgreSQL capabilities
    pub const POSTGRESQL: Self = Self {
        // NAMEDATALEN - 1
        max_identifier_len: 63,
        ilike: true,
        trigram_index: true,
    };
}

/// Knobs shared by every compiler.
///
/// All fields have defaults, so a partial JSON or TOML document deserializes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompileOptions {
    /// Column appended to every ORDER BY as the final ascending term.
    pub tie_break_column: String,

    /// Separator used when the elements of a multi-valued field are joined
    /// for searching.
    pub search_separator: String,

    /// Literal that stands for the requesting user in people filters.
    pub current_user_placeholder: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            tie_break_column: "__auto_number".to_string(),
            search_separator: ", ".to_string(),
            current_user_placeholder: "me".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_fill_in_defaults() {
        let options: CompileOptions =
            serde_json::from_str(r#"{"tieBreakColumn": "__row_seq"}"#).unwrap();

        assert_eq!(options.tie_break_column, "__row_seq");
        assert_eq!(options.search_separator, ", ");
        assert_eq!(options.current_user_placeholder, "me");
    }
}

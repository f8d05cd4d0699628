use crate::schema::FieldId;

use serde::{Deserialize, Serialize};

/// A free-text search request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchSpec {
    pub term: String,

    #[serde(default)]
    pub scope: SearchScope,

    #[serde(default)]
    pub case_sensitive: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SearchScope {
    /// Every searchable field. Boolean and date fields are left out.
    #[default]
    AllFields,

    /// One field, which is searched whatever its type.
    SingleField(FieldId),
}

impl SearchSpec {
    pub fn new(term: impl Into<String>) -> SearchSpec {
        SearchSpec {
            term: term.into(),
            scope: SearchScope::AllFields,
            case_sensitive: false,
        }
    }

    pub fn field(mut self, field_id: impl Into<FieldId>) -> Self {
        self.scope = SearchScope::SingleField(field_id.into());
        self
    }

    pub fn case_sensitive(mut self) -> Self {
        self.case_sensitive = true;
        self
    }
}

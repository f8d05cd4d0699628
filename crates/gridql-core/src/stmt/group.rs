use crate::schema::FieldId;

use serde::{Deserialize, Serialize};

/// Fields to group by, outermost first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSpec {
    pub field_ids: Vec<FieldId>,

    /// When true, each field compiles to a distinct count of its group key
    /// instead of a bucket.
    #[serde(default)]
    pub distinct: bool,
}

impl GroupSpec {
    pub fn new(field_ids: impl IntoIterator<Item = impl Into<FieldId>>) -> GroupSpec {
        GroupSpec {
            field_ids: field_ids.into_iter().map(Into::into).collect(),
            distinct: false,
        }
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }
}

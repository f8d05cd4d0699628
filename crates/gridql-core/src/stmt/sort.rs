use crate::schema::FieldId;

use serde::{Deserialize, Serialize};

/// Ordered sort terms. Earlier terms take precedence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SortSpec(pub Vec<SortItem>);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortItem {
    pub field_id: FieldId,

    #[serde(alias = "order")]
    pub direction: Direction,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl SortSpec {
    pub fn new() -> SortSpec {
        SortSpec::default()
    }

    pub fn asc(mut self, field_id: impl Into<FieldId>) -> Self {
        self.0.push(SortItem {
            field_id: field_id.into(),
            direction: Direction::Asc,
        });
        self
    }

    pub fn desc(mut self, field_id: impl Into<FieldId>) -> Self {
        self.0.push(SortItem {
            field_id: field_id.into(),
            direction: Direction::Desc,
        });
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &SortItem> {
        self.0.iter()
    }
}

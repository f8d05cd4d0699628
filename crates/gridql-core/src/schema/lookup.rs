use super::{FieldId, FieldSpec};

use indexmap::IndexMap;
use std::collections::HashMap;

/// Resolves field ids to field descriptions.
///
/// Supplied by the caller for every compile call. A miss drops the predicate
/// in filters and skips the field in sorts and groups.
pub trait FieldLookup: Sync {
    fn field(&self, id: &FieldId) -> Option<&FieldSpec>;

    /// Every field of the table, in the order searches visit them.
    fn fields(&self) -> Box<dyn Iterator<Item = &FieldSpec> + '_>;
}

impl FieldLookup for IndexMap<FieldId, FieldSpec> {
    fn field(&self, id: &FieldId) -> Option<&FieldSpec> {
        self.get(id)
    }

    fn fields(&self) -> Box<dyn Iterator<Item = &FieldSpec> + '_> {
        Box::new(self.values())
    }
}

/// Iteration order is unspecified. Prefer an `IndexMap` when the order of
/// generated search predicates matters.
impl FieldLookup for HashMap<FieldId, FieldSpec> {
    fn field(&self, id: &FieldId) -> Option<&FieldSpec> {
        self.get(id)
    }

    fn fields(&self) -> Box<dyn Iterator<Item = &FieldSpec> + '_> {
        Box::new(self.values())
    }
}

impl FieldLookup for [FieldSpec] {
    fn field(&self, id: &FieldId) -> Option<&FieldSpec> {
        self.iter().find(|field| field.id == *id)
    }

    fn fields(&self) -> Box<dyn Iterator<Item = &FieldSpec> + '_> {
        Box::new(self.iter())
    }
}

impl FieldLookup for Vec<FieldSpec> {
    fn field(&self, id: &FieldId) -> Option<&FieldSpec> {
        self.as_slice().field(id)
    }

    fn fields(&self) -> Box<dyn Iterator<Item = &FieldSpec> + '_> {
        self.as_slice().fields()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldKind;

    #[test]
    fn index_map_keeps_insertion_order() {
        let fields: IndexMap<FieldId, FieldSpec> = ["fldB", "fldA", "fldC"]
            .into_iter()
            .map(|id| (FieldId::from(id), FieldSpec::new(id, id, FieldKind::Text)))
            .collect();

        let ids: Vec<_> = fields.fields().map(|field| field.id.to_string()).collect();
        assert_eq!(ids, ["fldB", "fldA", "fldC"]);
        assert!(fields.field(&"fldA".into()).is_some());
        assert!(fields.field(&"fldZ".into()).is_none());
    }
}

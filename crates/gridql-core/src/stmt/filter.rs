use super::{DateFilterValue, Operator};
use crate::schema::FieldId;

use serde::{Deserialize, Serialize};

/// A boolean tree of predicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterNode {
    Group(FilterGroup),
    Predicate(Predicate),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterGroup {
    pub conjunction: Conjunction,

    #[serde(alias = "filterSet")]
    pub children: Vec<FilterNode>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Conjunction {
    And,
    Or,
}

/// Compares one field against a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Predicate {
    pub field_id: FieldId,

    pub operator: Operator,

    #[serde(default)]
    pub value: FilterValue,
}

/// The right-hand side of a predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Another field's value in the same row.
    FieldReference(FieldRef),

    Literal(Literal),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FieldRef {
    pub field_id: FieldId,
}

/// A user-supplied value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    #[default]
    Null,
    Scalar(Scalar),
    List(Vec<Scalar>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Number(f64),
    String(String),
    Date(DateFilterValue),
}

impl FilterNode {
    pub fn and(children: impl IntoIterator<Item = FilterNode>) -> FilterNode {
        FilterNode::Group(FilterGroup {
            conjunction: Conjunction::And,
            children: children.into_iter().collect(),
        })
    }

    pub fn or(children: impl IntoIterator<Item = FilterNode>) -> FilterNode {
        FilterNode::Group(FilterGroup {
            conjunction: Conjunction::Or,
            children: children.into_iter().collect(),
        })
    }

    pub fn predicate(
        field_id: impl Into<FieldId>,
        operator: Operator,
        value: impl Into<FilterValue>,
    ) -> FilterNode {
        FilterNode::Predicate(Predicate {
            field_id: field_id.into(),
            operator,
            value: value.into(),
        })
    }

    /// Number of predicates in the tree.
    pub fn len(&self) -> usize {
        match self {
            FilterNode::Group(group) => group.children.iter().map(FilterNode::len).sum(),
            FilterNode::Predicate(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FilterValue {
    pub fn reference(field_id: impl Into<FieldId>) -> FilterValue {
        FilterValue::FieldReference(FieldRef {
            field_id: field_id.into(),
        })
    }

    pub fn null() -> FilterValue {
        FilterValue::Literal(Literal::Null)
    }

    pub fn list<T: Into<Scalar>>(items: impl IntoIterator<Item = T>) -> FilterValue {
        FilterValue::Literal(Literal::List(items.into_iter().map(Into::into).collect()))
    }

    pub fn as_reference(&self) -> Option<&FieldId> {
        match self {
            FilterValue::FieldReference(field_ref) => Some(&field_ref.field_id),
            FilterValue::Literal(_) => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            FilterValue::Literal(literal) => Some(literal),
            FilterValue::FieldReference(_) => None,
        }
    }
}

impl Default for FilterValue {
    fn default() -> Self {
        FilterValue::null()
    }
}

impl Literal {
    /// True for null and for an empty list.
    pub fn is_null(&self) -> bool {
        match self {
            Literal::Null => true,
            Literal::List(items) => items.is_empty(),
            Literal::Scalar(_) => false,
        }
    }
}

impl Scalar {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(v) => Some(v),
            _ => None,
        }
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Number(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Number(value.into())
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::String(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::String(value)
    }
}

impl From<DateFilterValue> for Scalar {
    fn from(value: DateFilterValue) -> Self {
        Scalar::Date(value)
    }
}

macro_rules! impl_filter_value_from {
    ( $($t:ty),+ ) => {
        $(
            impl From<$t> for FilterValue {
                fn from(value: $t) -> Self {
                    FilterValue::Literal(Literal::Scalar(value.into()))
                }
            }
        )+
    };
}

impl_filter_value_from!(bool, f64, i32, &str, String, DateFilterValue, Scalar);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stmt::DateMode;

    #[test]
    fn deserializes_nested_tree() {
        let json = r#"{
            "conjunction": "and",
            "filterSet": [
                {"fieldId": "fldA", "operator": "=", "value": 3},
                {"fieldId": "fldB", "operator": "isAnyOf", "value": ["x", "y"]},
                {"fieldId": "fldC", "operator": "isEmpty", "value": null},
                {"fieldId": "fldD", "operator": "is", "value": {"fieldId": "fldE"}},
                {
                    "conjunction": "or",
                    "children": [
                        {"fieldId": "fldF", "operator": "isWithIn", "value": {"mode": "pastWeek"}}
                    ]
                }
            ]
        }"#;

        let node: FilterNode = serde_json::from_str(json).unwrap();
        assert_eq!(node.len(), 5);

        let FilterNode::Group(group) = &node else {
            panic!("expected group; node={node:#?}");
        };
        assert_eq!(group.conjunction, Conjunction::And);

        assert_eq!(
            group.children[0],
            FilterNode::predicate("fldA", Operator::Is, 3.0)
        );
        assert_eq!(
            group.children[1],
            FilterNode::predicate("fldB", Operator::IsAnyOf, FilterValue::list(["x", "y"]))
        );
        assert_eq!(
            group.children[2],
            FilterNode::predicate("fldC", Operator::IsEmpty, FilterValue::null())
        );
        assert_eq!(
            group.children[3],
            FilterNode::predicate("fldD", Operator::Is, FilterValue::reference("fldE"))
        );
        assert_eq!(
            group.children[4],
            FilterNode::or([FilterNode::predicate(
                "fldF",
                Operator::IsWithin,
                DateFilterValue::new(DateMode::PastWeek)
            )])
        );
    }

    #[test]
    fn empty_list_counts_as_null() {
        assert!(Literal::List(vec![]).is_null());
        assert!(!Literal::Scalar(Scalar::Bool(false)).is_null());
    }
}

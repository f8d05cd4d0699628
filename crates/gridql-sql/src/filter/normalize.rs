use gridql_core::{
    schema::{CellValueType, FieldLookup},
    stmt::{FilterGroup, FilterNode, FilterValue, Literal, Operator, Predicate, Scalar},
};
use tracing::trace;

/// Substitution applied to people filters.
#[derive(Debug, Copy, Clone)]
pub(super) struct CurrentUser<'a> {
    /// Literal standing for the requesting user
    pub(super) placeholder: &'a str,

    pub(super) id: &'a str,
}

/// Returns a copy of `node` with nothing left that cannot be compiled.
///
/// Predicates on unknown fields and predicates without a value are dropped,
/// as are groups left without children. `None` means nothing remains.
pub(super) fn normalize(
    node: &FilterNode,
    fields: &dyn FieldLookup,
    current_user: Option<CurrentUser<'_>>,
) -> Option<FilterNode> {
    match node {
        FilterNode::Group(group) => {
            let children: Vec<_> = group
                .children
                .iter()
                .filter_map(|child| normalize(child, fields, current_user))
                .collect();

            if children.is_empty() {
                trace!(conjunction = ?group.conjunction, "dropping empty filter group");
                return None;
            }

            Some(FilterNode::Group(FilterGroup {
                conjunction: group.conjunction,
                children,
            }))
        }
        FilterNode::Predicate(predicate) => {
            normalize_predicate(predicate, fields, current_user).map(FilterNode::Predicate)
        }
    }
}

fn normalize_predicate(
    predicate: &Predicate,
    fields: &dyn FieldLookup,
    current_user: Option<CurrentUser<'_>>,
) -> Option<Predicate> {
    let Some(field) = fields.field(&predicate.field_id) else {
        trace!(field_id = %predicate.field_id, "dropping predicate on unknown field");
        return None;
    };

    // Patterns match the displayed name, never the id
    let is_pattern = matches!(
        predicate.operator,
        Operator::Contains | Operator::DoesNotContain
    );

    let value = match (&predicate.value, current_user) {
        (FilterValue::Literal(literal), Some(user)) if field.is_people() && !is_pattern => {
            FilterValue::Literal(substitute(literal, user))
        }
        (value, _) => value.clone(),
    };

    if let FilterValue::Literal(literal) = &value {
        // A null checkbox literal means "unchecked", except for set operators
        let keeps_null = field.cell_value_type == CellValueType::Boolean
            && !predicate.operator.takes_list();

        if literal.is_null() && !keeps_null && !predicate.operator.is_emptiness() {
            trace!(
                field_id = %predicate.field_id,
                operator = %predicate.operator,
                "dropping predicate without a value"
            );
            return None;
        }
    }

    Some(Predicate {
        field_id: predicate.field_id.clone(),
        operator: predicate.operator,
        value,
    })
}

fn substitute(literal: &Literal, user: CurrentUser<'_>) -> Literal {
    let replace = |scalar: &Scalar| match scalar {
        Scalar::String(value) if value == user.placeholder => Scalar::String(user.id.to_string()),
        scalar => scalar.clone(),
    };

    match literal {
        Literal::Scalar(scalar) => Literal::Scalar(replace(scalar)),
        Literal::List(items) => Literal::List(items.iter().map(replace).collect()),
        Literal::Null => Literal::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridql_core::schema::{FieldKind, FieldSpec};
    use pretty_assertions::assert_eq;

    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("fldOwner", "Owner", FieldKind::User),
            FieldSpec::new("fldTitle", "Title", FieldKind::Text),
            FieldSpec::new("fldDone", "Done", FieldKind::Checkbox),
        ]
    }

    const ME: CurrentUser<'static> = CurrentUser {
        placeholder: "me",
        id: "usr42",
    };

    #[test]
    fn me_is_replaced_in_people_filters() {
        let fields = fields();
        let node = FilterNode::and([
            FilterNode::predicate("fldOwner", Operator::Is, "me"),
            FilterNode::predicate("fldOwner", Operator::IsAnyOf, FilterValue::list(["me", "usr7"])),
            FilterNode::predicate("fldTitle", Operator::Is, "me"),
        ]);

        let normalized = normalize(&node, &fields, Some(ME)).unwrap();

        assert_eq!(
            normalized,
            FilterNode::and([
                FilterNode::predicate("fldOwner", Operator::Is, "usr42"),
                FilterNode::predicate(
                    "fldOwner",
                    Operator::IsAnyOf,
                    FilterValue::list(["usr42", "usr7"])
                ),
                FilterNode::predicate("fldTitle", Operator::Is, "me"),
            ])
        );
    }

    #[test]
    fn me_is_kept_in_name_patterns() {
        let fields = fields();
        let node = FilterNode::or([
            FilterNode::predicate("fldOwner", Operator::Contains, "me"),
            FilterNode::predicate("fldOwner", Operator::DoesNotContain, "me"),
        ]);
        assert_eq!(normalize(&node, &fields, Some(ME)), Some(node));
    }

    #[test]
    fn me_is_kept_without_a_current_user() {
        let fields = fields();
        let node = FilterNode::predicate("fldOwner", Operator::Is, "me");
        assert_eq!(normalize(&node, &fields, None), Some(node));
    }

    #[test]
    fn null_literals_are_dropped_except_for_checkboxes() {
        let fields = fields();
        let node = FilterNode::or([
            FilterNode::predicate("fldTitle", Operator::Is, FilterValue::null()),
            FilterNode::predicate("fldTitle", Operator::IsAnyOf, FilterValue::list(Vec::<&str>::new())),
            FilterNode::predicate("fldTitle", Operator::IsEmpty, FilterValue::null()),
            FilterNode::predicate("fldDone", Operator::Is, FilterValue::null()),
        ]);

        assert_eq!(
            normalize(&node, &fields, None),
            Some(FilterNode::or([
                FilterNode::predicate("fldTitle", Operator::IsEmpty, FilterValue::null()),
                FilterNode::predicate("fldDone", Operator::Is, FilterValue::null()),
            ]))
        );
    }

    #[test]
    fn unknown_fields_and_empty_groups_disappear() {
        let fields = fields();
        let node = FilterNode::and([
            FilterNode::predicate("fldGone", Operator::Is, "x"),
            FilterNode::or([FilterNode::predicate("fldTitle", Operator::Is, FilterValue::null())]),
        ]);

        assert_eq!(normalize(&node, &fields, None), None);
    }

    #[test]
    fn input_tree_is_left_alone() {
        let fields = fields();
        let node = FilterNode::and([
            FilterNode::predicate("fldGone", Operator::Is, "x"),
            FilterNode::predicate("fldOwner", Operator::Is, "me"),
        ]);
        let before = node.clone();

        let _ = normalize(&node, &fields, Some(ME));
        assert_eq!(node, before);
    }
}

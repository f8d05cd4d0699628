use super::cell::Operand;

use gridql_core::{
    schema::{CellValueType, FieldLookup, FieldSpec},
    stmt::{DateMode, FilterValue, Literal, Operator, Predicate, Scalar},
    Error, Result,
};

/// Checks a predicate against its field and resolves the operand.
///
/// Returns the operator in the spelling the field's cell value type uses.
pub(super) fn validate<'a>(
    predicate: &'a Predicate,
    field: &FieldSpec,
    references: &'a dyn FieldLookup,
) -> Result<(Operator, Operand<'a>)> {
    let operator = predicate.operator.canonical(field.cell_value_type);
    let allowed = Operator::allowed_for(field.cell_value_type, field.multiplicity);

    if !allowed.contains(&operator) {
        return Err(match predicate.value.as_reference() {
            Some(id) => {
                let name = references.field(id).map_or(id.0.as_str(), |r| r.name.as_str());
                Error::field_reference_compatibility(&field.name, name)
            }
            None => Error::invalid_operator(&field.name, operator, allowed),
        });
    }

    if operator.is_emptiness() {
        return Ok((operator, Operand::None));
    }

    let literal = match &predicate.value {
        FilterValue::FieldReference(field_ref) => {
            let Some(reference) = references.field(&field_ref.field_id) else {
                return Err(Error::field_reference_compatibility(
                    &field.name,
                    &field_ref.field_id.0,
                ));
            };

            if reference.cell_value_type != field.cell_value_type {
                return Err(Error::field_reference_compatibility(
                    &field.name,
                    &reference.name,
                ));
            }

            if !operator.accepts_reference() {
                return Err(Error::literal_required(&field.name, operator));
            }

            return Ok((operator, Operand::Reference(reference)));
        }
        FilterValue::Literal(literal) => literal,
    };

    let operand = match literal {
        Literal::List(items) if operator.takes_list() => Operand::List(items),
        _ if operator.takes_list() => return Err(Error::list_required(&field.name, operator)),
        Literal::Scalar(scalar) => Operand::Scalar(scalar),
        Literal::Null => Operand::Null,
        Literal::List(_) => return Err(Error::invalid_literal(&field.name, "single value")),
    };

    if field.cell_value_type == CellValueType::DateTime {
        check_date_mode(field, operator, operand)?;
    }

    Ok((operator, operand))
}

fn check_date_mode(field: &FieldSpec, operator: Operator, operand: Operand<'_>) -> Result<()> {
    let Operand::Scalar(Scalar::Date(value)) = operand else {
        return Err(Error::invalid_literal(&field.name, "date filter value"));
    };

    let allowed = DateMode::allowed_for(operator);
    if !allowed.contains(&value.mode) {
        return Err(Error::invalid_date_mode(
            &field.name,
            operator,
            value.mode,
            allowed,
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridql_core::{
        schema::FieldKind,
        stmt::{DateFilterValue, FilterNode},
    };

    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("fldPrice", "Price", FieldKind::Number),
            FieldSpec::new("fldCost", "Cost", FieldKind::Number),
            FieldSpec::new("fldDue", "Due", FieldKind::Date),
            FieldSpec::new("fldTags", "Tags", FieldKind::MultipleSelect),
            FieldSpec::new("fldDone", "Done", FieldKind::Checkbox),
        ]
    }

    fn predicate(node: FilterNode) -> Predicate {
        match node {
            FilterNode::Predicate(predicate) => predicate,
            FilterNode::Group(_) => panic!("expected a predicate"),
        }
    }

    fn check(node: FilterNode) -> Result<(Operator, String)> {
        let fields = fields();
        let predicate = predicate(node);
        let field = fields.field(&predicate.field_id).unwrap();
        validate(&predicate, field, &fields).map(|(op, operand)| (op, format!("{operand:?}")))
    }

    #[test]
    fn ordering_operators_take_the_date_spelling() {
        let (op, _) = check(FilterNode::predicate(
            "fldDue",
            Operator::IsGreater,
            DateFilterValue::new(DateMode::Today),
        ))
        .unwrap();
        assert_eq!(op, Operator::IsAfter);

        let (op, _) = check(FilterNode::predicate("fldPrice", Operator::IsAfter, 3)).unwrap();
        assert_eq!(op, Operator::IsGreater);
    }

    #[test]
    fn disallowed_operator_lists_the_allowed_set() {
        let err = check(FilterNode::predicate("fldDone", Operator::Contains, "x")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "operator `contains` is not allowed for field \"Done\"; allowed: is, isNot, isEmpty, isNotEmpty"
        );
    }

    #[test]
    fn disallowed_operator_against_a_field_is_a_reference_error() {
        let err = check(FilterNode::predicate(
            "fldPrice",
            Operator::HasAllOf,
            FilterValue::reference("fldCost"),
        ))
        .unwrap_err();
        assert!(err.is_field_reference_compatibility());
    }

    #[test]
    fn references_must_share_the_cell_type() {
        let err = check(FilterNode::predicate(
            "fldPrice",
            Operator::Is,
            FilterValue::reference("fldDue"),
        ))
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "field \"Price\" cannot be compared with field \"Due\""
        );

        let err = check(FilterNode::predicate(
            "fldPrice",
            Operator::Is,
            FilterValue::reference("fldMissing"),
        ))
        .unwrap_err();
        assert!(err.is_field_reference_compatibility());
    }

    #[test]
    fn within_rejects_references() {
        let err = check(FilterNode::predicate(
            "fldDue",
            Operator::IsWithin,
            FilterValue::reference("fldDue"),
        ))
        .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn list_operators_reject_scalars() {
        let err = check(FilterNode::predicate("fldTags", Operator::HasAnyOf, "a")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "operator `hasAnyOf` on field \"Tags\" requires a list value"
        );
    }

    #[test]
    fn date_modes_depend_on_the_operator() {
        let err = check(FilterNode::predicate(
            "fldDue",
            Operator::IsWithin,
            DateFilterValue::new(DateMode::Today),
        ))
        .unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().starts_with(
            "date mode `today` is not allowed for operator `isWithin` on field \"Due\""
        ));

        assert!(check(FilterNode::predicate(
            "fldDue",
            Operator::IsWithin,
            DateFilterValue::new(DateMode::PastWeek),
        ))
        .is_ok());
    }

    #[test]
    fn emptiness_ignores_the_value() {
        let (op, operand) =
            check(FilterNode::predicate("fldPrice", Operator::IsEmpty, 3)).unwrap();
        assert_eq!(op, Operator::IsEmpty);
        assert_eq!(operand, "None");
    }
}

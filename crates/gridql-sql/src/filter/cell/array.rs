//! Predicates over JSON array cells.
//!
//! Element predicates iterate the array with a correlated subquery. Set
//! predicates compare the array with a literal list or with another array
//! field, ignoring element order and duplicates.

use super::{compare, compare_reference, Cmp, List, Operand, Set};
use crate::serializer::{Column, Elem, Elements, Flavor, Formatter, Params, Quoted, ToSql};

use gridql_core::{schema::FieldSpec, stmt::Value, Error, Result};

/// `EXISTS (SELECT 1 FROM <elements> WHERE <cond>)`
pub(super) fn any<'a, P: Params>(
    f: &mut Formatter<'_, P>,
    field: &'a FieldSpec,
    cond: impl FnOnce(&mut Formatter<'_, P>, Elem<'a>) -> Result<()>,
) -> Result<()> {
    let elements = Elements::new(field, "x");
    fmt!(f, "EXISTS (SELECT 1 FROM " elements " WHERE ");
    cond(f, elements.elem())?;
    fmt!(f, ")");
    Ok(())
}

/// `NOT EXISTS (...)` over the array, a null cell counting as empty.
pub(super) fn none<'a, P: Params>(
    f: &mut Formatter<'_, P>,
    field: &'a FieldSpec,
    cond: impl FnOnce(&mut Formatter<'_, P>, Elem<'a>) -> Result<()>,
) -> Result<()> {
    let elements = Elements::new(field, "x").coalesce();
    fmt!(f, "NOT EXISTS (SELECT 1 FROM " elements " WHERE ");
    cond(f, elements.elem())?;
    fmt!(f, ")");
    Ok(())
}

/// "Some element satisfies the comparison."
pub(super) fn any_compare<P: Params>(
    f: &mut Formatter<'_, P>,
    field: &FieldSpec,
    cmp: Cmp,
    rhs: Operand<'_>,
) -> Result<()> {
    let rhs = rhs.rhs(field)?;
    any(f, field, |f, elem| {
        compare(f, elem, cmp, &rhs);
        Ok(())
    })
}

/// "No element is equal", the negation of `is`.
pub(super) fn none_equal<P: Params>(
    f: &mut Formatter<'_, P>,
    field: &FieldSpec,
    rhs: Operand<'_>,
) -> Result<()> {
    let rhs = rhs.rhs(field)?;
    none(f, field, |f, elem| {
        compare(f, elem, Cmp::Eq, &rhs);
        Ok(())
    })
}

/// Some element is in the set.
pub(super) fn intersects<P: Params>(
    f: &mut Formatter<'_, P>,
    field: &FieldSpec,
    set: &Set<'_>,
) -> Result<()> {
    any(f, field, |f, elem| {
        in_set(f, elem, set);
        Ok(())
    })
}

/// No element is in the set.
pub(super) fn disjoint<P: Params>(
    f: &mut Formatter<'_, P>,
    field: &FieldSpec,
    set: &Set<'_>,
) -> Result<()> {
    none(f, field, |f, elem| {
        in_set(f, elem, set);
        Ok(())
    })
}

fn in_set<P: Params>(f: &mut Formatter<'_, P>, elem: Elem<'_>, set: &Set<'_>) {
    match set {
        Set::Values(values) => fmt!(f, elem " IN " List(values)),
        Set::Reference(reference) => compare_reference(f, elem, Cmp::Eq, reference, None),
    }
}

/// Every element of the set is in the array.
pub(super) fn contains_all<P: Params>(
    f: &mut Formatter<'_, P>,
    field: &FieldSpec,
    set: &Set<'_>,
) -> Result<()> {
    match set {
        Set::Values(values) => {
            let elements = Elements::new(field, "x");
            let elem = elements.elem();
            let n = distinct(values);

            fmt!(
                f,
                "(SELECT COUNT(DISTINCT " elem ") FROM " elements " WHERE " elem " IN "
                List(values) ") = " n
            );
        }
        Set::Reference(reference) => {
            let reference = multiple(field, reference)?;

            match f.serializer.flavor {
                Flavor::Postgresql => {
                    fmt!(f, Ids(field, "x") " @> " Ids(reference, "y"));
                }
                Flavor::Sqlite => subset(f, reference, field),
            }
        }
    }

    Ok(())
}

/// The array holds exactly the elements of the set.
pub(super) fn equals<P: Params>(
    f: &mut Formatter<'_, P>,
    field: &FieldSpec,
    set: &Set<'_>,
    negate: bool,
) -> Result<()> {
    if negate {
        fmt!(f, "NOT ");
    }

    match set {
        Set::Values(values) => {
            let elements = Elements::new(field, "x");
            let elem = elements.elem();
            let n = distinct(values);

            // One aggregate pass: every distinct element is in the list, and
            // there are as many distinct elements as distinct list values.
            fmt!(
                f,
                "(SELECT COUNT(DISTINCT CASE WHEN " elem " IN " List(values) " THEN " elem
                " END) = " n " AND COUNT(DISTINCT " elem ") = " n " FROM " elements ")"
            );
        }
        Set::Reference(reference) => {
            let reference = multiple(field, reference)?;

            match f.serializer.flavor {
                Flavor::Postgresql => {
                    let lhs = Ids(field, "x");
                    let rhs = Ids(reference, "y");
                    fmt!(f, "(" lhs " @> " rhs " AND " lhs " <@ " rhs ")");
                }
                Flavor::Sqlite => {
                    fmt!(f, "(");
                    subset(f, reference, field);
                    fmt!(f, " AND ");
                    subset(f, field, reference);
                    fmt!(f, ")");
                }
            }
        }
    }

    Ok(())
}

/// Every element of `sub` appears in `sup`. Null cells count as empty.
fn subset<P: Params>(f: &mut Formatter<'_, P>, sub: &FieldSpec, sup: &FieldSpec) {
    let outer = Elements::new(sub, "y").coalesce();
    let inner = Elements::new(sup, "x").coalesce();

    fmt!(
        f,
        "NOT EXISTS (SELECT 1 FROM " outer " WHERE NOT EXISTS (SELECT 1 FROM " inner
        " WHERE " inner.elem() " = " outer.elem() "))"
    );
}

fn multiple<'a>(field: &FieldSpec, reference: &'a FieldSpec) -> Result<&'a FieldSpec> {
    if reference.is_multiple() {
        Ok(reference)
    } else {
        Err(Error::field_reference_compatibility(
            &field.name,
            &reference.name,
        ))
    }
}

/// Number of distinct values in a literal list.
fn distinct(values: &[Value]) -> usize {
    let mut seen: Vec<&Value> = Vec::with_capacity(values.len());
    for value in values {
        if !seen.contains(&value) {
            seen.push(value);
        }
    }
    seen.len()
}

/// The comparable elements of an array cell as a `jsonb` array, never null.
///
/// Unstructured arrays are used as stored. Structured arrays are reduced to
/// the key they compare by.
#[derive(Debug, Copy, Clone)]
struct Ids<'a>(&'a FieldSpec, &'static str);

impl ToSql for Ids<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let Ids(field, alias) = self;

        if field.structured {
            let elements = Elements::new(field, alias);
            fmt!(
                f,
                "COALESCE((SELECT jsonb_agg(" alias ".v->" Quoted(field.structured_key()) ") FROM "
                elements "), '[]'::jsonb)"
            );
        } else {
            fmt!(f, "COALESCE(" Column(field) ", '[]'::jsonb)");
        }
    }
}

use gridql_core::{
    schema::{DateFormatting, FieldId, FieldKind, FieldSpec, TimeFormat},
    stmt::{SearchSpec, Value},
    CompileOptions,
};
use gridql_sql::Serializer;
use indexmap::IndexMap;
use pretty_assertions::assert_eq;

fn fields() -> IndexMap<FieldId, FieldSpec> {
    [
        FieldSpec::new("fldTitle", "Title", FieldKind::Text).db_field_name("title"),
        FieldSpec::new("fldDone", "Done", FieldKind::Checkbox).db_field_name("done"),
        FieldSpec::new("fldDue", "Due", FieldKind::Date)
            .db_field_name("due")
            .date_formatting(DateFormatting::new("UTC").time(TimeFormat::Hour24)),
        FieldSpec::new("fldPrice", "Price", FieldKind::Number)
            .db_field_name("price")
            .precision(0),
        FieldSpec::new("fldOwner", "Owner", FieldKind::User).db_field_name("owner"),
        FieldSpec::new("fldTags", "Tags", FieldKind::MultipleSelect).db_field_name("tags"),
        FieldSpec::new("fldProjects", "Projects", FieldKind::Link).db_field_name("projects"),
    ]
    .into_iter()
    .map(|field| (field.id.clone(), field))
    .collect()
}

#[test]
fn all_fields_skips_checkboxes_and_dates() {
    let fields = fields();
    let query = Serializer::postgresql(&fields)
        .search()
        .compile(&SearchSpec::new(" ann "))
        .unwrap()
        .unwrap();

    assert_eq!(
        query.predicate.sql,
        "(\"title\" ILIKE ? ESCAPE '\\' \
         OR ROUND(\"price\"::numeric, 0)::text ILIKE ? ESCAPE '\\' \
         OR \"owner\"->>'title' ILIKE ? ESCAPE '\\' \
         OR translate(\"tags\"::text, '[]\"', '') ILIKE ? ESCAPE '\\' \
         OR translate(jsonb_path_query_array(\"projects\", '$[*].title')::text, '[]\"', '') ILIKE ? ESCAPE '\\')"
    );
    assert_eq!(query.predicate.params, vec![Value::String("%ann%".into()); 5]);

    let ids: Vec<_> = query.projections.iter().map(|(id, _)| id.0.as_str()).collect();
    assert_eq!(ids, ["fldTitle", "fldPrice", "fldOwner", "fldTags", "fldProjects"]);

    let (_, title) = &query.projections[0];
    assert_eq!(
        title.sql,
        r#"CASE WHEN "title" ILIKE ? ESCAPE '\' THEN 'title' END"#
    );
    assert_eq!(title.params, [Value::String("%ann%".into())]);
}

#[test]
fn dates_are_searched_when_named() {
    let fields = fields();
    let query = Serializer::postgresql(&fields)
        .search()
        .compile(&SearchSpec::new("2024-03").field("fldDue"))
        .unwrap()
        .unwrap();

    assert_eq!(
        query.predicate.sql,
        r#"to_char("due" AT TIME ZONE 'UTC', 'YYYY-MM-DD HH24:MI') ILIKE ? ESCAPE '\'"#
    );
    assert_eq!(query.projections.len(), 1);
}

#[test]
fn case_sensitive_search_binds_the_raw_term() {
    let fields = fields();
    let query = Serializer::sqlite(&fields)
        .search()
        .compile(&SearchSpec::new("50%").field("fldTitle").case_sensitive())
        .unwrap()
        .unwrap();

    assert_eq!(query.predicate.sql, r#"instr("title", ?) > 0"#);
    assert_eq!(query.predicate.params, [Value::String("50%".into())]);

    let query = Serializer::postgresql(&fields)
        .search()
        .compile(&SearchSpec::new("Ann").field("fldTitle").case_sensitive())
        .unwrap()
        .unwrap();
    assert_eq!(query.predicate.sql, r#"strpos("title", ?) > 0"#);
}

#[test]
fn multi_valued_text_joins_with_the_configured_separator() {
    let fields = fields();
    let serializer = Serializer::sqlite(&fields).with_options(CompileOptions {
        search_separator: "; ".to_string(),
        ..CompileOptions::default()
    });

    let query = serializer
        .search()
        .compile(&SearchSpec::new("red").field("fldTags"))
        .unwrap()
        .unwrap();

    assert_eq!(
        query.predicate.sql,
        r#"(SELECT group_concat(x.value, '; ') FROM json_each("tags") AS x) LIKE ? ESCAPE '\'"#
    );
}

#[test]
fn postgresql_arrays_swap_in_the_configured_separator() {
    let fields = fields();
    let serializer = Serializer::postgresql(&fields).with_options(CompileOptions {
        search_separator: "; ".to_string(),
        ..CompileOptions::default()
    });

    let query = serializer
        .search()
        .compile(&SearchSpec::new("red").field("fldTags"))
        .unwrap()
        .unwrap();

    assert_eq!(
        query.predicate.sql,
        r#"replace(translate("tags"::text, '[]"', ''), ', ', '; ') ILIKE ? ESCAPE '\'"#
    );
}

#[test]
fn unknown_fields_search_nothing() {
    let fields = fields();
    let query = Serializer::sqlite(&fields)
        .search()
        .compile(&SearchSpec::new("x").field("fldGone"))
        .unwrap();

    assert_eq!(query, None);
}

#[test]
fn search_specs_deserialize_from_json() {
    let spec: SearchSpec = serde_json::from_str(
        r#"{ "term": "ann", "scope": { "singleField": "fldOwner" }, "caseSensitive": false }"#,
    )
    .unwrap();

    let fields = fields();
    let query = Serializer::sqlite(&fields).search().compile(&spec).unwrap().unwrap();
    assert_eq!(
        query.predicate.sql,
        r#"json_extract("owner", '$.title') LIKE ? ESCAPE '\'"#
    );
}

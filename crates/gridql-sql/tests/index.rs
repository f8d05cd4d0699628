use gridql_core::{
    schema::{CellValueType, FieldKind, FieldSpec},
    stmt::SearchSpec,
    CompileOptions,
};
use gridql_sql::{IndexDescriptor, IndexDrift, Serializer};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::new("fldTitle", "Title", FieldKind::Text).db_field_name("title"),
        FieldSpec::new("fldDone", "Done", FieldKind::Checkbox).db_field_name("done"),
        FieldSpec::new("fldDue", "Due", FieldKind::Date).db_field_name("due"),
        FieldSpec::new("fldTags", "Tags", FieldKind::MultipleSelect).db_field_name("tags"),
        FieldSpec::new("fldProjects", "Projects", FieldKind::Link).db_field_name("projects"),
        FieldSpec::new("fldPrice", "Price", FieldKind::Number).db_field_name("price"),
    ]
}

fn index(name: &str, expression: &str) -> IndexDescriptor {
    IndexDescriptor {
        name: name.to_string(),
        table: "public.tasks".to_string(),
        expression: expression.to_string(),
    }
}

/// What the catalog reports for the expected indexes of `fields()`.
fn catalog() -> Vec<IndexDescriptor> {
    vec![
        index(
            "idx_trgm_tasks_title_fldTitle",
            "CREATE INDEX \"idx_trgm_tasks_title_fldTitle\" ON public.tasks USING gin (title gin_trgm_ops)",
        ),
        index(
            "idx_trgm_tasks_tags_fldTags",
            r#"CREATE INDEX "idx_trgm_tasks_tags_fldTags" ON public.tasks USING gin (translate((tags)::text, '[]"'::text, ''::text) gin_trgm_ops)"#,
        ),
        index(
            "idx_trgm_tasks_projects_fldProjects",
            r#"CREATE INDEX "idx_trgm_tasks_projects_fldProjects" ON public.tasks USING gin (translate((jsonb_path_query_array(projects, '$[*]."title"'::jsonpath))::text, '[]"'::text, ''::text) gin_trgm_ops)"#,
        ),
        index(
            "idx_trgm_tasks_price_fldPrice",
            "CREATE INDEX \"idx_trgm_tasks_price_fldPrice\" ON public.tasks \
             USING gin (((round((price)::numeric, 2))::text) gin_trgm_ops)",
        ),
        index("tasks_pkey", "CREATE UNIQUE INDEX tasks_pkey ON public.tasks USING btree (id)"),
    ]
}

#[test]
fn searchable_fields_get_one_index_each() {
    let fields = fields();
    let serializer = Serializer::postgresql(&fields);
    let planner = serializer.index_planner().unwrap();

    let expected = planner.expected("public.tasks", &fields).unwrap();
    assert_eq!(
        expected,
        [
            index("idx_trgm_tasks_title_fldTitle", r#""title""#),
            index(
                "idx_trgm_tasks_tags_fldTags",
                r#"translate("tags"::text, '[]"', '')"#
            ),
            index(
                "idx_trgm_tasks_projects_fldProjects",
                r#"translate(jsonb_path_query_array("projects", '$[*].title')::text, '[]"', '')"#
            ),
            index(
                "idx_trgm_tasks_price_fldPrice",
                r#"ROUND("price"::numeric, 2)::text"#
            ),
        ]
    );

    assert_eq!(
        planner.create_index(&expected[0]).unwrap(),
        r#"CREATE INDEX IF NOT EXISTS "idx_trgm_tasks_title_fldTitle" ON "public"."tasks" USING gin (("title") gin_trgm_ops)"#
    );
    assert_eq!(
        planner.drop_index(&expected[0].name).unwrap(),
        r#"DROP INDEX IF EXISTS "idx_trgm_tasks_title_fldTitle""#
    );
}

#[test]
fn catalog_formatting_is_not_drift() {
    let fields = fields();
    let serializer = Serializer::postgresql(&fields);
    let planner = serializer.index_planner().unwrap();

    let drift = planner.diff("public.tasks", &fields, &catalog()).unwrap();
    assert_eq!(drift, Vec::<IndexDrift>::new());
}

#[test]
fn missing_and_stale_indexes() {
    let fields = fields();
    let serializer = Serializer::postgresql(&fields);
    let planner = serializer.index_planner().unwrap();

    let mut existing = catalog();
    existing.remove(0);
    existing.push(index(
        "idx_trgm_tasks_old_fldOld",
        "CREATE INDEX idx_trgm_tasks_old_fldOld ON public.tasks USING gin (old gin_trgm_ops)",
    ));

    let drift = planner.diff("public.tasks", &fields, &existing).unwrap();
    assert_eq!(
        drift,
        [
            IndexDrift::Missing(index("idx_trgm_tasks_title_fldTitle", r#""title""#)),
            IndexDrift::Unexpected(existing[4].clone()),
        ]
    );
}

#[test]
fn changed_expressions_are_reported_once_names_agree() {
    let fields = fields();
    let serializer = Serializer::postgresql(&fields);
    let planner = serializer.index_planner().unwrap();

    let mut existing = catalog();
    existing[0].expression =
        "CREATE INDEX \"idx_trgm_tasks_title_fldTitle\" ON public.tasks USING gin (lower(title) gin_trgm_ops)"
            .to_string();

    let drift = planner.diff("public.tasks", &fields, &existing).unwrap();
    assert_eq!(
        drift,
        [IndexDrift::Changed {
            expected: index("idx_trgm_tasks_title_fldTitle", r#""title""#),
            actual: existing[0].clone(),
        }]
    );
}

#[test]
fn catalog_snapshots_deserialize_from_json() {
    let existing: Vec<IndexDescriptor> = serde_json::from_str(
        r#"[{
            "name": "idx_trgm_tasks_title_fldTitle",
            "table": "public.tasks",
            "expression": "CREATE INDEX idx ON public.tasks USING gin (title gin_trgm_ops)"
        }]"#,
    )
    .unwrap();

    let fields = vec![fields().remove(0)];
    let serializer = Serializer::postgresql(&fields);
    let drift = serializer
        .index_planner()
        .unwrap()
        .diff("public.tasks", &fields, &existing)
        .unwrap();
    assert_eq!(drift, Vec::<IndexDrift>::new());
}

#[test]
fn long_names_split_the_budget() {
    let fields = vec![FieldSpec::new("fldXYZ", "Long", FieldKind::Text).db_field_name("b".repeat(40))];
    let serializer = Serializer::postgresql(&fields);
    let planner = serializer.index_planner().unwrap();

    let name = planner.index_name_for(&"a".repeat(40), &fields[0]);
    assert_eq!(
        name,
        format!("idx_trgm_{}_{}_fldXYZ", "a".repeat(23), "b".repeat(23))
    );
    assert_eq!(name.len(), 63);

    // A short table leaves the rest of the budget to the column
    let name = planner.index_name_for("tasks", &fields[0]);
    assert_eq!(name, format!("idx_trgm_tasks_{}_fldXYZ", "b".repeat(40)));
}

#[test]
fn searches_match_the_indexed_expression() {
    let fields = vec![
        FieldSpec::new("fldTitle", "Title", FieldKind::Text).db_field_name("title"),
        FieldSpec::new("fldNotes", "Notes", FieldKind::LongText).db_field_name("notes"),
        FieldSpec::new("fldPrice", "Price", FieldKind::Number).db_field_name("price"),
        FieldSpec::new("fldOwner", "Owner", FieldKind::User).db_field_name("owner"),
        FieldSpec::new("fldTags", "Tags", FieldKind::MultipleSelect).db_field_name("tags"),
        FieldSpec::new("fldProjects", "Projects", FieldKind::Link).db_field_name("projects"),
        FieldSpec::new("fldScores", "Scores", FieldKind::Rollup)
            .db_field_name("scores")
            .cell_value_type(CellValueType::Number)
            .multiple(),
    ];

    for options in [
        CompileOptions::default(),
        CompileOptions {
            search_separator: " | ".to_string(),
            ..CompileOptions::default()
        },
    ] {
        let serializer = Serializer::postgresql(&fields).with_options(options);
        let planner = serializer.index_planner().unwrap();

        for field in &fields {
            let expression = planner.expression_for(field).unwrap().unwrap();
            let query = serializer
                .search()
                .compile(&SearchSpec::new("ann").field(field.id.0.as_str()))
                .unwrap()
                .unwrap();

            assert_eq!(
                query.predicate.sql,
                format!(r"{expression} ILIKE ? ESCAPE '\'"),
                "field={}",
                field.name
            );
        }
    }
}

#[test]
fn sqlite_has_no_index_planner() {
    let fields = fields();
    let serializer = Serializer::sqlite(&fields);

    let Err(err) = serializer.index_planner() else {
        panic!("sqlite should not plan trigram indexes");
    };
    assert!(err.is_unsupported_feature());
}

proptest! {
    #[test]
    fn index_names_fit_the_identifier_limit(
        table in "[a-z_]{0,200}",
        column in "[a-z_]{0,200}",
        id in "fld[A-Za-z0-9]{0,200}",
    ) {
        let fields = vec![FieldSpec::new(id, "Field", FieldKind::Text).db_field_name(column)];
        let serializer = Serializer::postgresql(&fields);
        let planner = serializer.index_planner().unwrap();

        let name = planner.index_name_for(&table, &fields[0]);
        prop_assert!(name.len() <= 63);
        prop_assert!(name.starts_with("idx_trgm_"));
        prop_assert_eq!(name.clone(), planner.index_name_for(&table, &fields[0]));
    }
}

//! Query builder tests
//!
//! Planning, SQL rendering and in-memory evaluation of fetch plans.

#[cfg(test)]
mod tests {
    use crate::errors::Violation;
    use crate::model::{DataType, FieldDefinition, QueryParams, Record, TableSchema, ValueMap};
    use crate::query_builder::{
        ContentFilter, FetchPlan, OrderBy, Pagination, QueryPlanner, SortKey, SortOrder,
        SqlGenerator, SqlParam,
    };
    use chrono::{Duration, Utc};
    use config::ContentConfig;
    use serde_json::{json, Value};
    use std::cmp::Ordering;
    use uuid::Uuid;

    fn people_schema() -> TableSchema {
        let now = Utc::now();
        TableSchema {
            id: Uuid::new_v4(),
            table_slug: "people".to_string(),
            table_name: "People".to_string(),
            fields: vec![
                FieldDefinition::new("name", "Name", DataType::Text).required(),
                FieldDefinition::new("status", "Status", DataType::Options)
                    .with_options(["open", "closed"]),
                FieldDefinition::new("age", "Age", DataType::Number),
            ],
            created_at: now,
            updated_at: now,
        }
    }

    fn record(table: &str, values: Value) -> Record {
        let now = Utc::now();
        let values: ValueMap = match values {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        };
        Record {
            id: Uuid::new_v4(),
            table_slug: table.to_string(),
            values,
            created_at: now,
            updated_at: now,
        }
    }

    fn plan(params: &QueryParams) -> Result<FetchPlan, Vec<Violation>> {
        let schema = people_schema();
        let config = ContentConfig::default();
        QueryPlanner::new(&schema, &config).plan(params)
    }

    // ========================================
    // Planning
    // ========================================

    #[test]
    fn test_default_plan() {
        let plan = plan(&QueryParams::new()).unwrap();

        assert_eq!(plan.table_slug, "people");
        assert_eq!(plan.filters, vec![ContentFilter::table("people")]);
        assert_eq!(plan.order_by, OrderBy::new(SortKey::CreatedAt, SortOrder::Desc));
        assert_eq!(plan.pagination.page, 1);
        assert_eq!(plan.pagination.page_size, 10);
    }

    #[test]
    fn test_empty_search_and_filter_values_are_ignored() {
        let params = QueryParams::new()
            .search("")
            .filter("status", "")
            .filter("not_a_field", "");
        let plan = plan(&params).unwrap();
        assert_eq!(plan.filters.len(), 1);
    }

    #[test]
    fn test_unknown_filter_and_sort_fields_rejected() {
        let params = QueryParams::new()
            .filter("name') OR 1=1 --", "x")
            .sort("password", SortOrder::Asc);
        let violations = plan(&params).unwrap_err();

        assert_eq!(
            violations,
            vec![
                Violation::UnknownQueryField("name') OR 1=1 --".to_string()),
                Violation::UnknownQueryField("password".to_string()),
            ]
        );
    }

    #[test]
    fn test_system_sort_defaults_to_ascending() {
        let mut params = QueryParams::new();
        params.sort_by = Some("updated_at".to_string());
        let ascending = plan(&params).unwrap();
        assert_eq!(ascending.order_by, OrderBy::new(SortKey::UpdatedAt, SortOrder::Asc));

        params.sort_by = Some("createdAt".to_string());
        params.sort_dir = Some(SortOrder::parse("DESC"));
        let descending = plan(&params).unwrap();
        assert_eq!(descending.order_by, OrderBy::new(SortKey::CreatedAt, SortOrder::Desc));
    }

    #[test]
    fn test_sort_dir_deserializes_leniently() {
        let params: QueryParams =
            serde_json::from_value(json!({"sortBy": "name", "sortDir": "DESC"})).unwrap();
        assert_eq!(params.sort_dir, Some(SortOrder::Desc));

        let params: QueryParams =
            serde_json::from_value(json!({"sortBy": "name", "sortDir": "upward"})).unwrap();
        assert_eq!(params.sort_dir, Some(SortOrder::Asc));
    }

    // ========================================
    // Pagination
    // ========================================

    #[test]
    fn test_pagination_clamping() {
        let config = ContentConfig::default();

        let p = Pagination::new(Some(0), Some(0), &config);
        assert_eq!((p.page, p.page_size), (1, 10));

        let p = Pagination::new(Some(-3), Some(-1), &config);
        assert_eq!((p.page, p.page_size), (1, 10));

        let p = Pagination::new(Some(4), Some(500), &config);
        assert_eq!((p.page, p.page_size), (4, 100));
        assert_eq!(p.offset(), 300);
    }

    #[test]
    fn test_total_pages() {
        let p = Pagination::new(Some(2), Some(10), &ContentConfig::default());
        assert_eq!(p.offset(), 10);
        assert_eq!(p.total_pages(25), 3);
        assert_eq!(p.total_pages(20), 2);
        assert_eq!(p.total_pages(1), 1);
        assert_eq!(p.total_pages(0), 0);
    }

    // ========================================
    // SQL Generation
    // ========================================

    #[test]
    fn test_full_statement_generation() {
        let params = QueryParams::new()
            .search("jo")
            .filter("status", "open")
            .sort("name", SortOrder::Desc)
            .page(2, 10);
        let plan = plan(&params).unwrap();

        let count = plan.count_statement();
        assert_eq!(
            count.sql,
            "SELECT COUNT(*) AS total FROM contents WHERE table_slug = $1 \
             AND values::text ILIKE $2 ESCAPE '\\' AND values->>($3::text) = $4"
        );
        assert_eq!(count.params.len(), 4);

        let select = plan.select_statement();
        assert_eq!(
            select.sql,
            "SELECT id, table_slug, values, created_at, updated_at FROM contents \
             WHERE table_slug = $1 AND values::text ILIKE $2 ESCAPE '\\' \
             AND values->>($3::text) = $4 \
             ORDER BY values->>($5::text) COLLATE \"C\" DESC, id ASC LIMIT $6 OFFSET $7"
        );
        assert_eq!(
            select.params,
            vec![
                SqlParam::Text("people".to_string()),
                SqlParam::Text("%jo%".to_string()),
                SqlParam::Text("status".to_string()),
                SqlParam::Text("open".to_string()),
                SqlParam::Text("name".to_string()),
                SqlParam::BigInt(10),
                SqlParam::BigInt(10),
            ]
        );
    }

    #[test]
    fn test_default_order_statement() {
        let select = FetchPlan::new("people").select_statement();
        assert!(select
            .sql
            .ends_with("WHERE table_slug = $1 ORDER BY created_at DESC, id ASC LIMIT $2 OFFSET $3"));
    }

    #[test]
    fn test_user_input_never_reaches_sql_text() {
        let hostile = "'; DROP TABLE contents; --";
        let params = QueryParams::new().search(hostile).filter("name", hostile);
        let plan = plan(&params).unwrap();

        for statement in [plan.count_statement(), plan.select_statement()] {
            assert!(!statement.sql.contains("DROP"));
            assert!(statement
                .params
                .contains(&SqlParam::Text(hostile.to_string())));
        }
    }

    #[test]
    fn test_search_escapes_like_metacharacters() {
        assert_eq!(SqlGenerator::escape_like("50%_off\\"), "50\\%\\_off\\\\");

        let plan = plan(&QueryParams::new().search("100%")).unwrap();
        let count = plan.count_statement();
        assert_eq!(count.params[1], SqlParam::Text("%100\\%%".to_string()));
    }

    #[test]
    fn test_lookup_statement() {
        let statement = SqlGenerator::lookup_statement(
            "authors",
            "name",
            &["Ann".to_string(), "Bob".to_string()],
        );
        assert_eq!(
            statement.sql,
            "SELECT id, table_slug, values, created_at, updated_at FROM contents \
             WHERE table_slug = $1 AND values->>($2::text) = ANY($3) \
             ORDER BY created_at ASC, id ASC"
        );
        assert_eq!(
            statement.params[2],
            SqlParam::TextArray(vec!["Ann".to_string(), "Bob".to_string()])
        );
    }

    #[test]
    fn test_empty_in_list_matches_nothing() {
        let mut params = Vec::new();
        let clause = SqlGenerator::build_where_clause(
            &[ContentFilter::field_in("name", vec![])],
            &mut params,
        );
        assert_eq!(clause, "WHERE 1=0");
        assert!(params.is_empty());
    }

    // ========================================
    // In-memory evaluation
    // ========================================

    #[test]
    fn test_search_is_case_insensitive_over_whole_document() {
        let plan = plan(&QueryParams::new().search("john")).unwrap();

        assert!(plan.matches(&record("people", json!({"name": "John Smith"}))));
        assert!(plan.matches(&record("people", json!({"name": "x", "status": "JOHNNY"}))));
        assert!(!plan.matches(&record("people", json!({"name": "Jane"}))));
        assert!(!plan.matches(&record("others", json!({"name": "John"}))));
    }

    #[test]
    fn test_filter_compares_text_form_without_coercion() {
        let plan = plan(&QueryParams::new().filter("age", "42")).unwrap();

        assert!(plan.matches(&record("people", json!({"name": "a", "age": 42}))));
        assert!(plan.matches(&record("people", json!({"name": "a", "age": "42"}))));
        assert!(!plan.matches(&record("people", json!({"name": "a", "age": 42.0}))));
        assert!(!plan.matches(&record("people", json!({"name": "a"}))));
    }

    #[test]
    fn test_field_order_is_lexical_with_absent_last() {
        let asc = OrderBy::new(SortKey::Field("age".to_string()), SortOrder::Asc);
        let nine = record("people", json!({"age": 9}));
        let ten = record("people", json!({"age": 10}));
        let none = record("people", json!({}));

        // "10" < "9" as text
        assert_eq!(asc.compare(&ten, &nine), Ordering::Less);
        assert_eq!(asc.compare(&nine, &none), Ordering::Less);

        let desc = OrderBy::new(SortKey::Field("age".to_string()), SortOrder::Desc);
        assert_eq!(desc.compare(&none, &nine), Ordering::Less);
    }

    #[test]
    fn test_timestamp_order() {
        let older = record("people", json!({}));
        let mut newer = record("people", json!({}));
        newer.created_at = older.created_at + Duration::seconds(5);

        assert_eq!(OrderBy::newest_first().compare(&newer, &older), Ordering::Less);
    }
}

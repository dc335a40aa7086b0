//! SQL generation
//!
//! Renders filters, ordering and pagination against the `contents` table.
//! Placeholders are numbered in the order their parameters are pushed.

use crate::query_builder::builder::FetchPlan;
use crate::query_builder::filter::ContentFilter;
use crate::query_builder::ordering::{OrderBy, SortKey};
use crate::query_builder::pagination::Pagination;

pub const CONTENTS_TABLE: &str = "contents";
pub const SCHEMA_COLUMNS: &str = "id, table_slug, table_name, fields, created_at, updated_at";
pub const RECORD_COLUMNS: &str = "id, table_slug, values, created_at, updated_at";

/// A parameter bound to a generated statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlParam {
    Text(String),
    TextArray(Vec<String>),
    BigInt(i64),
}

/// SQL text plus the parameters its placeholders refer to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlStatement {
    pub sql: String,
    pub params: Vec<SqlParam>,
}

pub struct SqlGenerator;

impl SqlGenerator {
    /// `SELECT COUNT(*)` over every record the plan's filters match
    pub fn count_statement(plan: &FetchPlan) -> SqlStatement {
        let mut params = Vec::new();
        let where_clause = Self::build_where_clause(&plan.filters, &mut params);

        let mut sql = String::with_capacity(64 + where_clause.len());
        sql.push_str("SELECT COUNT(*) AS total FROM ");
        sql.push_str(CONTENTS_TABLE);
        if !where_clause.is_empty() {
            sql.push(' ');
            sql.push_str(&where_clause);
        }

        SqlStatement { sql, params }
    }

    /// `SELECT` of one ordered page of records
    pub fn select_statement(plan: &FetchPlan) -> SqlStatement {
        let mut params = Vec::new();
        let where_clause = Self::build_where_clause(&plan.filters, &mut params);
        let order_clause = Self::build_order_clause(&plan.order_by, &mut params);
        let limit_clause = Self::build_limit_clause(&plan.pagination, &mut params);

        let sql = [
            format!("SELECT {} FROM {}", RECORD_COLUMNS, CONTENTS_TABLE),
            where_clause,
            order_clause,
            limit_clause,
        ]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        SqlStatement { sql, params }
    }

    /// Records of a table whose field text is one of `values`, oldest first
    pub fn lookup_statement(table_slug: &str, field: &str, values: &[String]) -> SqlStatement {
        let mut params = Vec::new();
        let filters = [
            ContentFilter::table(table_slug),
            ContentFilter::field_in(field, values.to_vec()),
        ];
        let where_clause = Self::build_where_clause(&filters, &mut params);

        SqlStatement {
            sql: format!(
                "SELECT {} FROM {} {} ORDER BY created_at ASC, id ASC",
                RECORD_COLUMNS, CONTENTS_TABLE, where_clause
            ),
            params,
        }
    }

    /// Build WHERE clause, all filters joined with AND
    pub fn build_where_clause(filters: &[ContentFilter], params: &mut Vec<SqlParam>) -> String {
        if filters.is_empty() {
            return String::new();
        }

        let conditions = filters
            .iter()
            .map(|filter| Self::build_filter_sql(filter, params))
            .collect::<Vec<_>>()
            .join(" AND ");

        format!("WHERE {}", conditions)
    }

    fn build_filter_sql(filter: &ContentFilter, params: &mut Vec<SqlParam>) -> String {
        match filter {
            ContentFilter::TableIs(slug) => {
                let slot = Self::push(params, SqlParam::Text(slug.clone()));
                format!("table_slug = {}", slot)
            }
            ContentFilter::DocumentContains(term) => {
                let pattern = format!("%{}%", Self::escape_like(term));
                let slot = Self::push(params, SqlParam::Text(pattern));
                format!("values::text ILIKE {} ESCAPE '\\'", slot)
            }
            ContentFilter::FieldEquals { field, value } => {
                let key = Self::push(params, SqlParam::Text(field.clone()));
                let slot = Self::push(params, SqlParam::Text(value.clone()));
                format!("values->>({}::text) = {}", key, slot)
            }
            ContentFilter::FieldIn { field, values } => {
                if values.is_empty() {
                    return "1=0".to_string();
                }
                let key = Self::push(params, SqlParam::Text(field.clone()));
                let slot = Self::push(params, SqlParam::TextArray(values.clone()));
                format!("values->>({}::text) = ANY({})", key, slot)
            }
        }
    }

    /// Build ORDER BY clause with `id` as the final tie-breaker
    pub fn build_order_clause(order_by: &OrderBy, params: &mut Vec<SqlParam>) -> String {
        let direction = order_by.order.to_sql();
        match &order_by.key {
            SortKey::CreatedAt => format!("ORDER BY created_at {}, id ASC", direction),
            SortKey::UpdatedAt => format!("ORDER BY updated_at {}, id ASC", direction),
            SortKey::Field(field) => {
                let key = Self::push(params, SqlParam::Text(field.clone()));
                format!(
                    "ORDER BY values->>({}::text) COLLATE \"C\" {}, id ASC",
                    key, direction
                )
            }
        }
    }

    /// Build LIMIT/OFFSET clause
    pub fn build_limit_clause(pagination: &Pagination, params: &mut Vec<SqlParam>) -> String {
        let limit = Self::push(params, SqlParam::BigInt(pagination.limit()));
        let offset = Self::push(params, SqlParam::BigInt(pagination.offset()));
        format!("LIMIT {} OFFSET {}", limit, offset)
    }

    /// Escape LIKE metacharacters so the term matches literally
    pub fn escape_like(term: &str) -> String {
        let mut escaped = String::with_capacity(term.len());
        for c in term.chars() {
            if matches!(c, '\\' | '%' | '_') {
                escaped.push('\\');
            }
            escaped.push(c);
        }
        escaped
    }

    fn push(params: &mut Vec<SqlParam>, param: SqlParam) -> String {
        params.push(param);
        format!("${}", params.len())
    }
}

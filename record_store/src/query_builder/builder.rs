//! Fetch plans
//!
//! A [`FetchPlan`] is the resolved combination of filters, ordering and
//! pagination for one page of a table's records. [`QueryPlanner`] builds one
//! from runtime [`QueryParams`], allow-listing every field name against the
//! table's schema.

use config::ContentConfig;

use crate::errors::Violation;
use crate::model::{QueryParams, Record, TableSchema};
use crate::query_builder::filter::ContentFilter;
use crate::query_builder::ordering::{OrderBy, SortKey};
use crate::query_builder::pagination::Pagination;
use crate::query_builder::sql_generation::{SqlGenerator, SqlStatement};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchPlan {
    pub table_slug: String,
    pub filters: Vec<ContentFilter>,
    pub order_by: OrderBy,
    pub pagination: Pagination,
}

impl FetchPlan {
    /// Every record of one table, newest first, default page
    pub fn new(table_slug: &str) -> Self {
        Self {
            table_slug: table_slug.to_string(),
            filters: vec![ContentFilter::table(table_slug)],
            order_by: OrderBy::default(),
            pagination: Pagination::default(),
        }
    }

    /// Add a filter condition (combined with AND)
    pub fn filter(mut self, filter: ContentFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order_by(mut self, order_by: OrderBy) -> Self {
        self.order_by = order_by;
        self
    }

    pub fn paginate(mut self, pagination: Pagination) -> Self {
        self.pagination = pagination;
        self
    }

    /// Whether a record satisfies every filter
    pub fn matches(&self, record: &Record) -> bool {
        self.filters.iter().all(|filter| filter.matches(record))
    }

    pub fn count_statement(&self) -> SqlStatement {
        SqlGenerator::count_statement(self)
    }

    pub fn select_statement(&self) -> SqlStatement {
        SqlGenerator::select_statement(self)
    }
}

/// Translates listing parameters into a [`FetchPlan`] for one table
pub struct QueryPlanner<'a> {
    schema: &'a TableSchema,
    config: &'a ContentConfig,
}

impl<'a> QueryPlanner<'a> {
    pub fn new(schema: &'a TableSchema, config: &'a ContentConfig) -> Self {
        Self { schema, config }
    }

    pub fn plan(&self, params: &QueryParams) -> Result<FetchPlan, Vec<Violation>> {
        let mut violations = Vec::new();
        let mut plan = FetchPlan::new(&self.schema.table_slug);

        if let Some(term) = params.search.as_deref().filter(|term| !term.is_empty()) {
            plan = plan.filter(ContentFilter::search(term));
        }

        for (field, value) in params.filters.iter().filter(|(_, value)| !value.is_empty()) {
            if self.schema.has_field(field) {
                plan = plan.filter(ContentFilter::field_eq(field, value));
            } else {
                violations.push(Violation::UnknownQueryField(field.clone()));
            }
        }

        let order = params.sort_dir.unwrap_or_default();
        match params.sort_by.as_deref().filter(|name| !name.is_empty()) {
            None => {}
            Some(name) => {
                if let Some(key) = SortKey::system(name) {
                    plan = plan.order_by(OrderBy::new(key, order));
                } else if self.schema.has_field(name) {
                    plan = plan.order_by(OrderBy::new(SortKey::Field(name.to_string()), order));
                } else {
                    violations.push(Violation::UnknownQueryField(name.to_string()));
                }
            }
        }

        if !violations.is_empty() {
            return Err(violations);
        }

        Ok(plan.paginate(Pagination::new(params.page, params.page_size, self.config)))
    }
}


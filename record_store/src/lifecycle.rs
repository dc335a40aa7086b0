//! Record lifecycle
//!
//! [`ContentManager`] runs create, read, list, update and delete for records.
//! Writes are validated against the owning table's schema before the backend
//! is touched; listings are planned, executed, then enriched with related
//! records.

use config::ContentConfig;
use std::sync::Arc;
use uuid::Uuid;

use crate::errors::StoreError;
use crate::model::{ContentPage, QueryParams, Record, TableSchema, ValueMap};
use crate::query_builder::QueryPlanner;
use crate::relation::RelationResolver;
use crate::traits::Backend;
use crate::validation::FieldValidator;

const TABLE: &str = "table";
const RECORD: &str = "record";
const FIELD: &str = "relation field";

#[derive(Debug)]
pub struct ContentManager<B: Backend> {
    backend: Arc<B>,
    resolver: RelationResolver<B>,
    validator: FieldValidator,
    config: ContentConfig,
}

impl<B: Backend> Clone for ContentManager<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            resolver: self.resolver.clone(),
            validator: self.validator,
            config: self.config.clone(),
        }
    }
}

impl<B: Backend> ContentManager<B> {
    pub fn new(backend: Arc<B>, config: ContentConfig) -> Self {
        Self {
            resolver: RelationResolver::new(Arc::clone(&backend)),
            validator: FieldValidator::new(config.value_checks),
            backend,
            config,
        }
    }

    pub fn config(&self) -> &ContentConfig {
        &self.config
    }

    async fn load_schema(&self, table_slug: &str) -> Result<TableSchema, StoreError> {
        self.backend
            .get_schema(table_slug)
            .await?
            .ok_or_else(|| StoreError::not_found(TABLE, table_slug))
    }

    /// Store a new record in `table_slug` after validating its values
    pub async fn create(&self, table_slug: &str, values: ValueMap) -> Result<Record, StoreError> {
        let schema = self.load_schema(table_slug).await?;
        self.validator.validate(&schema.fields, &values)?;

        let record = self.backend.insert_record(table_slug, values).await?;
        tracing::info!(table_slug, id = %record.id, "record created");
        Ok(record)
    }

    /// The stored record, without related data
    pub async fn read(&self, id: Uuid) -> Result<Record, StoreError> {
        self.backend
            .get_record(id)
            .await?
            .ok_or_else(|| StoreError::not_found(RECORD, id))
    }

    /// One page of a table's records with related data attached.
    ///
    /// Count and page are separate reads and are not snapshot-consistent
    /// with each other under concurrent writes.
    pub async fn list(
        &self,
        table_slug: &str,
        params: &QueryParams,
    ) -> Result<ContentPage, StoreError> {
        let schema = self.load_schema(table_slug).await?;
        let plan = QueryPlanner::new(&schema, &self.config).plan(params)?;

        let total = self.backend.count(&plan).await?;
        let records = self.backend.fetch(&plan).await?;
        let contents = self.resolver.enrich(records, &schema).await;

        tracing::debug!(
            table_slug,
            total,
            page = plan.pagination.page,
            returned = contents.len(),
            "records listed"
        );

        Ok(ContentPage {
            contents,
            total,
            page: plan.pagination.page,
            page_size: plan.pagination.page_size,
            total_pages: plan.pagination.total_pages(total),
        })
    }

    /// Replace a record's values. Id and table never change.
    pub async fn update(&self, id: Uuid, values: ValueMap) -> Result<Record, StoreError> {
        let existing = self.read(id).await?;
        let schema = self.load_schema(&existing.table_slug).await?;
        self.validator.validate(&schema.fields, &values)?;

        let record = self
            .backend
            .update_record(id, values)
            .await?
            .ok_or_else(|| StoreError::not_found(RECORD, id))?;
        tracing::info!(table_slug = %record.table_slug, id = %record.id, "record updated");
        Ok(record)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        if !self.backend.delete_record(id).await? {
            return Err(StoreError::not_found(RECORD, id));
        }
        tracing::info!(id = %id, "record deleted");
        Ok(())
    }

    /// Value maps of every record a relation field can point to, newest first
    pub async fn related_options(
        &self,
        table_slug: &str,
        field_name: &str,
    ) -> Result<Vec<ValueMap>, StoreError> {
        let schema = self.load_schema(table_slug).await?;
        let relation = schema
            .field(field_name)
            .and_then(|field| field.relation())
            .ok_or_else(|| StoreError::not_found(FIELD, format!("{}.{}", table_slug, field_name)))?;

        let targets = self.resolver.list_relation_targets(relation).await?;
        Ok(targets.into_iter().map(|record| record.values).collect())
    }
}

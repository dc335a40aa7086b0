//! Schema registry
//!
//! Validates and stores table schemas. Every check runs before the backend is
//! touched, so a rejected schema leaves nothing behind.

use std::sync::Arc;

use crate::errors::StoreError;
use crate::model::{NewSchema, SchemaUpdate, TableSchema};
use crate::traits::Backend;
use crate::validation::{validate_schema_fields, ValidatedSlug};

const ENTITY: &str = "schema";

#[derive(Debug)]
pub struct SchemaRegistry<B: Backend> {
    backend: Arc<B>,
}

impl<B: Backend> Clone for SchemaRegistry<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
        }
    }
}

impl<B: Backend> SchemaRegistry<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    /// Register a new table. `Conflict` if the slug is already taken.
    pub async fn create(&self, schema: NewSchema) -> Result<TableSchema, StoreError> {
        let mut violations = Vec::new();
        if let Err(violation) = ValidatedSlug::new(&schema.table_slug) {
            violations.push(violation);
        }
        if let Err(field_violations) = validate_schema_fields(&schema.table_name, &schema.fields)
        {
            violations.extend(field_violations);
        }
        if !violations.is_empty() {
            return Err(StoreError::ValidationFailed(violations));
        }

        let created = self.backend.insert_schema(schema).await?;
        tracing::info!(
            table_slug = %created.table_slug,
            fields = created.fields.len(),
            "schema created"
        );
        Ok(created)
    }

    pub async fn get(&self, table_slug: &str) -> Result<TableSchema, StoreError> {
        self.backend
            .get_schema(table_slug)
            .await?
            .ok_or_else(|| StoreError::not_found(ENTITY, table_slug))
    }

    /// All schemas, newest first
    pub async fn list(&self) -> Result<Vec<TableSchema>, StoreError> {
        self.backend.list_schemas().await
    }

    /// Replace a table's name and field list; the slug never changes.
    ///
    /// Existing records are left untouched, even when they hold keys the new
    /// field list no longer declares.
    pub async fn update(
        &self,
        table_slug: &str,
        update: SchemaUpdate,
    ) -> Result<TableSchema, StoreError> {
        validate_schema_fields(&update.table_name, &update.fields)?;

        let updated = self
            .backend
            .update_schema(table_slug, &update.table_name, update.fields)
            .await?
            .ok_or_else(|| StoreError::not_found(ENTITY, table_slug))?;

        tracing::info!(table_slug, fields = updated.fields.len(), "schema updated");
        Ok(updated)
    }

    /// Delete a table together with every record it holds
    pub async fn delete(&self, table_slug: &str) -> Result<(), StoreError> {
        if !self.backend.delete_schema(table_slug).await? {
            return Err(StoreError::not_found(ENTITY, table_slug));
        }

        tracing::info!(table_slug, "schema deleted");
        Ok(())
    }
}

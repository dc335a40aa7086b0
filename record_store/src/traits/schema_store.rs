use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::StoreError;
use crate::model::{FieldDefinition, NewSchema, TableSchema};

/// Persistence of table schemas
#[async_trait]
pub trait SchemaStore: Send + Sync + Debug {
    /// Store a new schema; `Conflict` if the slug is taken
    async fn insert_schema(&self, schema: NewSchema) -> Result<TableSchema, StoreError>;

    async fn get_schema(&self, table_slug: &str) -> Result<Option<TableSchema>, StoreError>;

    /// All schemas, newest first
    async fn list_schemas(&self) -> Result<Vec<TableSchema>, StoreError>;

    /// Replace name and field list; `None` if the slug is unknown
    async fn update_schema(
        &self,
        table_slug: &str,
        table_name: &str,
        fields: Vec<FieldDefinition>,
    ) -> Result<Option<TableSchema>, StoreError>;

    /// Delete a schema and every record of its table as one atomic operation.
    /// Returns whether the schema existed.
    async fn delete_schema(&self, table_slug: &str) -> Result<bool, StoreError>;
}

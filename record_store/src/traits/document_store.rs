use async_trait::async_trait;
use std::fmt::Debug;
use uuid::Uuid;

use crate::errors::StoreError;
use crate::model::{Record, ValueMap};
use crate::query_builder::FetchPlan;

/// Persistence of records as opaque JSON documents
#[async_trait]
pub trait DocumentStore: Send + Sync + Debug {
    /// Store a new record with a fresh id and equal created/updated timestamps
    async fn insert_record(&self, table_slug: &str, values: ValueMap)
        -> Result<Record, StoreError>;

    async fn get_record(&self, id: Uuid) -> Result<Option<Record>, StoreError>;

    /// Replace a record's values and bump its update timestamp
    async fn update_record(&self, id: Uuid, values: ValueMap)
        -> Result<Option<Record>, StoreError>;

    /// Returns whether the record existed
    async fn delete_record(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Number of records matching the plan's filters, ignoring pagination
    async fn count(&self, plan: &FetchPlan) -> Result<i64, StoreError>;

    /// One ordered page of records matching the plan
    async fn fetch(&self, plan: &FetchPlan) -> Result<Vec<Record>, StoreError>;

    /// Records of a table whose field text equals one of `values`, oldest first
    async fn find_by_field(
        &self,
        table_slug: &str,
        field: &str,
        values: &[String],
    ) -> Result<Vec<Record>, StoreError>;

    /// Every record of a table, newest first
    async fn list_table(&self, table_slug: &str) -> Result<Vec<Record>, StoreError>;
}

//! In-memory backend
//!
//! Evaluates fetch plans with the same filter and ordering semantics as the
//! SQL the PostgreSQL backend runs. Ties are broken by insertion order.
//! Used by tests and by embedders that need no persistence.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::cmp::Ordering;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::StoreError;
use crate::model::{FieldDefinition, NewSchema, Record, TableSchema, ValueMap};
use crate::query_builder::{ContentFilter, FetchPlan};
use crate::traits::{DocumentStore, SchemaStore};

#[derive(Debug, Clone)]
struct StoredRecord {
    seq: u64,
    record: Record,
}

#[derive(Debug, Default)]
struct MemoryState {
    schemas: Vec<TableSchema>,
    records: Vec<StoredRecord>,
    next_seq: u64,
    last_tick: Option<DateTime<Utc>>,
}

impl MemoryState {
    /// Strictly increasing timestamps, so creation order is never ambiguous
    fn tick(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let tick = match self.last_tick {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_tick = Some(tick);
        tick
    }

    fn seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }
}

/// Backend holding schemas and records behind one lock
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored records across every table
    pub async fn record_count(&self) -> usize {
        self.state.read().await.records.len()
    }
}

fn to_index(value: i64) -> usize {
    usize::try_from(value.max(0)).unwrap_or(usize::MAX)
}

#[async_trait]
impl SchemaStore for MemoryStore {
    async fn insert_schema(&self, schema: NewSchema) -> Result<TableSchema, StoreError> {
        let mut state = self.state.write().await;
        if state
            .schemas
            .iter()
            .any(|existing| existing.table_slug == schema.table_slug)
        {
            return Err(StoreError::Conflict(format!(
                "table slug '{}' already exists",
                schema.table_slug
            )));
        }

        let now = state.tick();
        let stored = TableSchema {
            id: Uuid::new_v4(),
            table_slug: schema.table_slug,
            table_name: schema.table_name,
            fields: schema.fields,
            created_at: now,
            updated_at: now,
        };
        state.schemas.push(stored.clone());
        Ok(stored)
    }

    async fn get_schema(&self, table_slug: &str) -> Result<Option<TableSchema>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .schemas
            .iter()
            .find(|schema| schema.table_slug == table_slug)
            .cloned())
    }

    async fn list_schemas(&self) -> Result<Vec<TableSchema>, StoreError> {
        let state = self.state.read().await;
        let mut schemas = state.schemas.clone();
        // schemas are pushed in creation order
        schemas.reverse();
        Ok(schemas)
    }

    async fn update_schema(
        &self,
        table_slug: &str,
        table_name: &str,
        fields: Vec<FieldDefinition>,
    ) -> Result<Option<TableSchema>, StoreError> {
        let mut state = self.state.write().await;
        let now = state.tick();
        let Some(schema) = state
            .schemas
            .iter_mut()
            .find(|schema| schema.table_slug == table_slug)
        else {
            return Ok(None);
        };

        schema.table_name = table_name.to_string();
        schema.fields = fields;
        schema.updated_at = now;
        Ok(Some(schema.clone()))
    }

    async fn delete_schema(&self, table_slug: &str) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        let before = state.schemas.len();
        state.schemas.retain(|schema| schema.table_slug != table_slug);
        let deleted = state.schemas.len() != before;

        let records_before = state.records.len();
        state
            .records
            .retain(|stored| stored.record.table_slug != table_slug);
        tracing::debug!(
            table_slug,
            removed_records = records_before - state.records.len(),
            deleted,
            "schema delete applied"
        );

        Ok(deleted)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert_record(
        &self,
        table_slug: &str,
        values: ValueMap,
    ) -> Result<Record, StoreError> {
        let mut state = self.state.write().await;
        let now = state.tick();
        let seq = state.seq();
        let record = Record {
            id: Uuid::new_v4(),
            table_slug: table_slug.to_string(),
            values,
            created_at: now,
            updated_at: now,
        };
        state.records.push(StoredRecord {
            seq,
            record: record.clone(),
        });
        Ok(record)
    }

    async fn get_record(&self, id: Uuid) -> Result<Option<Record>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .records
            .iter()
            .find(|stored| stored.record.id == id)
            .map(|stored| stored.record.clone()))
    }

    async fn update_record(
        &self,
        id: Uuid,
        values: ValueMap,
    ) -> Result<Option<Record>, StoreError> {
        let mut state = self.state.write().await;
        let now = state.tick();
        let Some(stored) = state
            .records
            .iter_mut()
            .find(|stored| stored.record.id == id)
        else {
            return Ok(None);
        };

        stored.record.values = values;
        stored.record.updated_at = now;
        Ok(Some(stored.record.clone()))
    }

    async fn delete_record(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        let before = state.records.len();
        state.records.retain(|stored| stored.record.id != id);
        Ok(state.records.len() != before)
    }

    async fn count(&self, plan: &FetchPlan) -> Result<i64, StoreError> {
        let state = self.state.read().await;
        let total = state
            .records
            .iter()
            .filter(|stored| plan.matches(&stored.record))
            .count();
        Ok(total as i64)
    }

    async fn fetch(&self, plan: &FetchPlan) -> Result<Vec<Record>, StoreError> {
        let state = self.state.read().await;
        let mut matched: Vec<&StoredRecord> = state
            .records
            .iter()
            .filter(|stored| plan.matches(&stored.record))
            .collect();

        matched.sort_by(|a, b| {
            plan.order_by
                .compare(&a.record, &b.record)
                .then(a.seq.cmp(&b.seq))
        });

        Ok(matched
            .into_iter()
            .skip(to_index(plan.pagination.offset()))
            .take(to_index(plan.pagination.limit()))
            .map(|stored| stored.record.clone())
            .collect())
    }

    async fn find_by_field(
        &self,
        table_slug: &str,
        field: &str,
        values: &[String],
    ) -> Result<Vec<Record>, StoreError> {
        let table = ContentFilter::table(table_slug);
        let lookup = ContentFilter::field_in(field, values.to_vec());

        let state = self.state.read().await;
        let mut matched: Vec<&StoredRecord> = state
            .records
            .iter()
            .filter(|stored| table.matches(&stored.record) && lookup.matches(&stored.record))
            .collect();
        matched.sort_by(|a, b| oldest_first(a, b));

        Ok(matched.into_iter().map(|stored| stored.record.clone()).collect())
    }

    async fn list_table(&self, table_slug: &str) -> Result<Vec<Record>, StoreError> {
        let state = self.state.read().await;
        let mut matched: Vec<&StoredRecord> = state
            .records
            .iter()
            .filter(|stored| stored.record.table_slug == table_slug)
            .collect();
        matched.sort_by(|a, b| {
            b.record
                .created_at
                .cmp(&a.record.created_at)
                .then(a.seq.cmp(&b.seq))
        });

        Ok(matched.into_iter().map(|stored| stored.record.clone()).collect())
    }
}

fn oldest_first(a: &StoredRecord, b: &StoredRecord) -> Ordering {
    a.record
        .created_at
        .cmp(&b.record.created_at)
        .then(a.seq.cmp(&b.seq))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query_builder::{OrderBy, Pagination, SortKey, SortOrder};
    use config::ContentConfig;
    use serde_json::json;

    fn values(value: serde_json::Value) -> ValueMap {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[tokio::test]
    async fn test_timestamps_strictly_increase() {
        let store = MemoryStore::new();
        let first = store.insert_record("t", values(json!({}))).await.unwrap();
        let second = store.insert_record("t", values(json!({}))).await.unwrap();

        assert_eq!(first.created_at, first.updated_at);
        assert!(second.created_at > first.created_at);

        let updated = store
            .update_record(first.id, values(json!({"a": 1})))
            .await
            .unwrap()
            .unwrap();
        assert!(updated.updated_at > first.updated_at);
        assert_eq!(updated.created_at, first.created_at);
    }

    #[tokio::test]
    async fn test_fetch_orders_and_paginates() {
        let store = MemoryStore::new();
        for name in ["c", "a", "b", "a"] {
            store
                .insert_record("t", values(json!({ "name": name })))
                .await
                .unwrap();
        }
        store
            .insert_record("other", values(json!({"name": "a"})))
            .await
            .unwrap();

        let plan = FetchPlan::new("t")
            .order_by(OrderBy::new(SortKey::Field("name".into()), SortOrder::Asc))
            .paginate(Pagination::new(Some(1), Some(3), &ContentConfig::default()));

        assert_eq!(store.count(&plan).await.unwrap(), 4);
        let page = store.fetch(&plan).await.unwrap();
        let names: Vec<_> = page.iter().filter_map(|r| r.text_value("name")).collect();
        assert_eq!(names, vec!["a", "a", "b"]);
    }

    #[tokio::test]
    async fn test_find_by_field_is_oldest_first() {
        let store = MemoryStore::new();
        let first = store
            .insert_record("authors", values(json!({"name": "Ann"})))
            .await
            .unwrap();
        let second = store
            .insert_record("authors", values(json!({"name": "Ann"})))
            .await
            .unwrap();

        let found = store
            .find_by_field("authors", "name", &["Ann".to_string()])
            .await
            .unwrap();
        assert_eq!(
            found.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![first.id, second.id]
        );

        let listed = store.list_table("authors").await.unwrap();
        assert_eq!(listed[0].id, second.id);
    }

    #[tokio::test]
    async fn test_delete_schema_cascades() {
        let store = MemoryStore::new();
        store
            .insert_schema(NewSchema::new("T", "t", Vec::new()))
            .await
            .unwrap();
        store.insert_record("t", values(json!({}))).await.unwrap();
        store.insert_record("u", values(json!({}))).await.unwrap();

        assert!(store.delete_schema("t").await.unwrap());
        assert_eq!(store.record_count().await, 1);
        assert!(!store.delete_schema("t").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_slug_conflicts() {
        let store = MemoryStore::new();
        store
            .insert_schema(NewSchema::new("T", "t", Vec::new()))
            .await
            .unwrap();
        let err = store
            .insert_schema(NewSchema::new("T2", "t", Vec::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }
}

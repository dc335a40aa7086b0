//! Relation resolution
//!
//! Attaches the record a relation field points to under the derived key
//! `_<field>_related`. Lookups are batched: one query per relation field for
//! a whole page of records. A failed lookup is logged and the field is left
//! unresolved; it never fails the listing.

use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::errors::StoreError;
use crate::model::{related_key, text_form, FieldDefinition, Record, RelationConfig, TableSchema};
use crate::traits::Backend;

#[derive(Debug)]
pub struct RelationResolver<B: Backend> {
    backend: Arc<B>,
}

impl<B: Backend> Clone for RelationResolver<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
        }
    }
}

/// Lookup keys a relation value refers to
fn lookup_keys(relation: &RelationConfig, value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) if relation.allow_multiple => {
            items.iter().filter_map(text_form).collect()
        }
        other => text_form(other).into_iter().collect(),
    }
}

impl<B: Backend> RelationResolver<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    /// Attach related records for every relation field of `schema`.
    ///
    /// A single-valued relation attaches the value map of the oldest record
    /// in the target table whose `relatedField` text equals the value. A
    /// multi-valued relation holding an array attaches an array of matches
    /// in element order. When nothing matches the derived key is absent.
    pub async fn enrich(&self, mut records: Vec<Record>, schema: &TableSchema) -> Vec<Record> {
        for field in schema.relation_fields() {
            let key = related_key(&field.name);
            for record in records.iter_mut() {
                record.values.remove(&key);
            }

            if let Err(e) = self.enrich_field(&mut records, field).await {
                tracing::warn!(
                    table_slug = %schema.table_slug,
                    field = %field.name,
                    error = %e,
                    "failed to load related data, continuing without it"
                );
            }
        }
        records
    }

    async fn enrich_field(
        &self,
        records: &mut [Record],
        field: &FieldDefinition,
    ) -> Result<(), StoreError> {
        let Some(relation) = field.relation() else {
            return Ok(());
        };

        let wanted: BTreeSet<String> = records
            .iter()
            .filter_map(|record| record.values.get(&field.name))
            .flat_map(|value| lookup_keys(relation, value))
            .collect();
        if wanted.is_empty() {
            return Ok(());
        }

        let wanted: Vec<String> = wanted.into_iter().collect();
        let candidates = self
            .backend
            .find_by_field(&relation.related_table, &relation.related_field, &wanted)
            .await?;

        // candidates arrive oldest first; the first one seen wins
        let mut matches: HashMap<String, Value> = HashMap::new();
        for candidate in candidates {
            if let Some(text) = candidate.text_value(&relation.related_field) {
                matches
                    .entry(text)
                    .or_insert_with(|| Value::Object(candidate.values));
            }
        }

        let key = related_key(&field.name);
        for record in records.iter_mut() {
            let Some(value) = record.values.get(&field.name) else {
                continue;
            };

            let attached = match value {
                Value::Array(_) if relation.allow_multiple => {
                    let found: Vec<Value> = lookup_keys(relation, value)
                        .iter()
                        .filter_map(|k| matches.get(k).cloned())
                        .collect();
                    (!found.is_empty()).then_some(Value::Array(found))
                }
                _ => lookup_keys(relation, value)
                    .first()
                    .and_then(|k| matches.get(k).cloned()),
            };

            if let Some(attached) = attached {
                record.values.insert(key.clone(), attached);
            }
        }

        tracing::debug!(
            field = %field.name,
            related_table = %relation.related_table,
            lookups = wanted.len(),
            found = matches.len(),
            "related data loaded"
        );
        Ok(())
    }

    /// Every record of the relation's target table, newest first.
    /// Feeds selection lists; no filtering or pagination.
    pub async fn list_relation_targets(
        &self,
        relation: &RelationConfig,
    ) -> Result<Vec<Record>, StoreError> {
        self.backend.list_table(&relation.related_table).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryStore;
    use crate::model::{DataType, NewSchema, RelationKind, ValueMap};
    use crate::query_builder::FetchPlan;
    use crate::traits::{DocumentStore, SchemaStore};
    use async_trait::async_trait;
    use chrono::Utc;
    use serde_json::json;
    use uuid::Uuid;

    /// Memory backend whose relation lookups always fail
    #[derive(Debug, Default)]
    struct BrokenLookups(MemoryStore);

    #[async_trait]
    impl SchemaStore for BrokenLookups {
        async fn insert_schema(&self, schema: NewSchema) -> Result<TableSchema, StoreError> {
            self.0.insert_schema(schema).await
        }

        async fn get_schema(&self, table_slug: &str) -> Result<Option<TableSchema>, StoreError> {
            self.0.get_schema(table_slug).await
        }

        async fn list_schemas(&self) -> Result<Vec<TableSchema>, StoreError> {
            self.0.list_schemas().await
        }

        async fn update_schema(
            &self,
            table_slug: &str,
            table_name: &str,
            fields: Vec<FieldDefinition>,
        ) -> Result<Option<TableSchema>, StoreError> {
            self.0.update_schema(table_slug, table_name, fields).await
        }

        async fn delete_schema(&self, table_slug: &str) -> Result<bool, StoreError> {
            self.0.delete_schema(table_slug).await
        }
    }

    #[async_trait]
    impl DocumentStore for BrokenLookups {
        async fn insert_record(
            &self,
            table_slug: &str,
            values: ValueMap,
        ) -> Result<Record, StoreError> {
            self.0.insert_record(table_slug, values).await
        }

        async fn get_record(&self, id: Uuid) -> Result<Option<Record>, StoreError> {
            self.0.get_record(id).await
        }

        async fn update_record(
            &self,
            id: Uuid,
            values: ValueMap,
        ) -> Result<Option<Record>, StoreError> {
            self.0.update_record(id, values).await
        }

        async fn delete_record(&self, id: Uuid) -> Result<bool, StoreError> {
            self.0.delete_record(id).await
        }

        async fn count(&self, plan: &FetchPlan) -> Result<i64, StoreError> {
            self.0.count(plan).await
        }

        async fn fetch(&self, plan: &FetchPlan) -> Result<Vec<Record>, StoreError> {
            self.0.fetch(plan).await
        }

        async fn find_by_field(
            &self,
            _table_slug: &str,
            _field: &str,
            _values: &[String],
        ) -> Result<Vec<Record>, StoreError> {
            Err(StoreError::Conflict("lookup unavailable".to_string()))
        }

        async fn list_table(&self, table_slug: &str) -> Result<Vec<Record>, StoreError> {
            self.0.list_table(table_slug).await
        }
    }

    fn values(value: Value) -> ValueMap {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn books_schema(allow_multiple: bool) -> TableSchema {
        let now = Utc::now();
        TableSchema {
            id: Uuid::new_v4(),
            table_slug: "books".to_string(),
            table_name: "Books".to_string(),
            fields: vec![
                FieldDefinition::new("title", "Title", DataType::Text),
                FieldDefinition::new("author", "Author", DataType::Relation).with_relation(
                    RelationConfig::new(RelationKind::ManyToOne, "authors", "name")
                        .allow_multiple(allow_multiple),
                ),
            ],
            created_at: now,
            updated_at: now,
        }
    }

    async fn seeded() -> (Arc<MemoryStore>, Vec<Record>) {
        let store = Arc::new(MemoryStore::new());
        store
            .insert_record("authors", values(json!({"name": "Ann", "born": 1970})))
            .await
            .unwrap();
        store
            .insert_record("authors", values(json!({"name": "Ann", "born": 2001})))
            .await
            .unwrap();
        store
            .insert_record("authors", values(json!({"name": "Bob", "born": 1980})))
            .await
            .unwrap();

        let mut books = Vec::new();
        for book in [
            json!({"title": "One", "author": "Ann"}),
            json!({"title": "Two", "author": "Zed"}),
            json!({"title": "Three"}),
        ] {
            books.push(store.insert_record("books", values(book)).await.unwrap());
        }
        (store, books)
    }

    #[tokio::test]
    async fn test_enrich_attaches_oldest_match() {
        let (store, books) = seeded().await;
        let resolver = RelationResolver::new(store);

        let enriched = resolver.enrich(books, &books_schema(false)).await;

        assert_eq!(
            enriched[0].values.get("_author_related"),
            Some(&json!({"name": "Ann", "born": 1970}))
        );
        assert!(!enriched[1].values.contains_key("_author_related"));
        assert!(!enriched[2].values.contains_key("_author_related"));
    }

    #[tokio::test]
    async fn test_enrich_multiple_values() {
        let (store, _) = seeded().await;
        let book = store
            .insert_record("books", values(json!({"author": ["Bob", "Zed", "Ann"]})))
            .await
            .unwrap();
        let resolver = RelationResolver::new(store);

        let enriched = resolver.enrich(vec![book.clone()], &books_schema(true)).await;
        assert_eq!(
            enriched[0].values.get("_author_related"),
            Some(&json!([
                {"name": "Bob", "born": 1980},
                {"name": "Ann", "born": 1970}
            ]))
        );

        // without allowMultiple the array is matched by its JSON text
        let enriched = resolver.enrich(vec![book], &books_schema(false)).await;
        assert!(!enriched[0].values.contains_key("_author_related"));
    }

    #[tokio::test]
    async fn test_single_relation_matches_array_by_compact_text() {
        let (store, _) = seeded().await;
        store
            .insert_record("authors", values(json!({"name": ["Bob", "Ann"], "born": 1990})))
            .await
            .unwrap();
        let book = store
            .insert_record("books", values(json!({"author": ["Bob", "Ann"]})))
            .await
            .unwrap();
        let resolver = RelationResolver::new(store);

        let enriched = resolver.enrich(vec![book], &books_schema(false)).await;
        assert_eq!(
            enriched[0].values.get("_author_related"),
            Some(&json!({"name": ["Bob", "Ann"], "born": 1990}))
        );
    }

    #[tokio::test]
    async fn test_stale_derived_key_is_replaced() {
        let (store, _) = seeded().await;
        let book = store
            .insert_record(
                "books",
                values(json!({"author": "Nobody", "_author_related": {"fake": true}})),
            )
            .await
            .unwrap();
        let resolver = RelationResolver::new(store);

        let enriched = resolver.enrich(vec![book], &books_schema(false)).await;
        assert!(!enriched[0].values.contains_key("_author_related"));
    }

    #[tokio::test]
    async fn test_failed_lookup_keeps_every_record() {
        let store = Arc::new(BrokenLookups::default());
        store
            .insert_record("authors", values(json!({"name": "Ann"})))
            .await
            .unwrap();
        let linked = store
            .insert_record("books", values(json!({"title": "One", "author": "Ann"})))
            .await
            .unwrap();
        let stale = store
            .insert_record(
                "books",
                values(json!({"title": "Two", "author": "Ann", "_author_related": 1})),
            )
            .await
            .unwrap();
        let resolver = RelationResolver::new(store);

        let enriched = resolver
            .enrich(vec![linked.clone(), stale.clone()], &books_schema(false))
            .await;

        assert_eq!(enriched.len(), 2);
        assert_eq!(enriched[0].id, linked.id);
        assert_eq!(enriched[0].values, linked.values);
        assert_eq!(enriched[1].id, stale.id);
        assert_eq!(
            enriched[1].values,
            values(json!({"title": "Two", "author": "Ann"}))
        );
    }

    #[tokio::test]
    async fn test_list_relation_targets_is_newest_first() {
        let (store, _) = seeded().await;
        let resolver = RelationResolver::new(store);
        let relation = RelationConfig::new(RelationKind::ManyToOne, "authors", "name");

        let targets = resolver.list_relation_targets(&relation).await.unwrap();
        let names: Vec<_> = targets.iter().filter_map(|r| r.text_value("name")).collect();
        assert_eq!(names, vec!["Bob", "Ann", "Ann"]);
    }
}

//! PostgreSQL backend
//!
//! Schemas live in the `schemas` table with their field list as JSONB;
//! records live in `contents` with their value map as JSONB. Every statement
//! is parameterized; see [`crate::query_builder::SqlGenerator`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::errors::StoreError;
use crate::model::{FieldDefinition, NewSchema, Record, TableSchema, ValueMap};
use crate::query_builder::sql_generation::{RECORD_COLUMNS, SCHEMA_COLUMNS};
use crate::query_builder::{FetchPlan, SqlGenerator, SqlParam, SqlStatement};
use crate::traits::{DocumentStore, SchemaStore};

#[derive(sqlx::FromRow)]
struct SchemaRow {
    id: Uuid,
    table_slug: String,
    table_name: String,
    fields: Json<Vec<FieldDefinition>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<SchemaRow> for TableSchema {
    fn from(row: SchemaRow) -> Self {
        TableSchema {
            id: row.id,
            table_slug: row.table_slug,
            table_name: row.table_name,
            fields: row.fields.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct RecordRow {
    id: Uuid,
    table_slug: String,
    values: Json<ValueMap>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<RecordRow> for Record {
    fn from(row: RecordRow) -> Self {
        Record {
            id: row.id,
            table_slug: row.table_slug,
            values: row.values.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

// Shared parameter binding for query and query_as builders
macro_rules! bind_sql_param {
    ($query:expr, $param:expr) => {
        match $param {
            SqlParam::Text(text) => $query.bind(text),
            SqlParam::TextArray(items) => $query.bind(items),
            SqlParam::BigInt(n) => $query.bind(n),
        }
    };
}

/// Document store over a PostgreSQL connection pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl std::fmt::Debug for PgStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgStore")
            .field("pool_size", &self.pool.size())
            .field("closed", &self.pool.is_closed())
            .finish()
    }
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Close every connection of the pool
    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn fetch_records(
        &self,
        statement: SqlStatement,
        operation: &'static str,
    ) -> Result<Vec<Record>, StoreError> {
        tracing::debug!(
            sql = %statement.sql,
            params = statement.params.len(),
            "[{}] executing",
            operation
        );

        let mut query = sqlx::query_as::<_, RecordRow>(&statement.sql);
        for param in statement.params {
            query = bind_sql_param!(query, param);
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::database_operation("contents", operation, e))?;

        Ok(rows.into_iter().map(Record::from).collect())
    }
}

#[async_trait]
impl SchemaStore for PgStore {
    async fn insert_schema(&self, schema: NewSchema) -> Result<TableSchema, StoreError> {
        let sql = format!(
            "INSERT INTO schemas (table_slug, table_name, fields) VALUES ($1, $2, $3) RETURNING {}",
            SCHEMA_COLUMNS
        );

        let row = sqlx::query_as::<_, SchemaRow>(&sql)
            .bind(&schema.table_slug)
            .bind(&schema.table_name)
            .bind(Json(&schema.fields))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_unique_violation() => StoreError::Conflict(
                    format!("table slug '{}' already exists", schema.table_slug),
                ),
                other => StoreError::database_operation("schemas", "insert_schema", other),
            })?;

        Ok(row.into())
    }

    async fn get_schema(&self, table_slug: &str) -> Result<Option<TableSchema>, StoreError> {
        let sql = format!("SELECT {} FROM schemas WHERE table_slug = $1", SCHEMA_COLUMNS);

        let row = sqlx::query_as::<_, SchemaRow>(&sql)
            .bind(table_slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::database_operation("schemas", "get_schema", e))?;

        Ok(row.map(TableSchema::from))
    }

    async fn list_schemas(&self) -> Result<Vec<TableSchema>, StoreError> {
        let sql = format!(
            "SELECT {} FROM schemas ORDER BY created_at DESC, id ASC",
            SCHEMA_COLUMNS
        );

        let rows = sqlx::query_as::<_, SchemaRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::database_operation("schemas", "list_schemas", e))?;

        Ok(rows.into_iter().map(TableSchema::from).collect())
    }

    async fn update_schema(
        &self,
        table_slug: &str,
        table_name: &str,
        fields: Vec<FieldDefinition>,
    ) -> Result<Option<TableSchema>, StoreError> {
        let sql = format!(
            "UPDATE schemas SET table_name = $1, fields = $2, updated_at = GREATEST(NOW(), updated_at) \
             WHERE table_slug = $3 RETURNING {}",
            SCHEMA_COLUMNS
        );

        let row = sqlx::query_as::<_, SchemaRow>(&sql)
            .bind(table_name)
            .bind(Json(&fields))
            .bind(table_slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::database_operation("schemas", "update_schema", e))?;

        Ok(row.map(TableSchema::from))
    }

    async fn delete_schema(&self, table_slug: &str) -> Result<bool, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::database_operation("schemas", "begin_transaction", e))?;

        let removed_records = sqlx::query("DELETE FROM contents WHERE table_slug = $1")
            .bind(table_slug)
            .execute(tx.as_mut())
            .await
            .map_err(|e| StoreError::database_operation("contents", "delete_table_records", e))?
            .rows_affected();

        let deleted = sqlx::query("DELETE FROM schemas WHERE table_slug = $1")
            .bind(table_slug)
            .execute(tx.as_mut())
            .await
            .map_err(|e| StoreError::database_operation("schemas", "delete_schema", e))?
            .rows_affected()
            > 0;

        tx.commit()
            .await
            .map_err(|e| StoreError::database_operation("schemas", "commit_transaction", e))?;

        tracing::debug!(table_slug, removed_records, deleted, "schema delete committed");
        Ok(deleted)
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn insert_record(
        &self,
        table_slug: &str,
        values: ValueMap,
    ) -> Result<Record, StoreError> {
        let sql = format!(
            "INSERT INTO contents (table_slug, values) VALUES ($1, $2) RETURNING {}",
            RECORD_COLUMNS
        );

        let row = sqlx::query_as::<_, RecordRow>(&sql)
            .bind(table_slug)
            .bind(Json(values))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::database_operation("contents", "insert_record", e))?;

        Ok(row.into())
    }

    async fn get_record(&self, id: Uuid) -> Result<Option<Record>, StoreError> {
        let sql = format!("SELECT {} FROM contents WHERE id = $1", RECORD_COLUMNS);

        let row = sqlx::query_as::<_, RecordRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::database_operation("contents", "get_record", e))?;

        Ok(row.map(Record::from))
    }

    async fn update_record(
        &self,
        id: Uuid,
        values: ValueMap,
    ) -> Result<Option<Record>, StoreError> {
        let sql = format!(
            "UPDATE contents SET values = $1, updated_at = GREATEST(NOW(), updated_at) \
             WHERE id = $2 RETURNING {}",
            RECORD_COLUMNS
        );

        let row = sqlx::query_as::<_, RecordRow>(&sql)
            .bind(Json(values))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::database_operation("contents", "update_record", e))?;

        Ok(row.map(Record::from))
    }

    async fn delete_record(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM contents WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::database_operation("contents", "delete_record", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self, plan: &FetchPlan) -> Result<i64, StoreError> {
        let statement = plan.count_statement();
        tracing::debug!(sql = %statement.sql, params = statement.params.len(), "[count] executing");

        let mut query = sqlx::query(&statement.sql);
        for param in statement.params {
            query = bind_sql_param!(query, param);
        }

        let row = query
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::database_operation("contents", "count", e))?;

        row.try_get::<i64, _>("total")
            .map_err(|e| StoreError::database_operation("contents", "count", e))
    }

    async fn fetch(&self, plan: &FetchPlan) -> Result<Vec<Record>, StoreError> {
        self.fetch_records(plan.select_statement(), "fetch").await
    }

    async fn find_by_field(
        &self,
        table_slug: &str,
        field: &str,
        values: &[String],
    ) -> Result<Vec<Record>, StoreError> {
        if values.is_empty() {
            return Ok(Vec::new());
        }
        let statement = SqlGenerator::lookup_statement(table_slug, field, values);
        self.fetch_records(statement, "find_by_field").await
    }

    async fn list_table(&self, table_slug: &str) -> Result<Vec<Record>, StoreError> {
        let statement = SqlStatement {
            sql: format!(
                "SELECT {} FROM contents WHERE table_slug = $1 ORDER BY created_at DESC, id ASC",
                RECORD_COLUMNS
            ),
            params: vec![SqlParam::Text(table_slug.to_string())],
        };
        self.fetch_records(statement, "list_table").await
    }
}

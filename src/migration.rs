//! Database migration functionality
//!
//! Creates the two collections every table lives in: `schemas` holding the
//! field lists and `contents` holding records as JSONB documents.

use record_store::PgStore;

use crate::core::TableHaus;
use crate::errors::TableHausError;

const CREATE_SCHEMAS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS schemas (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    table_slug VARCHAR(255) NOT NULL UNIQUE,
    table_name VARCHAR(255) NOT NULL,
    fields JSONB NOT NULL DEFAULT '[]'::jsonb,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)"#;

const CREATE_CONTENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS contents (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    table_slug VARCHAR(255) NOT NULL
        REFERENCES schemas(table_slug) ON DELETE CASCADE,
    values JSONB NOT NULL DEFAULT '{}'::jsonb,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)"#;

const CREATE_INDEXES: [(&str, &str); 3] = [
    (
        "index_contents_table_slug",
        "CREATE INDEX IF NOT EXISTS idx_contents_table_slug ON contents(table_slug, created_at DESC)",
    ),
    (
        "index_contents_values",
        "CREATE INDEX IF NOT EXISTS idx_contents_values ON contents USING GIN(values)",
    ),
    (
        "index_schemas_created_at",
        "CREATE INDEX IF NOT EXISTS idx_schemas_created_at ON schemas(created_at DESC)",
    ),
];

impl TableHaus<PgStore> {
    /// Create the `schemas` and `contents` tables and their indexes if they
    /// do not exist yet. Safe to run on every start.
    pub async fn migrate(&self) -> Result<(), TableHausError> {
        let steps = [
            ("create_schemas_table", CREATE_SCHEMAS_TABLE),
            ("create_contents_table", CREATE_CONTENTS_TABLE),
        ]
        .into_iter()
        .chain(CREATE_INDEXES);

        for (step, sql) in steps {
            crate::debug_log!(step, sql, "running migration step");
            sqlx::query(sql)
                .execute(self.pool())
                .await
                .map_err(|source| TableHausError::Migration { step, source })?;
        }

        tracing::info!("storage migrated");
        Ok(())
    }
}

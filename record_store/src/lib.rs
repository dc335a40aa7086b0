//! Record Store - Dynamic-table core for TableHaus
//!
//! This crate provides the data model, validation, query planning, relation
//! resolution and record lifecycle for user-defined tables whose records are
//! stored as JSON documents, plus the PostgreSQL and in-memory backends.

pub mod backend;
pub mod errors;
pub mod lifecycle;
pub mod model;
pub mod prelude;
pub mod query_builder;
pub mod registry;
pub mod relation;
pub mod traits;
pub mod validation;

pub use backend::{MemoryStore, PgStore};
pub use errors::{StoreError, Violation};
pub use lifecycle::ContentManager;
pub use model::{
    ContentPage, DataType, FieldDefinition, NewSchema, QueryParams, Record, RelationConfig,
    RelationKind, SchemaUpdate, TableSchema, ValueMap,
};
pub use query_builder::{FetchPlan, QueryPlanner, SortOrder};
pub use registry::SchemaRegistry;
pub use relation::RelationResolver;
pub use traits::*;
pub use validation::{FieldValidator, ValidatedFieldName, ValidatedSlug};

use sqlx::PgPool;

pub type DbPool = PgPool;

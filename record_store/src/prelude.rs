//! Convenience re-exports for common record-store usage

// Backends and their traits
pub use crate::backend::{MemoryStore, PgStore};
pub use crate::traits::{Backend, DocumentStore, SchemaStore};

// Error types
pub use crate::errors::{StoreError, Violation};

// Services
pub use crate::lifecycle::ContentManager;
pub use crate::registry::SchemaRegistry;
pub use crate::relation::RelationResolver;

// Data model
pub use crate::model::{
    ContentPage, DataType, FieldDefinition, NewSchema, QueryParams, Record, RelationConfig,
    RelationKind, SchemaUpdate, TableSchema, ValueMap,
};

// Validation
pub use crate::validation::{FieldValidator, ValidatedFieldName, ValidatedSlug};

// Query building
pub use crate::query_builder::{FetchPlan, QueryPlanner, SortOrder};

// Common external dependencies that are frequently used
pub use serde_json::{json, Value};
pub use uuid::Uuid;

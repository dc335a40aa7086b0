//! Data model
//!
//! Schemas, field definitions, records and listing parameters.

pub mod field;
pub mod query;
pub mod record;
pub mod schema;

pub use field::{DataType, FieldDefinition, RelationConfig, RelationKind};
pub use query::{ContentPage, QueryParams};
pub use record::{is_reserved_key, related_key, text_form, Record, ValueMap, RESERVED_PREFIX};
pub use schema::{NewSchema, SchemaUpdate, TableSchema};

//! Convenience re-exports for common TableHaus usage
//!
//! # Example
//!
//! ```rust
//! use tablehaus::prelude::*;
//!
//! let fields = vec![FieldDefinition::new("name", "Name", DataType::Text).required()];
//! let schema = NewSchema::new("People", "people", fields);
//! assert_eq!(schema.table_slug, "people");
//! ```

// Core TableHaus components
pub use crate::core::TableHaus;
pub use crate::errors::TableHausError;

// Re-export centralized config
pub use config::{AppConfig, ContentConfig, DatabaseConfig, ValueChecks};

// Re-export commonly used record-store types for convenience
pub use record_store::prelude::*;

// Common external dependencies
pub use anyhow;
pub use sqlx;
pub use tokio;

// Commonly used sqlx types
pub use sqlx::PgPool;

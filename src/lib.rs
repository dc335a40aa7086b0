//! # TableHaus
//!
//! User-defined tables on top of PostgreSQL JSONB: declare a table's fields
//! at runtime, then create, search, filter, sort and page through records
//! that follow them, with relation fields resolved for display.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tablehaus::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let haus = TableHaus::connect(config).await?;
//!     haus.migrate().await?;
//!
//!     haus.schemas()
//!         .create(NewSchema::new(
//!             "People",
//!             "people",
//!             vec![FieldDefinition::new("name", "Name", DataType::Text).required()],
//!         ))
//!         .await?;
//!
//!     let values = json!({"name": "John Doe"});
//!     let created = haus
//!         .contents()
//!         .create("people", values.as_object().cloned().unwrap_or_default())
//!         .await?;
//!     println!("Created record: {}", created.id);
//!
//!     let page = haus
//!         .contents()
//!         .list("people", &QueryParams::new().search("john"))
//!         .await?;
//!     println!("{} match(es)", page.total);
//!
//!     haus.close().await;
//!     Ok(())
//! }
//! ```

/// Conditional debug logging macros
/// These macros only compile in code when the `debug-logging` feature is enabled
#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

pub mod core;
pub mod errors;
pub mod migration;
pub mod prelude;

// Re-export the main public types for convenience
pub use core::TableHaus;
pub use errors::TableHausError;

// Re-export centralized config
pub use config::{AppConfig, ContentConfig, DatabaseConfig, ValueChecks};

// Re-export the core crate
pub use record_store;

// Re-export external dependencies used in public API
pub use sqlx;
pub use async_trait;

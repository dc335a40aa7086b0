//! Error types for the TableHaus crate
//!
//! This module contains all error types that can be returned by TableHaus operations.

use config::ConfigError;
use record_store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TableHausError {
    #[error("Database connection error: {0}")]
    DatabaseConnection(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Migration failed at step '{step}': {source}")]
    Migration {
        step: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

impl TableHausError {
    /// The underlying store error, if this is one
    pub fn as_store_error(&self) -> Option<&StoreError> {
        match self {
            TableHausError::Store(err) => Some(err),
            _ => None,
        }
    }
}

//! Core TableHaus functionality
//!
//! This module contains the main TableHaus struct and its implementation,
//! wiring one backend into the schema registry and the content manager.

use config::{AppConfig, ContentConfig, DatabaseConfig};
use record_store::prelude::*;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

use crate::errors::TableHausError;

/// Main TableHaus coordinator owning the backend handle and its services
#[derive(Debug)]
pub struct TableHaus<B: Backend = PgStore> {
    backend: Arc<B>,
    schemas: SchemaRegistry<B>,
    contents: ContentManager<B>,
}

impl TableHaus<PgStore> {
    /// Validate the configuration and open a PostgreSQL connection pool
    pub async fn connect(config: AppConfig) -> Result<Self, TableHausError> {
        config.validate()?;
        let pool = Self::open_pool(&config.database).await?;
        crate::debug_log!(
            host = %config.database.host,
            database = %config.database.database,
            "connection pool opened"
        );
        Ok(Self::from_backend(Arc::new(PgStore::new(pool)), config.content))
    }

    async fn open_pool(config: &DatabaseConfig) -> Result<PgPool, TableHausError> {
        let connection_string = config.connection_string();

        let mut pool_options = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds));

        // Set max lifetime if specified
        if config.max_lifetime_seconds > 0 {
            pool_options =
                pool_options.max_lifetime(Duration::from_secs(config.max_lifetime_seconds));
        }

        Ok(pool_options.connect(&connection_string).await?)
    }

    /// Get database pool reference
    pub fn pool(&self) -> &PgPool {
        self.backend.pool()
    }

    /// Check database connection health
    pub async fn health_check(&self) -> Result<(), TableHausError> {
        sqlx::query("SELECT 1").fetch_one(self.pool()).await?;
        crate::trace_log!("health check passed");
        Ok(())
    }

    /// Close the connection pool; further operations fail
    pub async fn close(&self) {
        self.backend.close().await;
        crate::debug_log!("connection pool closed");
    }
}

impl<B: Backend> TableHaus<B> {
    /// Wire an already constructed backend
    pub fn from_backend(backend: Arc<B>, content: ContentConfig) -> Self {
        Self {
            schemas: SchemaRegistry::new(Arc::clone(&backend)),
            contents: ContentManager::new(Arc::clone(&backend), content),
            backend,
        }
    }

    /// Schema create/get/list/update/delete
    pub fn schemas(&self) -> &SchemaRegistry<B> {
        &self.schemas
    }

    /// Record create/read/list/update/delete
    pub fn contents(&self) -> &ContentManager<B> {
        &self.contents
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }
}

impl TableHaus<MemoryStore> {
    /// A TableHaus over a fresh in-memory backend
    pub fn in_memory(content: ContentConfig) -> Self {
        Self::from_backend(Arc::new(MemoryStore::new()), content)
    }
}

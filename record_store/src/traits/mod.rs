//! Traits for storage backends
//!
//! A backend persists two logical collections: schemas keyed by slug, and
//! records tagged with the slug of the table they belong to.

pub mod document_store;
pub mod schema_store;

pub use document_store::DocumentStore;
pub use schema_store::SchemaStore;

/// A backend holding both collections
pub trait Backend: SchemaStore + DocumentStore + 'static {}

impl<T> Backend for T where T: SchemaStore + DocumentStore + 'static {}

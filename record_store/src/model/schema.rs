use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::field::FieldDefinition;

/// The declared structure of one dynamic table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSchema {
    pub id: Uuid,
    pub table_slug: String,
    pub table_name: String,
    pub fields: Vec<FieldDefinition>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TableSchema {
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Fields that carry a relation descriptor, in display order
    pub fn relation_fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.fields.iter().filter(|field| field.relation().is_some())
    }
}

/// Input for creating a schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSchema {
    pub table_name: String,
    pub table_slug: String,
    pub fields: Vec<FieldDefinition>,
}

impl NewSchema {
    pub fn new(table_name: &str, table_slug: &str, fields: Vec<FieldDefinition>) -> Self {
        Self {
            table_name: table_name.to_string(),
            table_slug: table_slug.to_string(),
            fields,
        }
    }
}

/// Input for replacing a schema's name and field list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaUpdate {
    pub table_name: String,
    pub fields: Vec<FieldDefinition>,
}

impl SchemaUpdate {
    pub fn new(table_name: &str, fields: Vec<FieldDefinition>) -> Self {
        Self {
            table_name: table_name.to_string(),
            fields,
        }
    }
}

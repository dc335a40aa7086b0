//! Content filters
//!
//! Predicates a listing is restricted by. Every value a filter carries is
//! bound as a query parameter, never spliced into SQL text.

use crate::model::Record;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentFilter {
    /// Record belongs to the table with this slug
    TableIs(String),
    /// Serialized value map contains the term, case-insensitively
    DocumentContains(String),
    /// Text form of a field equals the value exactly
    FieldEquals { field: String, value: String },
    /// Text form of a field equals one of the values
    FieldIn { field: String, values: Vec<String> },
}

impl ContentFilter {
    pub fn table(slug: &str) -> Self {
        Self::TableIs(slug.to_string())
    }

    pub fn search(term: &str) -> Self {
        Self::DocumentContains(term.to_string())
    }

    pub fn field_eq(field: &str, value: &str) -> Self {
        Self::FieldEquals {
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    pub fn field_in(field: &str, values: Vec<String>) -> Self {
        Self::FieldIn {
            field: field.to_string(),
            values,
        }
    }

    /// Evaluate the filter against a record held in memory
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            ContentFilter::TableIs(slug) => &record.table_slug == slug,
            ContentFilter::DocumentContains(term) => {
                let document = match serde_json::to_string(&record.values) {
                    Ok(document) => document,
                    Err(_) => return false,
                };
                document.to_lowercase().contains(&term.to_lowercase())
            }
            ContentFilter::FieldEquals { field, value } => {
                record.text_value(field).as_deref() == Some(value.as_str())
            }
            ContentFilter::FieldIn { field, values } => match record.text_value(field) {
                Some(text) => values.iter().any(|value| value == &text),
                None => false,
            },
        }
    }
}

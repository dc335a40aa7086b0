use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Field name to value mapping of one record
pub type ValueMap = serde_json::Map<String, Value>;

/// Keys starting with this prefix hold derived data, never declared fields
pub const RESERVED_PREFIX: &str = "_";

const RELATED_SUFFIX: &str = "_related";

/// One schema-free row belonging to a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: Uuid,
    pub table_slug: String,
    pub values: ValueMap,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record {
    /// Text form of a value, see [`text_form`]
    pub fn text_value(&self, field: &str) -> Option<String> {
        self.values.get(field).and_then(text_form)
    }
}

pub fn is_reserved_key(key: &str) -> bool {
    key.starts_with(RESERVED_PREFIX)
}

/// Key under which the related record of `field` is attached
pub fn related_key(field: &str) -> String {
    format!("{}{}{}", RESERVED_PREFIX, field, RELATED_SUFFIX)
}

/// Text extraction used for filtering, sorting and relation matching.
///
/// Mirrors PostgreSQL's `->>` operator: strings yield their contents, JSON
/// null yields nothing, everything else yields its JSON text.
///
/// Arrays and objects come out as compact serde JSON (`["a","b"]`), while
/// PostgreSQL renders them with a space after each separator (`["a", "b"]`).
/// Matching on such values therefore differs between the two backends.
pub fn text_form(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

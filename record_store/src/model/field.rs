//! Field definitions
//!
//! A field describes one named, typed slot of a table schema. Field
//! definitions are persisted as JSON with camelCase keys.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Data types a field may declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Text,
    Number,
    Date,
    Time,
    Datetime,
    File,
    Options,
    Checkbox,
    Radio,
    Textarea,
    Email,
    Url,
    Phone,
    Relation,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Text => "text",
            DataType::Number => "number",
            DataType::Date => "date",
            DataType::Time => "time",
            DataType::Datetime => "datetime",
            DataType::File => "file",
            DataType::Options => "options",
            DataType::Checkbox => "checkbox",
            DataType::Radio => "radio",
            DataType::Textarea => "textarea",
            DataType::Email => "email",
            DataType::Url => "url",
            DataType::Phone => "phone",
            DataType::Relation => "relation",
        }
    }

    /// Types whose values are picked from the field's option list
    pub fn uses_options(&self) -> bool {
        matches!(self, DataType::Options | DataType::Radio | DataType::Checkbox)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cardinality of a relation field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationKind {
    OneToOne,
    OneToMany,
    ManyToOne,
    ManyToMany,
}

/// Where a relation field points to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationConfig {
    pub relation_type: RelationKind,
    /// Slug of the target table
    pub related_table: String,
    /// Field of the target table matched against this field's value
    pub related_field: String,
    /// Field of the target table shown in selection lists
    pub display_field: String,
    #[serde(default)]
    pub allow_multiple: bool,
}

impl RelationConfig {
    pub fn new(relation_type: RelationKind, related_table: &str, related_field: &str) -> Self {
        Self {
            relation_type,
            related_table: related_table.to_string(),
            related_field: related_field.to_string(),
            display_field: related_field.to_string(),
            allow_multiple: false,
        }
    }

    pub fn display_field(mut self, display_field: &str) -> Self {
        self.display_field = display_field.to_string();
        self
    }

    pub fn allow_multiple(mut self, allow_multiple: bool) -> Self {
        self.allow_multiple = allow_multiple;
        self
    }
}

/// Definition of one field of a table schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub name: String,
    #[serde(default)]
    pub label: String,
    pub data_type: DataType,
    /// Regular expression applied to the value's text form
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_validation: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation_config: Option<RelationConfig>,
}

impl FieldDefinition {
    pub fn new(name: &str, label: &str, data_type: DataType) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            data_type,
            data_validation: None,
            required: false,
            options: Vec::new(),
            relation_config: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_validation(mut self, pattern: &str) -> Self {
        self.data_validation = Some(pattern.to_string());
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_relation(mut self, relation: RelationConfig) -> Self {
        self.data_type = DataType::Relation;
        self.relation_config = Some(relation);
        self
    }

    /// The relation descriptor, if this is a resolvable relation field
    pub fn relation(&self) -> Option<&RelationConfig> {
        match self.data_type {
            DataType::Relation => self.relation_config.as_ref(),
            _ => None,
        }
    }
}

//! Validation module
//!
//! Identifier rules for table slugs and field names, field-list checks applied
//! when a schema is written, and the record value validator.

use config::ValueChecks;
use regex::Regex;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;

use crate::errors::Violation;
use crate::model::{is_reserved_key, text_form, FieldDefinition, ValueMap};

/// A field name that starts with a letter followed by letters, digits or underscores
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValidatedFieldName(String);

impl ValidatedFieldName {
    pub fn new(name: &str) -> Result<Self, Violation> {
        let mut chars = name.chars();
        let first = chars.next().ok_or(Violation::EmptyFieldName)?;
        if !first.is_ascii_alphabetic() || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(Violation::InvalidFieldName(name.to_string()));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ValidatedFieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A table slug: a letter or digit, then letters, digits, '-' or '_'
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValidatedSlug(String);

impl ValidatedSlug {
    const MAX_LENGTH: usize = 255;

    pub fn new(slug: &str) -> Result<Self, Violation> {
        let mut chars = slug.chars();
        let valid = match chars.next() {
            Some(first) => {
                first.is_ascii_alphanumeric()
                    && slug.len() <= Self::MAX_LENGTH
                    && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
            }
            None => false,
        };
        if !valid {
            return Err(Violation::InvalidSlug(slug.to_string()));
        }
        Ok(Self(slug.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ValidatedSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Check a schema's table name and field list before it is stored
pub fn validate_schema_fields(
    table_name: &str,
    fields: &[FieldDefinition],
) -> Result<(), Vec<Violation>> {
    let mut violations = Vec::new();

    if table_name.trim().is_empty() {
        violations.push(Violation::EmptyTableName);
    }
    if fields.is_empty() {
        violations.push(Violation::EmptyFieldList);
    }

    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    for field in fields {
        if let Err(violation) = ValidatedFieldName::new(&field.name) {
            violations.push(violation);
        }
        let repeated = !field.name.is_empty() && !seen.insert(field.name.as_str());
        if repeated && reported.insert(field.name.as_str()) {
            violations.push(Violation::DuplicateFieldName(field.name.clone()));
        }

        if let Some(pattern) = &field.data_validation {
            if let Err(e) = Regex::new(pattern) {
                violations.push(Violation::InvalidPattern {
                    field: field.name.clone(),
                    reason: e.to_string(),
                });
            }
        }

        if let Some(relation) = &field.relation_config {
            if ValidatedSlug::new(&relation.related_table).is_err() {
                violations.push(Violation::InvalidRelation {
                    field: field.name.clone(),
                    reason: format!("invalid related table '{}'", relation.related_table),
                });
            }
            if relation.related_field.is_empty() {
                violations.push(Violation::InvalidRelation {
                    field: field.name.clone(),
                    reason: "related field cannot be empty".to_string(),
                });
            }
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

/// Checks a record's value map against a schema's field list.
///
/// Lenient mode only checks key presence: required fields must be present and
/// every non-reserved key must be a declared field. Strict mode also matches
/// values against `dataValidation` patterns and option lists.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldValidator {
    checks: ValueChecks,
}

impl FieldValidator {
    pub fn new(checks: ValueChecks) -> Self {
        Self { checks }
    }

    pub fn lenient() -> Self {
        Self::new(ValueChecks::Lenient)
    }

    pub fn strict() -> Self {
        Self::new(ValueChecks::Strict)
    }

    pub fn checks(&self) -> ValueChecks {
        self.checks
    }

    pub fn validate(
        &self,
        fields: &[FieldDefinition],
        values: &ValueMap,
    ) -> Result<(), Vec<Violation>> {
        let mut violations = Vec::new();

        for field in fields.iter().filter(|field| field.required) {
            if !values.contains_key(&field.name) {
                violations.push(Violation::MissingRequiredField(field.name.clone()));
            }
        }

        for (key, value) in values {
            if is_reserved_key(key) {
                continue;
            }
            match fields.iter().find(|field| &field.name == key) {
                None => violations.push(Violation::UnknownField(key.clone())),
                Some(field) if self.checks == ValueChecks::Strict => {
                    Self::check_value(field, value, &mut violations)
                }
                Some(_) => {}
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }

    fn check_value(field: &FieldDefinition, value: &Value, violations: &mut Vec<Violation>) {
        if let Some(pattern) = field.data_validation.as_deref().filter(|p| !p.is_empty()) {
            let skip_empty = !field.required && value.as_str() == Some("");
            if let Some(text) = text_form(value).filter(|_| !skip_empty) {
                match Regex::new(pattern) {
                    Ok(re) if re.is_match(&text) => {}
                    Ok(_) => violations.push(Violation::PatternMismatch(field.name.clone())),
                    Err(e) => violations.push(Violation::InvalidPattern {
                        field: field.name.clone(),
                        reason: e.to_string(),
                    }),
                }
            }
        }

        if field.data_type.uses_options() && !field.options.is_empty() {
            let allowed = |candidate: &str| field.options.iter().any(|option| option == candidate);
            let mut reject = |shown: String| {
                violations.push(Violation::OptionNotAllowed {
                    field: field.name.clone(),
                    value: shown,
                })
            };

            match value {
                Value::Null | Value::Bool(_) => {}
                Value::String(s) if s.is_empty() && !field.required => {}
                Value::String(_) | Value::Number(_) => {
                    if let Some(text) = text_form(value).filter(|text| !allowed(text)) {
                        reject(text);
                    }
                }
                Value::Array(items) => {
                    for item in items {
                        match item {
                            Value::String(_) | Value::Number(_) => {
                                if let Some(text) = text_form(item).filter(|text| !allowed(text)) {
                                    reject(text);
                                }
                            }
                            other => reject(text_form(other).unwrap_or_else(|| "null".to_string())),
                        }
                    }
                }
                other => reject(other.to_string()),
            }
        }
    }
}

use std::fmt;
use thiserror::Error;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// A single reason a schema, record or query was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    #[error("required field '{0}' is missing")]
    MissingRequiredField(String),

    #[error("field '{0}' is not defined in schema")]
    UnknownField(String),

    #[error("duplicate field name '{0}'")]
    DuplicateFieldName(String),

    #[error("field name cannot be empty")]
    EmptyFieldName,

    #[error("invalid field name '{0}': must start with a letter followed by letters, digits or underscores")]
    InvalidFieldName(String),

    #[error("at least one field is required")]
    EmptyFieldList,

    #[error("table name cannot be empty")]
    EmptyTableName,

    #[error("invalid table slug '{0}'")]
    InvalidSlug(String),

    #[error("field '{field}' has an invalid validation pattern: {reason}")]
    InvalidPattern { field: String, reason: String },

    #[error("field '{field}' has an invalid relation: {reason}")]
    InvalidRelation { field: String, reason: String },

    #[error("value of field '{0}' does not match its validation pattern")]
    PatternMismatch(String),

    #[error("value '{value}' is not an allowed option for field '{field}'")]
    OptionNotAllowed { field: String, value: String },

    #[error("cannot filter or sort by unknown field '{0}'")]
    UnknownQueryField(String),
}

/// Wrapper used to render a violation list in error messages.
pub struct Violations<'a>(pub &'a [Violation]);

impl fmt::Display for Violations<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", violation)?;
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Not found: {entity} '{key}'")]
    NotFound { entity: &'static str, key: String },

    #[error("Validation failed: {}", Violations(.0))]
    ValidationFailed(Vec<Violation>),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store failure during {operation} on {entity}: {source}")]
    StoreFailure {
        operation: &'static str,
        entity: String,
        #[source]
        source: BoxedSource,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub fn not_found(entity: &'static str, key: impl fmt::Display) -> Self {
        StoreError::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    /// Wrap a database error with the entity and operation it happened in
    pub fn database_operation(
        entity: impl Into<String>,
        operation: &'static str,
        error: sqlx::Error,
    ) -> Self {
        StoreError::StoreFailure {
            operation,
            entity: entity.into(),
            source: Box::new(error),
        }
    }

    pub fn violation(violation: Violation) -> Self {
        StoreError::ValidationFailed(vec![violation])
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    /// Violations carried by a `ValidationFailed` error, empty otherwise
    pub fn violations(&self) -> &[Violation] {
        match self {
            StoreError::ValidationFailed(violations) => violations,
            _ => &[],
        }
    }
}

impl From<Vec<Violation>> for StoreError {
    fn from(violations: Vec<Violation>) -> Self {
        StoreError::ValidationFailed(violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_names_every_field() {
        let err = StoreError::ValidationFailed(vec![
            Violation::MissingRequiredField("name".to_string()),
            Violation::UnknownField("foo".to_string()),
        ]);
        assert_eq!(
            err.to_string(),
            "Validation failed: required field 'name' is missing; field 'foo' is not defined in schema"
        );
    }

    #[test]
    fn test_not_found_helper() {
        let err = StoreError::not_found("table", "people");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Not found: table 'people'");
    }
}

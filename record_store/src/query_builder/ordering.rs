//! Ordering of content listings
//!
//! Listings sort either by a system timestamp column or by the text form of
//! one declared field.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::model::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Anything other than a case-insensitive "desc" sorts ascending
    pub fn parse(input: &str) -> Self {
        if input.trim().eq_ignore_ascii_case("desc") {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        }
    }

    pub fn to_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }

    pub fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

impl From<String> for SortOrder {
    fn from(input: String) -> Self {
        SortOrder::parse(&input)
    }
}

/// What a listing is ordered by
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortKey {
    CreatedAt,
    UpdatedAt,
    /// A declared field, compared by its text form
    Field(String),
}

impl SortKey {
    /// System sort names, including their camelCase aliases
    pub fn system(name: &str) -> Option<Self> {
        match name {
            "created_at" | "createdAt" => Some(SortKey::CreatedAt),
            "updated_at" | "updatedAt" => Some(SortKey::UpdatedAt),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub key: SortKey,
    pub order: SortOrder,
}

impl OrderBy {
    pub fn new(key: SortKey, order: SortOrder) -> Self {
        Self { key, order }
    }

    /// Newest first
    pub fn newest_first() -> Self {
        Self::new(SortKey::CreatedAt, SortOrder::Desc)
    }

    /// Compare two records the way the SQL ordering does.
    ///
    /// Field values compare byte-wise on their text form. Absent values sort
    /// after present ones ascending and before them descending, matching
    /// PostgreSQL's default NULL placement.
    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        let ascending = match &self.key {
            SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
            SortKey::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            SortKey::Field(field) => match (a.text_value(field), b.text_value(field)) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
        };
        self.order.apply(ascending)
    }
}

impl Default for OrderBy {
    fn default() -> Self {
        Self::newest_first()
    }
}

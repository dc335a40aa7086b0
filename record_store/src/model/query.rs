use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::record::Record;
use crate::query_builder::SortOrder;

/// Runtime parameters of a content listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryParams {
    #[serde(default)]
    pub search: Option<String>,
    /// Field name to exact-match value
    #[serde(default)]
    pub filters: BTreeMap<String, String>,
    #[serde(default)]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub sort_dir: Option<SortOrder>,
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub page_size: Option<i64>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: &str) -> Self {
        self.search = Some(term.to_string());
        self
    }

    pub fn filter(mut self, field: &str, value: &str) -> Self {
        self.filters.insert(field.to_string(), value.to_string());
        self
    }

    pub fn sort(mut self, field: &str, direction: SortOrder) -> Self {
        self.sort_by = Some(field.to_string());
        self.sort_dir = Some(direction);
        self
    }

    pub fn page(mut self, page: i64, page_size: i64) -> Self {
        self.page = Some(page);
        self.page_size = Some(page_size);
        self
    }

    /// Parse the `filters` query-string form: comma separated `field=value` pairs
    pub fn parse_filters(input: &str) -> BTreeMap<String, String> {
        input
            .split(',')
            .filter_map(|pair| pair.split_once('='))
            .map(|(field, value)| (field.to_string(), value.to_string()))
            .collect()
    }
}

/// One page of a content listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentPage {
    pub contents: Vec<Record>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

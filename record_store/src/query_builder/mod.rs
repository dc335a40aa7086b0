//! Query builder utilities
//!
//! This module turns listing parameters into fetch plans and renders those
//! plans as parameterized SQL.

pub mod builder;
pub mod filter;
pub mod ordering;
pub mod pagination;
pub mod sql_generation;

#[cfg(test)]
mod tests;

pub use builder::{FetchPlan, QueryPlanner};
pub use filter::ContentFilter;
pub use ordering::{OrderBy, SortKey, SortOrder};
pub use pagination::Pagination;
pub use sql_generation::{SqlGenerator, SqlParam, SqlStatement};

//! Pagination bounds
//!
//! Page numbers start at 1. Page sizes fall back to the configured default
//! when absent or non-positive and are capped at the configured maximum.

use config::ContentConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub page_size: i64,
}

impl Pagination {
    pub fn new(page: Option<i64>, page_size: Option<i64>, config: &ContentConfig) -> Self {
        let max_page_size = config.max_page_size.clamp(1, config::PAGE_SIZE_CEILING);
        let page_size = match page_size {
            Some(size) if size > 0 => size.min(max_page_size),
            _ => config.default_page_size.clamp(1, max_page_size),
        };
        let page = page.filter(|p| *p >= 1).unwrap_or(1);

        Self { page, page_size }
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    pub fn total_pages(&self, total: i64) -> i64 {
        if total <= 0 {
            0
        } else {
            (total + self.page_size - 1) / self.page_size
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(None, None, &ContentConfig::default())
    }
}

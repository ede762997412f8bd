//! Pagination types shared across repositories.

use serde::{Deserialize, Serialize};

/// Default number of items per page.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Maximum allowed items per page.
pub const MAX_PAGE_SIZE: u32 = 200;

/// Pagination options for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    /// Page number (1-indexed).
    pub page: u32,
    /// Items per page, clamped to [1, MAX_PAGE_SIZE].
    pub per_page: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> u32 {
        (self.page.saturating_sub(1)) * self.per_page
    }

    pub fn limit(&self) -> u32 {
        self.per_page
    }

    pub fn total_pages(&self, total_items: u64) -> u32 {
        if total_items == 0 {
            return 1;
        }
        ((total_items as f64) / (self.per_page as f64)).ceil() as u32
    }
}

/// A page of results with pagination metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    /// Total items matching the query across all pages.
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
}

impl<T> PaginatedResult<T> {
    pub fn new(items: Vec<T>, total: u64, pagination: &Pagination) -> Self {
        Self {
            items,
            total,
            page: pagination.page,
            per_page: pagination.per_page,
            total_pages: pagination.total_pages(total),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn has_next_page(&self) -> bool {
        self.page < self.total_pages
    }
}

//! Pagination primitives for the repository contracts.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Maximum page size a repository is asked to return.
pub const MAX_PAGE_LIMIT: u32 = 200;

/// A 1-based page request.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> DomainResult<Self> {
        if page == 0 {
            return Err(DomainError::validation("page numbers start at 1"));
        }
        if limit == 0 || limit > MAX_PAGE_LIMIT {
            return Err(DomainError::validation(format!(
                "page limit must be within 1-{MAX_PAGE_LIMIT}, got {limit}"
            )));
        }
        Ok(Self { page, limit })
    }

    pub fn first(limit: u32) -> DomainResult<Self> {
        Self::new(1, limit)
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Zero-based item offset of this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

/// One page of results plus totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub total_pages: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, request: &PageRequest) -> Self {
        let total_pages = total.div_ceil(u64::from(request.limit())) as u32;
        Self {
            items,
            total,
            page: request.page(),
            total_pages,
        }
    }

    pub fn empty(request: &PageRequest) -> Self {
        Self::new(Vec::new(), 0, request)
    }
}

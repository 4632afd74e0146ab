//! Painting listing: filtering, sorting and pagination.

use serde::Serialize;

use super::models::SortOrder;
use super::validation::{ValidationError, ValidationResult};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Validated listing parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaintingListQuery {
    pub page: u32,
    pub page_size: u32,
    pub sort_order: SortOrder,
    /// Case-insensitive substring matched against the artist short name.
    pub artist_name: Option<String>,
}

impl Default for PaintingListQuery {
    fn default() -> Self {
        PaintingListQuery {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            sort_order: SortOrder::Asc,
            artist_name: None,
        }
    }
}

impl PaintingListQuery {
    pub fn new(
        page: u32,
        page_size: u32,
        sort_order: SortOrder,
        artist_name: Option<String>,
    ) -> ValidationResult<Self> {
        if page < 1 {
            return Err(ValidationError::OutOfRange {
                field: "page",
                min: 1,
                max: u32::MAX as i64,
            });
        }
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(ValidationError::OutOfRange {
                field: "page_size",
                min: 1,
                max: MAX_PAGE_SIZE as i64,
            });
        }
        Ok(PaintingListQuery {
            page,
            page_size,
            sort_order,
            artist_name: artist_name.filter(|name| !name.is_empty()),
        })
    }

    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.page_size as u64
    }
}

/// A page of items plus counts and navigation flags.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, total: u64, page: u32, page_size: u32) -> Self {
        let total_pages = total_pages(total, page_size);
        Page {
            data,
            total,
            page,
            page_size,
            total_pages,
            has_next: (page as u64) < total_pages,
            has_prev: page > 1 && total > 0,
        }
    }
}

/// `ceil(total / page_size)`, zero when there is nothing to page through.
pub fn total_pages(total: u64, page_size: u32) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size as u64)
}

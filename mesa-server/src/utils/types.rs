//! Shared Types
//!
//! Common types used across the application

/// Largest page a client may request
pub const MAX_PAGE_SIZE: u32 = 100;

/// Pagination query parameters
#[derive(Debug, Clone, Copy)]
pub struct PaginationParams {
    pub page: u32,
    pub page_size: u32,
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    20
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: default_page_size(),
        }
    }
}

impl PaginationParams {
    /// Build from optional query values, clamping to sane bounds
    pub fn from_query(page: Option<u32>, page_size: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or_else(default_page).max(1),
            page_size: page_size
                .unwrap_or_else(default_page_size)
                .clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Calculate offset for SQL queries
    pub fn offset(&self) -> i64 {
        (self.page.saturating_sub(1) as i64) * self.page_size as i64
    }

    /// Get limit for SQL queries
    pub fn limit(&self) -> i64 {
        self.page_size as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_clamps_and_offsets() {
        let p = PaginationParams::from_query(None, None);
        assert_eq!((p.page, p.page_size, p.offset()), (1, 20, 0));

        let p = PaginationParams::from_query(Some(0), Some(1000));
        assert_eq!((p.page, p.page_size), (1, MAX_PAGE_SIZE));

        let p = PaginationParams::from_query(Some(3), Some(10));
        assert_eq!((p.offset(), p.limit()), (20, 10));
    }
}

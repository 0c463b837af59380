//! Page window for list endpoints

pub const DEFAULT_PER_PAGE: i64 = 20;
pub const MAX_PER_PAGE: i64 = 200;

/// Page number and size as applied to a query, both at least 1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
}

impl Pagination {
    pub fn new(page: Option<i64>, per_page: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE),
        }
    }

    /// Rows to skip; saturates for page numbers past any real table
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_bounds() {
        assert_eq!(Pagination::new(None, None), Pagination { page: 1, per_page: 20 });
        assert_eq!(Pagination::new(Some(0), Some(0)), Pagination { page: 1, per_page: 1 });
        assert_eq!(Pagination::new(Some(-5), Some(1000)), Pagination { page: 1, per_page: 200 });
    }

    #[test]
    fn offset_skips_previous_pages() {
        assert_eq!(Pagination::new(Some(1), Some(20)).offset(), 0);
        assert_eq!(Pagination::new(Some(3), Some(20)).offset(), 40);
    }

    #[test]
    fn huge_page_number_does_not_overflow() {
        let page = Pagination::new(Some(i64::MAX), Some(20));
        assert_eq!(page.page, i64::MAX);
        assert_eq!(page.offset(), i64::MAX);

        let page = Pagination::new(Some(i64::MAX), Some(MAX_PER_PAGE));
        assert_eq!(page.offset(), i64::MAX);
    }
}

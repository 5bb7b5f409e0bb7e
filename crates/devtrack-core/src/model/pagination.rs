use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 25;

/// Pagination of the current list, mirroring the last list response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            total: 0,
        }
    }
}

impl Pagination {
    /// Number of pages for `total` records (at least one).
    pub fn page_count(&self) -> u64 {
        if self.page_size == 0 {
            return 1;
        }
        self.total.div_ceil(u64::from(self.page_size)).max(1)
    }
}

/// Partial pagination change; present fields override.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaginationUpdate {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub total: Option<u64>,
}

impl PaginationUpdate {
    pub(crate) fn apply_to(self, pagination: &mut Pagination) {
        if let Some(page) = self.page {
            pagination.page = page;
        }
        if let Some(page_size) = self.page_size {
            pagination.page_size = page_size;
        }
        if let Some(total) = self.total {
            pagination.total = total;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let p = Pagination::default();
        assert_eq!((p.page, p.page_size, p.total), (1, 25, 0));
        assert_eq!(p.page_count(), 1);
    }

    #[test]
    fn page_count_rounds_up() {
        let p = Pagination {
            page: 1,
            page_size: 25,
            total: 51,
        };
        assert_eq!(p.page_count(), 3);
    }
}

//! Pagination types

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_LIMIT: i64 = 10;
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Query params for paginated listings (1-based page)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    DEFAULT_PAGE_LIMIT
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
        }
    }
}

impl PageQuery {
    /// Clamp to sane bounds and return (limit, offset) for the window query.
    pub fn window(&self) -> (i64, i64) {
        let limit = self.limit.clamp(1, MAX_PAGE_LIMIT);
        let page = self.page.max(1);
        (limit, (page - 1) * limit)
    }
}

/// One page of results plus the unwindowed total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, query: PageQuery) -> Self {
        let (limit, _) = query.window();
        Self {
            items,
            total,
            page: query.page.max(1),
            limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_clamps_limit_and_page() {
        let query = PageQuery { page: 0, limit: 1000 };
        assert_eq!(query.window(), (MAX_PAGE_LIMIT, 0));

        let query = PageQuery { page: 3, limit: 10 };
        assert_eq!(query.window(), (10, 20));
    }

    #[test]
    fn defaults_apply_when_params_missing() {
        let query: PageQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, DEFAULT_PAGE_LIMIT);
    }
}

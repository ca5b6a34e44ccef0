//! Offset pagination.
//!
//! [`Page::parse`] turns raw `page`/`limit` query values into a clamped
//! [`Page`]; [`PaginationEnvelope::new`] computes the metadata returned next
//! to the rows. Both are pure.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_LIMIT: u64 = 20;
pub const MAX_PAGE_LIMIT: u64 = 100;

/// Stores bind OFFSET as a signed 64-bit integer.
const MAX_OFFSET: u64 = i64::MAX.unsigned_abs();

/// Page-size bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PageLimits {
    pub default_limit: u64,
    pub max_limit: u64,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_PAGE_LIMIT,
            max_limit: MAX_PAGE_LIMIT,
        }
    }
}

/// A validated page request. `page >= 1`, `1 <= limit <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    page: u64,
    limit: u64,
}

impl Page {
    /// Parses raw values with the default bounds (`limit` 20, max 100).
    #[must_use]
    pub fn parse(raw_page: Option<&str>, raw_limit: Option<&str>) -> Self {
        Self::parse_with(PageLimits::default(), raw_page, raw_limit)
    }

    /// Absent, non-integer or non-positive `page` becomes 1. Absent,
    /// non-integer or non-positive `limit` becomes the default; a limit over
    /// the maximum is clamped to it.
    #[must_use]
    pub fn parse_with(
        limits: PageLimits,
        raw_page: Option<&str>,
        raw_limit: Option<&str>,
    ) -> Self {
        let max = limits.max_limit.max(1);
        let page = positive(raw_page).unwrap_or(1);
        let limit = positive(raw_limit)
            .unwrap_or(limits.default_limit)
            .clamp(1, max);
        Self { page, limit }
    }

    #[must_use]
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, MAX_PAGE_LIMIT),
        }
    }

    #[inline]
    #[must_use]
    pub fn page(&self) -> u64 {
        self.page
    }

    #[inline]
    #[must_use]
    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// `(page - 1) * limit`, saturating for absurd page numbers.
    #[inline]
    #[must_use]
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit).min(MAX_OFFSET)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_LIMIT)
    }
}

fn positive(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .and_then(|n| u64::try_from(n).ok())
        .filter(|n| *n > 0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationEnvelope {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
}

impl PaginationEnvelope {
    /// Metadata for `page` given the total row count, using the same limit
    /// the rows were fetched with.
    #[must_use]
    pub fn new(page: &Page, total: u64) -> Self {
        Self {
            page: page.page(),
            limit: page.limit(),
            total,
            total_pages: total.div_ceil(page.limit()),
        }
    }
}

/// List response: `{ data, pagination }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paged<T> {
    pub data: Vec<T>,
    pub pagination: PaginationEnvelope,
}

impl<T> Paged<T> {
    #[must_use]
    pub fn new(data: Vec<T>, page: &Page, total: u64) -> Self {
        Self {
            data,
            pagination: PaginationEnvelope::new(page, total),
        }
    }

    /// The result for a denied scope: no rows, zero total.
    #[must_use]
    pub fn empty(page: &Page) -> Self {
        Self::new(Vec::new(), page, 0)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paged<U> {
        Paged {
            data: self.data.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}

//! Paging parameters for remote list requests.

use anyhow::{anyhow, Result};

/// Page sizes offered in the table footer (same as the web console)
pub const DEFAULT_PAGE_SIZES: [u32; 2] = [10, 25];

/// Ordered, non-empty set of allowed page sizes. The first entry is the default.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageSizes(Vec<u32>);

impl PageSizes {
    pub fn new(sizes: Vec<u32>) -> Result<Self> {
        let mut out: Vec<u32> = Vec::with_capacity(sizes.len());
        for s in sizes {
            if s == 0 {
                return Err(anyhow!("page size must be > 0"));
            }
            if !out.contains(&s) {
                out.push(s);
            }
        }
        if out.is_empty() {
            return Err(anyhow!("at least one page size is required"));
        }
        Ok(Self(out))
    }

    /// Parse a comma-separated list such as `"10,25,50"`
    pub fn parse(s: &str) -> Result<Self> {
        let sizes = s
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| {
                v.parse::<u32>()
                    .map_err(|_| anyhow!("invalid page size '{v}'"))
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(sizes)
    }

    pub fn default_size(&self) -> u32 {
        self.0[0]
    }

    pub fn contains(&self, size: u32) -> bool {
        self.0.contains(&size)
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    /// Next allowed size after `current`, wrapping around
    pub fn cycle(&self, current: u32) -> u32 {
        let idx = self.0.iter().position(|&v| v == current).unwrap_or(0);
        self.0[(idx + 1) % self.0.len()]
    }
}

impl Default for PageSizes {
    fn default() -> Self {
        Self(DEFAULT_PAGE_SIZES.to_vec())
    }
}

/// Paging and filter state for one remote list
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListQuery {
    pub page_index: u32,
    pub page_size: u32,
    /// Pre-encoded query fragment, appended verbatim (starts with `&` when non-empty)
    pub filter: String,
}

impl ListQuery {
    pub fn new(page_size: u32, filter: impl Into<String>) -> Self {
        Self { page_index: 0, page_size, filter: filter.into() }
    }

    pub fn skip(&self) -> u64 {
        self.page_size as u64 * self.page_index as u64
    }

    /// `limit=..&count&skip=..` followed by the filter fragment
    pub fn query_string(&self) -> String {
        let mut qs = format!("limit={}&count&skip={}", self.page_size, self.skip());
        if !self.filter.is_empty() {
            if !self.filter.starts_with('&') {
                qs.push('&');
            }
            qs.push_str(&self.filter);
        }
        qs
    }

    /// Whether the server reported data past the current page
    pub fn can_advance(&self, total: u64) -> bool {
        (self.page_size as u64) * (self.page_index as u64 + 1) < total
    }

    /// `"<from> - <to>"` for the footer, 1-based
    pub fn range_label(&self, shown: usize) -> String {
        if shown == 0 {
            return "0 - 0".to_string();
        }
        let from = self.skip() + 1;
        let to = self.skip() + shown as u64;
        format!("{from} - {to}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_string_includes_count_and_filter() {
        let mut q = ListQuery::new(25, "&topic=orders");
        q.page_index = 2;
        assert_eq!(q.query_string(), "limit=25&count&skip=50&topic=orders");

        let q = ListQuery::new(10, "");
        assert_eq!(q.query_string(), "limit=10&count&skip=0");
    }

    #[test]
    fn filter_without_leading_ampersand_is_joined() {
        let q = ListQuery::new(10, "type=broadcast");
        assert_eq!(q.query_string(), "limit=10&count&skip=0&type=broadcast");
    }

    #[test]
    fn advance_guard_matches_total() {
        let mut q = ListQuery::new(10, "");
        assert!(q.can_advance(15));
        q.page_index = 1;
        assert!(!q.can_advance(15));
        assert!(!ListQuery::new(10, "").can_advance(10));
        assert!(!ListQuery::new(10, "").can_advance(0));
    }

    #[test]
    fn page_sizes_parse_and_cycle() {
        let sizes = PageSizes::parse("10, 25,50,25").unwrap();
        assert_eq!(sizes.as_slice(), &[10, 25, 50]);
        assert_eq!(sizes.default_size(), 10);
        assert_eq!(sizes.cycle(10), 25);
        assert_eq!(sizes.cycle(50), 10);
        assert!(PageSizes::parse("").is_err());
        assert!(PageSizes::parse("0").is_err());
        assert!(PageSizes::parse("ten").is_err());
    }

    #[test]
    fn range_label() {
        let mut q = ListQuery::new(10, "");
        assert_eq!(q.range_label(0), "0 - 0");
        q.page_index = 1;
        assert_eq!(q.range_label(5), "11 - 15");
    }
}

//! Pages of rows produced by fetch strategies.

use serde::{Deserialize, Serialize};

/// One page of rows plus its pagination metadata.
///
/// Pages are replaced wholesale on every successful fetch; nothing merges
/// rows from two pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<R> {
    pub rows: Vec<R>,
    /// 1-based page number.
    pub current_page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_records: Option<u64>,
}

impl<R> Page<R> {
    /// An empty first page.
    pub fn empty(page_size: u32) -> Self {
        Self {
            rows: Vec::new(),
            current_page: 1,
            page_size: page_size.max(1),
            total_pages: 1,
            total_records: Some(0),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    /// 1-based record range shown on this page, e.g. `(21, 40)`.
    ///
    /// Returns `(0, 0)` for an empty page.
    pub fn record_range(&self) -> (u64, u64) {
        if self.rows.is_empty() {
            return (0, 0);
        }
        let start = u64::from(self.current_page.saturating_sub(1)) * u64::from(self.page_size) + 1;
        (start, start + self.rows.len() as u64 - 1)
    }
}

/// Page as delivered by a backend, before defaulting.
///
/// Backends are inconsistent about which pagination fields they send, so
/// every field is optional and [`RawPage::normalize`] fills the gaps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPage<R> {
    #[serde(default, alias = "data", alias = "items")]
    pub rows: Option<Vec<R>>,
    #[serde(default)]
    pub current_page: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
    #[serde(default, alias = "total")]
    pub total_pages: Option<u32>,
    #[serde(default, alias = "totalCount")]
    pub total_records: Option<u64>,
}

impl<R> Default for RawPage<R> {
    fn default() -> Self {
        Self {
            rows: None,
            current_page: None,
            page_size: None,
            total_pages: None,
            total_records: None,
        }
    }
}

impl<R> RawPage<R> {
    pub fn from_rows(rows: Vec<R>) -> Self {
        Self {
            rows: Some(rows),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_current_page(mut self, page: u32) -> Self {
        self.current_page = Some(page);
        self
    }

    #[must_use]
    pub fn with_total_pages(mut self, total: u32) -> Self {
        self.total_pages = Some(total);
        self
    }

    #[must_use]
    pub fn with_total_records(mut self, total: u64) -> Self {
        self.total_records = Some(total);
        self
    }

    /// Fill missing or nonsensical fields.
    ///
    /// `requested_page_size` is used when the backend does not echo one back.
    pub fn normalize(self, requested_page_size: u32) -> Page<R> {
        let current_page = self.current_page.filter(|p| *p >= 1).unwrap_or(1);
        let total_pages = self
            .total_pages
            .filter(|t| *t >= 1)
            .unwrap_or(1)
            .max(current_page);
        Page {
            rows: self.rows.unwrap_or_default(),
            current_page,
            page_size: self
                .page_size
                .filter(|s| *s >= 1)
                .unwrap_or(requested_page_size.max(1)),
            total_pages,
            total_records: self.total_records,
        }
    }
}

impl<R> From<Page<R>> for RawPage<R> {
    fn from(page: Page<R>) -> Self {
        Self {
            rows: Some(page.rows),
            current_page: Some(page.current_page),
            page_size: Some(page.page_size),
            total_pages: Some(page.total_pages),
            total_records: page.total_records,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_defaults_missing_fields() {
        let page = RawPage::<u8>::default().normalize(20);
        assert_eq!(page.current_page, 1);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.page_size, 20);
        assert!(page.rows.is_empty());
    }

    #[test]
    fn normalize_keeps_total_pages_consistent() {
        let page = RawPage::from_rows(vec![1, 2])
            .with_current_page(4)
            .with_total_pages(2)
            .normalize(2);
        assert_eq!(page.total_pages, 4);
        assert!(!page.has_next());
        assert!(page.has_previous());
    }

    #[test]
    fn deserializes_backend_aliases() {
        let raw: RawPage<String> =
            serde_json::from_str(r#"{"data": ["a", "b"], "total": 3, "currentPage": 2}"#).unwrap();
        let page = raw.normalize(2);
        assert_eq!(page.rows, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.current_page, 2);
        assert_eq!(page.record_range(), (3, 4));
    }

    #[test]
    fn record_range_for_empty_page() {
        assert_eq!(Page::<u8>::empty(10).record_range(), (0, 0));
    }
}

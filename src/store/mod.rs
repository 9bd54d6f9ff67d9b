pub mod memory;
pub mod spanner;

pub use memory::MemoryStore;
pub use spanner::SpannerStore;

use anyhow::Result;
use async_trait::async_trait;

/// Page size used when the caller does not ask for one
pub const DEFAULT_LIST_LIMIT: usize = 1000;
/// Largest page a single list call returns
pub const MAX_LIST_LIMIT: usize = 1000;

/// Options for a paginated listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Continue after the page that returned this cursor
    pub cursor: Option<String>,
    pub limit: Option<usize>,
}

impl ListOptions {
    /// Requested page size, defaulted and clamped.
    pub fn page_size(&self) -> usize {
        self.limit
            .unwrap_or(DEFAULT_LIST_LIMIT)
            .clamp(1, MAX_LIST_LIMIT)
    }
}

/// A key name as reported by a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEntry {
    pub name: String,
}

/// One page of a key listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListPage {
    pub keys: Vec<KeyEntry>,
    /// Present when more keys follow this page
    pub cursor: Option<String>,
    pub list_complete: bool,
}

impl ListPage {
    /// Build a page from up to `page_size + 1` ordered names; the extra
    /// name, if present, only signals that the listing continues.
    pub(crate) fn from_overfetch(mut names: Vec<String>, page_size: usize) -> Self {
        let list_complete = names.len() <= page_size;
        names.truncate(page_size);
        let cursor = if list_complete {
            None
        } else {
            names.last().cloned()
        };

        Self {
            keys: names.into_iter().map(|name| KeyEntry { name }).collect(),
            cursor,
            list_complete,
        }
    }
}

/// Capabilities the gateway needs from a key-value store.
///
/// Keys and contents are opaque strings in a flat namespace.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Fetch the content stored under `key`, `None` when absent.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `content` under `key`, replacing any existing value.
    async fn put(&self, key: &str, content: &str) -> Result<()>;

    /// Remove `key`. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// List key names in ascending order, one page at a time.
    async fn list(&self, options: ListOptions) -> Result<ListPage>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(page: &ListPage) -> Vec<&str> {
        page.keys.iter().map(|k| k.name.as_str()).collect()
    }

    #[test]
    fn test_page_size_defaults_and_clamps() {
        assert_eq!(ListOptions::default().page_size(), DEFAULT_LIST_LIMIT);
        let big = ListOptions { cursor: None, limit: Some(50_000) };
        assert_eq!(big.page_size(), MAX_LIST_LIMIT);
        let small = ListOptions { cursor: None, limit: Some(3) };
        assert_eq!(small.page_size(), 3);
    }

    #[test]
    fn test_page_with_extra_row_has_cursor() {
        let page = ListPage::from_overfetch(
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
            2,
        );
        assert_eq!(names(&page), vec!["a", "b"]);
        assert_eq!(page.cursor.as_deref(), Some("b"));
        assert!(!page.list_complete);
    }

    #[test]
    fn test_exact_page_is_complete() {
        let page = ListPage::from_overfetch(vec!["a".to_string(), "b".to_string()], 2);
        assert_eq!(names(&page), vec!["a", "b"]);
        assert_eq!(page.cursor, None);
        assert!(page.list_complete);
    }
}

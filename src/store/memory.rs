use std::collections::BTreeMap;
use std::ops::Bound;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{KvStore, ListOptions, ListPage};

/// In-process store, ordered by key.
///
/// Used for local development and tests; nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, content: &str) -> Result<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), content.to_string());
        tracing::debug!("Stored value for key: {}", key);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        tracing::debug!("Deleted key: {}", key);
        Ok(())
    }

    async fn list(&self, options: ListOptions) -> Result<ListPage> {
        let page_size = options.page_size();
        let entries = self.entries.read().await;

        let lower = match options.cursor.as_deref() {
            Some(cursor) => Bound::Excluded(cursor),
            None => Bound::Unbounded,
        };

        let names: Vec<String> = entries
            .range::<str, _>((lower, Bound::Unbounded))
            .take(page_size + 1)
            .map(|(key, _)| key.clone())
            .collect();

        Ok(ListPage::from_overfetch(names, page_size))
    }
}

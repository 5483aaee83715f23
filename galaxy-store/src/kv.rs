use async_trait::async_trait;
use galaxy_core::repository::StoreResult;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Flat string key-value storage. Values are JSON documents.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    async fn set(&self, key: &str, value: String) -> StoreResult<()>;

    /// Writes every pair or none of them.
    async fn set_many(&self, entries: Vec<(String, String)>) -> StoreResult<()>;

    /// Values of every key starting with `prefix`, in no particular order.
    async fn get_by_prefix(&self, prefix: &str) -> StoreResult<Vec<String>>;
}

/// Process-local backend for development and tests.
#[derive(Default)]
pub struct MemoryKv {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryKv {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> StoreResult<()> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn set_many(&self, entries: Vec<(String, String)>) -> StoreResult<()> {
        self.entries.write().await.extend(entries);
        Ok(())
    }

    async fn get_by_prefix(&self, prefix: &str) -> StoreResult<Vec<String>> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(_, value)| value.clone())
            .collect())
    }
}

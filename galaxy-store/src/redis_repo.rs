use async_trait::async_trait;
use galaxy_core::repository::{StoreError, StoreResult};
use redis::AsyncCommands;
use tracing::info;

use crate::kv::KvStore;

#[derive(Clone)]
pub struct RedisClient {
    client: redis::Client,
}

impl RedisClient {
    pub async fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        // Fail at startup rather than on the first request.
        let mut conn = client.get_multiplexed_async_connection().await?;
        redis::cmd("PING").query_async::<String>(&mut conn).await?;
        info!("Connected to Redis at {}", connection_string);
        Ok(Self { client })
    }

    async fn connection(&self) -> StoreResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(StoreError::backend)
    }
}

#[async_trait]
impl KvStore for RedisClient {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut conn = self.connection().await?;
        conn.get(key).await.map_err(StoreError::backend)
    }

    async fn set(&self, key: &str, value: String) -> StoreResult<()> {
        let mut conn = self.connection().await?;
        conn.set::<_, _, ()>(key, value).await.map_err(StoreError::backend)
    }

    async fn set_many(&self, entries: Vec<(String, String)>) -> StoreResult<()> {
        let mut conn = self.connection().await?;
        let mut pipe = redis::pipe();
        pipe.atomic();
        for (key, value) in entries {
            pipe.set(key, value).ignore();
        }
        pipe.query_async::<()>(&mut conn).await.map_err(StoreError::backend)
    }

    async fn get_by_prefix(&self, prefix: &str) -> StoreResult<Vec<String>> {
        let mut conn = self.connection().await?;
        let keys: Vec<String> = redis::cmd("KEYS")
            .arg(format!("{}*", prefix))
            .query_async(&mut conn)
            .await
            .map_err(StoreError::backend)?;

        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let values: Vec<Option<String>> = redis::cmd("MGET")
            .arg(&keys)
            .query_async(&mut conn)
            .await
            .map_err(StoreError::backend)?;
        Ok(values.into_iter().flatten().collect())
    }
}

use redis::AsyncCommands;
use redis::Client;
use std::fmt::Display;
use tokio::sync::mpsc;

use crate::error::AppError;
use crate::error::AppResult;
use crate::models::ContentKind;

/// Keys for cached catalog responses, one namespace per gateway operation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Trending { kind: ContentKind, page: u32 },
    Discover(String),
    Search { kind: ContentKind, query: String, page: u32 },
    Details { kind: ContentKind, id: i64 },
    Similar { kind: ContentKind, id: i64, page: u32 },
    ByGenre { kind: ContentKind, genre_id: i64, page: u32 },
    WatchProviders { kind: ContentKind, id: i64 },
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::Trending { kind, page } => write!(f, "trending:{}:{}", kind, page),
            CacheKey::Discover(params) => write!(f, "discover:{}", params),
            CacheKey::Search { kind, query, page } => {
                write!(f, "search:{}:{}:{}", kind, page, query.to_lowercase())
            }
            CacheKey::Details { kind, id } => write!(f, "details:{}:{}", kind, id),
            CacheKey::Similar { kind, id, page } => write!(f, "similar:{}:{}:{}", kind, id, page),
            CacheKey::ByGenre {
                kind,
                genre_id,
                page,
            } => write!(f, "genre:{}:{}:{}", kind, genre_id, page),
            CacheKey::WatchProviders { kind, id } => write!(f, "providers:{}:{}", kind, id),
        }
    }
}

/// Creates a Redis client for caching
///
/// Establishes a connection to Redis for fast data caching.
/// Uses connection pooling via the connection-manager feature.
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Message for asynchronous cache writes
struct CacheWriteMessage {
    key: String,
    value: String,
    ttl: u64,
}

/// Cache handler for storing and retrieving data from Redis
#[derive(Clone)]
pub struct Cache {
    redis_client: Client,
    write_tx: mpsc::UnboundedSender<CacheWriteMessage>,
}

/// Handle for gracefully shutting down the cache writer
pub struct CacheWriterHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl CacheWriterHandle {
    /// Initiates a graceful shutdown of the cache writer
    ///
    /// Sends a shutdown signal to the writer task, which flushes all pending
    /// writes to Redis before exiting.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        tracing::info!("Cache writer shutdown signal sent");
    }
}

impl Cache {
    /// Creates a new Cache instance with an async write background task
    ///
    /// This spawns a background task that processes cache writes asynchronously,
    /// preventing cache operations from blocking API responses.
    pub fn new(redis_client: Client) -> (Self, CacheWriterHandle) {
        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let client = redis_client.clone();
        tokio::spawn(async move {
            Self::cache_writer_task(client, write_rx, shutdown_rx).await;
        });

        let cache = Self {
            redis_client,
            write_tx,
        };

        let handle = CacheWriterHandle { shutdown_tx };

        (cache, handle)
    }

    /// Background task that processes cache write messages
    ///
    /// Continuously receives cache write requests from the channel and writes them
    /// to Redis. On shutdown signal, flushes all queued messages before exiting.
    async fn cache_writer_task(
        client: Client,
        mut write_rx: mpsc::UnboundedReceiver<CacheWriteMessage>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        tracing::info!("Cache writer task started");

        loop {
            tokio::select! {
                Some(msg) = write_rx.recv() => {
                    if let Err(e) = Self::write_to_redis(&client, msg).await {
                        tracing::error!(error = %e, "Failed to write to Redis cache");
                    }
                }
                _ = shutdown_rx.recv() => {
                    write_rx.close();
                    tracing::info!("Cache writer shutting down, flushing remaining writes");

                    while let Some(msg) = write_rx.recv().await {
                        if let Err(e) = Self::write_to_redis(&client, msg).await {
                            tracing::error!(error = %e, "Failed to flush cache write during shutdown");
                        }
                    }

                    tracing::info!("Cache writer task stopped");
                    break;
                }
            }
        }
    }

    /// Writes a single message to Redis
    async fn write_to_redis(client: &Client, msg: CacheWriteMessage) -> AppResult<()> {
        let mut conn = client.get_multiplexed_async_connection().await?;
        let _: () = conn.set_ex(msg.key, msg.value, msg.ttl).await?;
        Ok(())
    }

    /// Retrieves a value from the cache by key
    ///
    /// If the key exists in the cache, the value is deserialized and returned.
    /// If the key does not exist, `None` is returned.
    pub async fn get_from_cache<T: serde::de::DeserializeOwned>(
        &self,
        key: &CacheKey,
    ) -> AppResult<Option<T>> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let cached: Option<String> = conn.get(key.to_string()).await?;

        match cached {
            Some(json) => {
                let data = serde_json::from_str(&json).map_err(|e| {
                    AppError::Internal(format!("Cache deserialization error: {}", e))
                })?;
                Ok(Some(data))
            }
            None => Ok(None),
        }
    }

    /// Stores a value in the cache asynchronously without blocking
    ///
    /// The value is serialized and handed to the background writer; this
    /// method returns immediately without waiting for the write to complete.
    pub fn set_in_background<T: serde::Serialize>(&self, key: &CacheKey, value: &T, ttl: u64) {
        let json = match serde_json::to_string(value) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!(error = %e, "Cache serialization error");
                return;
            }
        };

        let msg = CacheWriteMessage {
            key: key.to_string(),
            value: json,
            ttl,
        };

        if let Err(e) = self.write_tx.send(msg) {
            tracing::error!(error = %e, "Failed to send cache write message");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_display_trending() {
        let key = CacheKey::Trending {
            kind: ContentKind::Tv,
            page: 2,
        };
        assert_eq!(key.to_string(), "trending:tv:2");
    }

    #[test]
    fn test_cache_key_display_search_lowercases_query() {
        let key = CacheKey::Search {
            kind: ContentKind::Movie,
            query: "THE MATRIX".to_string(),
            page: 1,
        };
        assert_eq!(key.to_string(), "search:movie:1:the matrix");
    }

    #[test]
    fn test_cache_key_display_details_and_similar() {
        let details = CacheKey::Details {
            kind: ContentKind::Movie,
            id: 550,
        };
        let similar = CacheKey::Similar {
            kind: ContentKind::Movie,
            id: 550,
            page: 1,
        };
        assert_eq!(details.to_string(), "details:movie:550");
        assert_eq!(similar.to_string(), "similar:movie:550:1");
    }

    #[test]
    fn test_cache_key_display_genre_and_providers() {
        let genre = CacheKey::ByGenre {
            kind: ContentKind::Movie,
            genre_id: 878,
            page: 3,
        };
        let providers = CacheKey::WatchProviders {
            kind: ContentKind::Tv,
            id: 1396,
        };
        assert_eq!(genre.to_string(), "genre:movie:878:3");
        assert_eq!(providers.to_string(), "providers:tv:1396");
    }

    fn redis_url() -> String {
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string())
    }

    #[tokio::test]
    #[ignore = "requires a running Redis"]
    async fn test_cache_miss() {
        let client = create_redis_client(&redis_url()).unwrap();
        let (cache, _handle) = Cache::new(client);

        let key = CacheKey::Discover("nonexistent_key_12345".to_string());
        let retrieved: Option<Vec<String>> = cache.get_from_cache(&key).await.unwrap();

        assert_eq!(retrieved, None);
    }

    #[tokio::test]
    #[ignore = "requires a running Redis"]
    async fn test_set_in_background_writes_to_cache() {
        let client = create_redis_client(&redis_url()).unwrap();
        let (cache, _handle) = Cache::new(client.clone());

        let key = CacheKey::Trending {
            kind: ContentKind::Movie,
            page: 999,
        };
        let value = serde_json::json!({ "results": [{ "id": 550 }] });

        cache.set_in_background(&key, &value, 60);
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        let retrieved: Option<serde_json::Value> = cache.get_from_cache(&key).await.unwrap();
        assert_eq!(retrieved, Some(value));

        let mut conn = client.get_multiplexed_async_connection().await.unwrap();
        let _: () = conn.del(key.to_string()).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires a running Redis"]
    async fn test_cache_writer_graceful_shutdown_flushes() {
        let client = create_redis_client(&redis_url()).unwrap();
        let (cache, handle) = Cache::new(client.clone());

        let key = CacheKey::Details {
            kind: ContentKind::Movie,
            id: -1,
        };
        let value = vec!["shutdown_test".to_string()];

        cache.set_in_background(&key, &value, 60);
        handle.shutdown().await;
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        let retrieved: Option<Vec<String>> = cache.get_from_cache(&key).await.unwrap();
        assert_eq!(retrieved, Some(value));

        let mut conn = client.get_multiplexed_async_connection().await.unwrap();
        let _: () = conn.del(key.to_string()).await.unwrap();
    }
}

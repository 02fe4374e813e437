/// Read-through caching for an async computation returning `AppResult<T>`.
///
/// Looks the key up first and returns the cached value on a hit. On a miss the
/// block is awaited; a successful value is handed to the background writer and
/// returned, an error is returned without touching the cache. A failing cache
/// read is logged and treated as a miss, so Redis outages never fail a request.
///
/// # Arguments
/// * `$cache`: The cache instance. It must have `get_from_cache` and
///   `set_in_background` methods.
/// * `$key`: The key to use for caching the value.
/// * `$ttl`: The time-to-live (TTL) for the cached value in seconds.
/// * `$block`: The future to await if the value is not found in cache.
///
/// # Example
/// ```rust,ignore
/// let trending = cached!(cache, key, 120, async move {
///     inner.trending(kind, page).await
/// });
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        match $cache.get_from_cache(&key).await {
            Ok(Some(cached)) => {
                tracing::debug!(key = %key, "Cache hit");
                Ok(cached)
            }
            result => {
                if let Err(e) = result {
                    tracing::warn!(key = %key, error = %e, "Cache read failed, treating as miss");
                }
                let value = $block.await?;
                $cache.set_in_background(&key, &value, $ttl);
                Ok(value)
            }
        }
    }};
}

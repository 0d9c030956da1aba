/// A macro to simplify read-through caching with a stale fallback.
///
/// Returns the fresh cached value if there is one. Otherwise the block is awaited: on
/// success its value is stored and returned; on failure the stale entry is returned if one
/// exists, else `Default::default()`.
///
/// # Arguments
/// * `$cache`: a `ResponseCache` (anything with `get`, `get_stale` and `put`).
/// * `$key`: the `CacheKey` for the value.
/// * `$now`: the current time, usually from the owner's `Clock`.
/// * `$block`: a future yielding `AppResult<V>`, awaited only on a miss.
///
/// # Example
/// ```rust,ignore
/// let movies = cached!(cache, key, clock.now(), async move {
///     provider.fetch_list(list).await
/// });
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $now:expr, $block:expr) => {{
        let now = $now;
        if let Some(cached) = $cache.get(&$key, now) {
            cached
        } else {
            match $block.await {
                Ok(value) => {
                    $cache.put($key.clone(), ::std::clone::Clone::clone(&value), now);
                    value
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        key = %$key,
                        "Cache refresh failed, serving stale entry"
                    );
                    $cache.get_stale(&$key).unwrap_or_default()
                }
            }
        }
    }};
}

//! Time-bounded memoization for upstream fetches.
//!
//! Each client owns one [`TtlCache`] and routes every external call through
//! [`TtlCache::get_or_fetch`]. A hit inside the TTL window never touches the
//! network; an expired or missing entry triggers exactly one fetch. Failed
//! fetches are not stored.

use std::{collections::HashMap, fmt, future::Future, hash::Hash, time::Duration};

use tokio::{sync::Mutex, time::Instant};

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: Mutex<HashMap<K, Entry<V>>>,
}

impl<K, V> fmt::Debug for TtlCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlCache").field("ttl", &self.ttl).finish_non_exhaustive()
    }
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entries: Mutex::new(HashMap::new()) }
    }

    /// Return the cached value for `key`, or run `fetch` and remember its result.
    ///
    /// The lock is held across the fetch, so concurrent callers for an expired
    /// entry wait for the single in-flight request instead of issuing their own.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: K, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let mut entries = self.entries.lock().await;

        if let Some(entry) = entries.get(&key) {
            if Instant::now() < entry.expires_at {
                tracing::debug!("cache hit");
                return Ok(entry.value.clone());
            }
        }

        tracing::debug!("cache miss, fetching");
        let value = fetch().await?;
        entries.insert(
            key,
            Entry { value: value.clone(), expires_at: Instant::now() + self.ttl },
        );
        Ok(value)
    }
}

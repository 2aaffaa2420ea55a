//! Request cache for single-record-per-user fetches.
//!
//! Each key is either absent, `Pending` on a shared in-flight fetch, or
//! `Ready` with the resolved value and the instant it resolved. Concurrent
//! callers for a pending key await the same fetch, so there is at most one
//! fetch in flight per key.
//!
//! Fetches run on their own task and always run to completion, even if
//! every caller awaiting them goes away. On success the entry becomes
//! `Ready`; on failure it is removed so the next caller retries. A fetch
//! whose entry was invalidated while it ran does not write its result back.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use little_things_core::error::DataError;
use tokio::sync::RwLock;
use tokio::time::Instant;

type SharedFetch<T> = Shared<BoxFuture<'static, Result<T, DataError>>>;

enum CacheEntry<T> {
    Pending { fetch: SharedFetch<T>, token: u64 },
    Ready { value: T, resolved_at: Instant },
}

type Entries<T> = Arc<RwLock<HashMap<String, CacheEntry<T>>>>;

/// Observable state of one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    Empty,
    Pending,
    /// `fresh` is false once the time-to-live has elapsed.
    Ready { fresh: bool },
}

/// Per-key memoization of fetches with in-flight sharing and a TTL.
pub struct RequestCache<T> {
    ttl: Duration,
    entries: Entries<T>,
    next_token: AtomicU64,
}

impl<T> RequestCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Arc::new(RwLock::new(HashMap::new())),
            next_token: AtomicU64::new(0),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the fresh cached value for `key`, join the fetch already in
    /// flight for it, or start `fetch`.
    pub async fn get_or_fetch<F, Fut>(&self, key: &str, fetch: F) -> Result<T, DataError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, DataError>> + Send + 'static,
    {
        let shared = {
            let mut entries = self.entries.write().await;
            match entries.get(key) {
                Some(CacheEntry::Ready { value, resolved_at })
                    if resolved_at.elapsed() < self.ttl =>
                {
                    tracing::debug!(key, "Request cache hit");
                    return Ok(value.clone());
                }
                Some(CacheEntry::Pending { fetch: in_flight, .. }) => {
                    tracing::debug!(key, "Joining in-flight fetch");
                    in_flight.clone()
                }
                _ => {
                    let token = self.next_token.fetch_add(1, Ordering::Relaxed);
                    let shared = self.spawn_fetch(key, token, fetch());
                    entries.insert(
                        key.to_string(),
                        CacheEntry::Pending {
                            fetch: shared.clone(),
                            token,
                        },
                    );
                    shared
                }
            }
        };
        shared.await
    }

    fn spawn_fetch<Fut>(&self, key: &str, token: u64, fut: Fut) -> SharedFetch<T>
    where
        Fut: Future<Output = Result<T, DataError>> + Send + 'static,
    {
        let entries = Arc::clone(&self.entries);
        let task_key = key.to_string();
        let handle = tokio::spawn(async move {
            let result = fut.await;
            settle(&entries, &task_key, token, result.as_ref().ok().cloned()).await;
            result
        });

        let entries = Arc::clone(&self.entries);
        let join_key = key.to_string();
        async move {
            match handle.await {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!(key = %join_key, error = %e, "Cached fetch task failed");
                    settle(&entries, &join_key, token, None).await;
                    Err(DataError::RemoteUnavailable {
                        action: "complete the request",
                        message: e.to_string(),
                    })
                }
            }
        }
        .boxed()
        .shared()
    }

    /// Drop the entry for `key`. A fetch still in flight for it keeps
    /// running but will not repopulate the entry.
    pub async fn invalidate(&self, key: &str) {
        if self.entries.write().await.remove(key).is_some() {
            tracing::debug!(key, "Request cache entry invalidated");
        }
    }

    /// Drop every entry.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn state(&self, key: &str) -> EntryState {
        match self.entries.read().await.get(key) {
            None => EntryState::Empty,
            Some(CacheEntry::Pending { .. }) => EntryState::Pending,
            Some(CacheEntry::Ready { resolved_at, .. }) => EntryState::Ready {
                fresh: resolved_at.elapsed() < self.ttl,
            },
        }
    }
}

/// Replace the pending entry `token` with its outcome. `None` removes it.
async fn settle<T>(entries: &Entries<T>, key: &str, token: u64, value: Option<T>) {
    let mut entries = entries.write().await;
    let still_pending = matches!(
        entries.get(key),
        Some(CacheEntry::Pending { token: current, .. }) if *current == token
    );
    if !still_pending {
        return;
    }
    match value {
        Some(value) => {
            entries.insert(
                key.to_string(),
                CacheEntry::Ready {
                    value,
                    resolved_at: Instant::now(),
                },
            );
        }
        None => {
            entries.remove(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    const TTL: Duration = Duration::from_secs(300);

    fn counted(
        calls: &Arc<AtomicUsize>,
        value: u32,
    ) -> impl FnOnce() -> BoxFuture<'static, Result<u32, DataError>> {
        let calls = Arc::clone(calls);
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { Ok(value) }.boxed()
        }
    }

    async fn settle_tasks() {
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn fresh_value_is_served_without_refetch() {
        let cache = RequestCache::new(TTL);
        let calls = Arc::new(AtomicUsize::new(0));

        assert_eq!(cache.get_or_fetch("u1", counted(&calls, 1)).await, Ok(1));
        tokio::time::advance(Duration::from_secs(299)).await;
        assert_eq!(cache.get_or_fetch("u1", counted(&calls, 2)).await, Ok(1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.state("u1").await, EntryState::Ready { fresh: true });
    }

    #[tokio::test(start_paused = true)]
    async fn expired_value_is_refetched() {
        let cache = RequestCache::new(TTL);
        let calls = Arc::new(AtomicUsize::new(0));

        cache.get_or_fetch("u1", counted(&calls, 1)).await.unwrap();
        tokio::time::advance(Duration::from_secs(301)).await;
        assert_eq!(cache.state("u1").await, EntryState::Ready { fresh: false });

        assert_eq!(cache.get_or_fetch("u1", counted(&calls, 2)).await, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_fetch() {
        let cache = Arc::new(RequestCache::new(TTL));
        let calls = Arc::new(AtomicUsize::new(0));
        let gate = Arc::new(Notify::new());

        let mut handles = Vec::new();
        for _ in 0..4 {
            let cache = Arc::clone(&cache);
            let calls = Arc::clone(&calls);
            let gate = Arc::clone(&gate);
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_fetch("u1", move || {
                        calls.fetch_add(1, Ordering::SeqCst);
                        async move {
                            gate.notified().await;
                            Ok(7u32)
                        }
                    })
                    .await
            }));
        }
        settle_tasks().await;
        assert_eq!(cache.state("u1").await, EntryState::Pending);

        gate.notify_one();
        for handle in handles {
            assert_eq!(handle.await.unwrap(), Ok(7));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn keys_are_independent() {
        let cache = RequestCache::new(TTL);
        let calls = Arc::new(AtomicUsize::new(0));
        cache.get_or_fetch("u1", counted(&calls, 1)).await.unwrap();
        cache.get_or_fetch("u2", counted(&calls, 2)).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len().await, 2);
    }

    #[tokio::test]
    async fn failed_fetch_removes_entry() {
        let cache = RequestCache::<u32>::new(TTL);
        let result = cache
            .get_or_fetch("u1", || async {
                Err(DataError::RemoteUnavailable {
                    action: "load your settings",
                    message: "down".into(),
                })
            })
            .await;
        assert_matches!(result, Err(DataError::RemoteUnavailable { .. }));
        assert_eq!(cache.state("u1").await, EntryState::Empty);

        let calls = Arc::new(AtomicUsize::new(0));
        assert_eq!(cache.get_or_fetch("u1", counted(&calls, 3)).await, Ok(3));
    }

    #[tokio::test]
    async fn invalidated_pending_fetch_is_not_written_back() {
        let cache = Arc::new(RequestCache::new(TTL));
        let gate = Arc::new(Notify::new());

        let waiter = {
            let cache = Arc::clone(&cache);
            let gate = Arc::clone(&gate);
            tokio::spawn(async move {
                cache
                    .get_or_fetch("u1", move || async move {
                        gate.notified().await;
                        Ok(1u32)
                    })
                    .await
            })
        };
        settle_tasks().await;
        cache.invalidate("u1").await;
        gate.notify_one();

        assert_eq!(waiter.await.unwrap(), Ok(1));
        settle_tasks().await;
        assert_eq!(cache.state("u1").await, EntryState::Empty);
    }

    #[tokio::test]
    async fn abandoned_fetch_still_populates_cache() {
        let cache = Arc::new(RequestCache::new(TTL));
        let gate = Arc::new(Notify::new());

        let caller = {
            let cache = Arc::clone(&cache);
            let gate = Arc::clone(&gate);
            tokio::spawn(async move {
                cache
                    .get_or_fetch("u1", move || async move {
                        gate.notified().await;
                        Ok(9u32)
                    })
                    .await
            })
        };
        settle_tasks().await;
        caller.abort();
        gate.notify_one();
        settle_tasks().await;

        assert_eq!(cache.state("u1").await, EntryState::Ready { fresh: true });
        let calls = Arc::new(AtomicUsize::new(0));
        assert_eq!(cache.get_or_fetch("u1", counted(&calls, 0)).await, Ok(9));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn clear_drops_everything() {
        let cache = RequestCache::new(TTL);
        let calls = Arc::new(AtomicUsize::new(0));
        cache.get_or_fetch("u1", counted(&calls, 1)).await.unwrap();
        cache.clear().await;
        assert!(cache.is_empty().await);
    }
}

use std::{collections::HashMap, sync::Arc, time::Duration};

use serde::de::DeserializeOwned;
use tokio::{sync::Mutex, time::Instant};

use crate::{
    api::{ApiClient, decode},
    config::Config,
    error::Result,
};

#[derive(Default)]
struct Entry {
    body: Option<Arc<[u8]>>,
    fetched_at: Option<Instant>,
    generation: u64,
}

#[derive(Default)]
struct Entries {
    by_key: HashMap<String, Entry>,
    /// Bumped by `clear`, which removes every entry outright.
    epoch: u64,
}

/// A key-addressed cache of GET responses.
///
/// A result is served from cache while younger than the stale time. Invalidating
/// a key bumps its generation, and clearing the cache bumps a global epoch, so a
/// request that was already in flight before either is discarded instead of
/// stored.
#[derive(Clone)]
pub struct QueryCache {
    api: ApiClient,
    entries: Arc<Mutex<Entries>>,
    stale_time: Duration,
    retries: u32,
}

impl QueryCache {
    pub fn new(api: ApiClient, config: &Config) -> Self {
        Self {
            api,
            entries: Arc::new(Mutex::new(Entries::default())),
            stale_time: config.query_stale_time,
            retries: config.query_retries,
        }
    }

    /// Returns the cached value for `key`, fetching `path` when missing or stale.
    pub async fn fetch<T: DeserializeOwned>(&self, key: &str, path: &str) -> Result<T> {
        let (epoch, generation) = {
            let mut entries = self.entries.lock().await;
            let epoch = entries.epoch;
            let entry = entries.by_key.entry(key.to_string()).or_default();
            if let (Some(body), Some(at)) = (&entry.body, entry.fetched_at) {
                if at.elapsed() < self.stale_time {
                    tracing::debug!("Query {} served from cache", key);
                    return decode(body);
                }
            }
            (epoch, entry.generation)
        };

        let body: Arc<[u8]> = self.fetch_with_retry(path).await?.into();

        let mut entries = self.entries.lock().await;
        if entries.epoch == epoch {
            let entry = entries.by_key.entry(key.to_string()).or_default();
            if entry.generation == generation {
                entry.body = Some(body.clone());
                entry.fetched_at = Some(Instant::now());
            } else {
                tracing::debug!("Query {} was invalidated mid-flight, discarding result", key);
            }
        } else {
            tracing::debug!("Cache cleared while {} was in flight, discarding result", key);
        }
        drop(entries);

        decode(&body)
    }

    /// Marks `key` stale and discards any in-flight result for it.
    pub async fn invalidate(&self, key: &str) {
        let mut entries = self.entries.lock().await;
        if let Some(entry) = entries.by_key.get_mut(key) {
            entry.body = None;
            entry.fetched_at = None;
            entry.generation += 1;
        }
    }

    /// Invalidates every key starting with `prefix`.
    pub async fn invalidate_prefix(&self, prefix: &str) {
        let mut entries = self.entries.lock().await;
        for (_, entry) in entries
            .by_key
            .iter_mut()
            .filter(|(key, _)| key.starts_with(prefix))
        {
            entry.body = None;
            entry.fetched_at = None;
            entry.generation += 1;
        }
    }

    /// Drops everything. Used when the session ends so no data outlives its user.
    pub async fn clear(&self) {
        let mut entries = self.entries.lock().await;
        entries.by_key.clear();
        entries.epoch += 1;
    }

    /// Number of keys the cache is tracking.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.by_key.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn is_cached(&self, key: &str) -> bool {
        let entries = self.entries.lock().await;
        entries
            .by_key
            .get(key)
            .and_then(|entry| entry.fetched_at)
            .is_some_and(|at| at.elapsed() < self.stale_time)
    }

    async fn fetch_with_retry(&self, path: &str) -> Result<Vec<u8>> {
        let mut attempt = 0;
        loop {
            match self.api.get_raw(path).await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_transient() && attempt < self.retries => {
                    attempt += 1;
                    tracing::debug!("Retrying {} after transient error ({}): {}", path, attempt, e);
                }
                Err(e) => return Err(e),
            }
        }
    }
}

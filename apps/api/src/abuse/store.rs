//! Keyed counters and flags with expiry.
//!
//! Abuse control relies only on the atomic primitives `increment` and
//! `create_if_absent`; no read-then-write sequences. `increment_by`, `get` and
//! `set` exist for the submission statistics.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::Instant;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store backend error: {0}")]
    Backend(String),

    #[error("store value for '{key}' is not an integer")]
    NotAnInteger { key: String },
}

impl From<redis::RedisError> for StoreError {
    fn from(e: redis::RedisError) -> Self {
        StoreError::Backend(e.to_string())
    }
}

#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Atomically adds one and returns the new value. Missing keys start at zero.
    async fn increment(&self, key: &str) -> Result<i64, StoreError>;

    /// Atomically adds `by` and returns the new value.
    async fn increment_by(&self, key: &str, by: i64) -> Result<i64, StoreError>;

    async fn set_expiry(&self, key: &str, ttl: Duration) -> Result<(), StoreError>;

    /// Sets `key` only if absent. Returns `true` if this call created it.
    async fn create_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError>;

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory store
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |t| t > now)
    }
}

/// Single-process store behind one mutex. Used when no Redis URL is configured
/// and in tests. Expiry follows tokio's clock, so paused-time tests can advance it.
#[derive(Debug, Default)]
pub struct InMemoryCounterStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl InMemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CounterStore for InMemoryCounterStore {
    async fn increment(&self, key: &str) -> Result<i64, StoreError> {
        self.increment_by(key, 1).await
    }

    async fn increment_by(&self, key: &str, by: i64) -> Result<i64, StoreError> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        let current = match entries.get(key) {
            Some(entry) if entry.is_live(now) => {
                entry
                    .value
                    .parse::<i64>()
                    .map_err(|_| StoreError::NotAnInteger {
                        key: key.to_string(),
                    })?
            }
            _ => 0,
        };
        let next = current + by;
        let expires_at = entries
            .get(key)
            .filter(|e| e.is_live(now))
            .and_then(|e| e.expires_at);
        entries.insert(
            key.to_string(),
            Entry {
                value: next.to_string(),
                expires_at,
            },
        );
        Ok(next)
    }

    async fn set_expiry(&self, key: &str, ttl: Duration) -> Result<(), StoreError> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        if let Some(entry) = entries.get_mut(key).filter(|e| e.is_live(now)) {
            entry.expires_at = Some(now + ttl);
        }
        Ok(())
    }

    async fn create_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        if entries.get(key).is_some_and(|e| e.is_live(now)) {
            return Ok(false);
        }
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Some(now + ttl),
            },
        );
        Ok(true)
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let now = Instant::now();
        let entries = self.entries.lock().await;
        Ok(entries
            .get(key)
            .filter(|e| e.is_live(now))
            .map(|e| e.value.clone()))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().await;
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: None,
            },
        );
        Ok(())
    }
}

/// Store that fails every call. Test double for the fail-open path.
#[cfg(test)]
pub struct UnavailableStore;

#[cfg(test)]
#[async_trait]
impl CounterStore for UnavailableStore {
    async fn increment(&self, _key: &str) -> Result<i64, StoreError> {
        Err(StoreError::Backend("connection refused".into()))
    }

    async fn increment_by(&self, _key: &str, _by: i64) -> Result<i64, StoreError> {
        Err(StoreError::Backend("connection refused".into()))
    }

    async fn set_expiry(&self, _key: &str, _ttl: Duration) -> Result<(), StoreError> {
        Err(StoreError::Backend("connection refused".into()))
    }

    async fn create_if_absent(
        &self,
        _key: &str,
        _value: &str,
        _ttl: Duration,
    ) -> Result<bool, StoreError> {
        Err(StoreError::Backend("connection refused".into()))
    }

    async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Backend("connection refused".into()))
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Backend("connection refused".into()))
    }
}

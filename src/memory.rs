//! In-memory client (default, thread-safe, async).
//!
//! Uses DashMap for lock-free concurrent access with per-key sharding.
//! Implements the full Promise surface, including native sets and `PX`
//! expiry handled on access, so the whole classify → adapt → store path is
//! exercisable without a server.

use crate::client::{CompatibleClient, Expiry, PromiseCommands};
use crate::error::Result;
use dashmap::DashMap;
use futures::future::BoxFuture;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// In-memory string entry with optional expiration.
struct ValueEntry {
    data: String,
    expires_at: Option<Instant>,
}

impl ValueEntry {
    fn new(data: String, expiry: Option<Expiry>) -> Self {
        let expires_at = expiry.map(|e| Instant::now() + Duration::from_millis(e.time()));
        ValueEntry { data, expires_at }
    }

    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|exp| Instant::now() > exp)
    }
}

/// The command surface; shared between every handle to one client.
struct MemoryCommands {
    strings: DashMap<String, ValueEntry>,
    sets: DashMap<String, HashSet<String>>,
}

impl MemoryCommands {
    fn new() -> Self {
        MemoryCommands {
            strings: DashMap::new(),
            sets: DashMap::new(),
        }
    }

    /// Remove a key of either type, counting at most one removal per key
    /// name as `DEL` does. An expired string entry counts as already gone.
    fn remove(&self, key: &str) -> u64 {
        let had_string = self
            .strings
            .remove(key)
            .is_some_and(|(_, entry)| !entry.is_expired());
        let had_set = self.sets.remove(key).is_some();
        u64::from(had_string || had_set)
    }
}

impl PromiseCommands for MemoryCommands {
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<String>>> {
        Box::pin(async move {
            if let Some(entry) = self.strings.get(key) {
                if !entry.is_expired() {
                    return Ok(Some(entry.data.clone()));
                }
            }

            // Drop the expired entry if one was there.
            self.strings.remove(key);
            Ok(None)
        })
    }

    fn set<'a>(
        &'a self,
        key: &'a str,
        value: &'a str,
        expiry: Option<Expiry>,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.strings
                .insert(key.to_string(), ValueEntry::new(value.to_string(), expiry));
            Ok(())
        })
    }

    fn del<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<u64>> {
        Box::pin(async move { Ok(self.remove(key)) })
    }

    fn sadd<'a>(&'a self, key: &'a str, member: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.sets
                .entry(key.to_string())
                .or_default()
                .insert(member.to_string());
            Ok(())
        })
    }

    fn srem<'a>(&'a self, key: &'a str, member: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            if let Some(mut set) = self.sets.get_mut(key) {
                set.remove(member);
            }
            Ok(())
        })
    }

    fn smembers<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Vec<String>>> {
        Box::pin(async move {
            let members = self
                .sets
                .get(key)
                .map(|set| set.iter().cloned().collect())
                .unwrap_or_default();
            Ok(members)
        })
    }

    fn sismember<'a>(&'a self, key: &'a str, member: &'a str) -> BoxFuture<'a, Result<bool>> {
        Box::pin(async move {
            Ok(self
                .sets
                .get(key)
                .is_some_and(|set| set.contains(member)))
        })
    }
}

/// Thread-safe in-memory client.
///
/// Cloning is cheap and every clone shares the same storage.
///
/// # Example
///
/// ```no_run
/// use any_redis_store::{AnyRedisStore, MemoryClient};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = AnyRedisStore::new(&MemoryClient::new())?;
///
///     store.set("key", "value", None).await?;
///     assert_eq!(store.get("key").await?.as_deref(), Some("value"));
///
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct MemoryClient {
    commands: Arc<MemoryCommands>,
}

impl MemoryClient {
    /// Create a new in-memory client.
    pub fn new() -> Self {
        MemoryClient {
            commands: Arc::new(MemoryCommands::new()),
        }
    }

    /// Current number of string entries.
    pub fn len(&self) -> usize {
        self.commands.strings.len()
    }

    /// Whether no string entries are stored.
    pub fn is_empty(&self) -> bool {
        self.commands.strings.is_empty()
    }
}

impl Default for MemoryClient {
    fn default() -> Self {
        Self::new()
    }
}

impl CompatibleClient for MemoryClient {
    fn promise_commands(&self) -> Option<Arc<dyn PromiseCommands>> {
        Some(self.commands.clone())
    }
}

//! The namespaced store facade handed to the cache layer above.

use crate::adapter::{self, forward_errors, ERROR_CHANNEL_CAPACITY};
use crate::client::{CompatibleClient, ErrorReceiver, Expiry, PromiseCommands};
use crate::error::{Error, Result};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::broadcast;

/// Prefix of the reserved key holding a namespace's membership set.
///
/// The membership key for namespace `N` is `namespace:N`; callers must not
/// choose data keys of that form.
pub const NAMESPACE_PREFIX: &str = "namespace";

/// Key-value store facade over any compatible client.
///
/// The constructor resolves the raw client through [`adapter::create`], so
/// every operation runs against a normalized Promise-style handle regardless
/// of which calling convention the supplied client speaks.
///
/// The underlying store has no "list keys in namespace" primitive, so the
/// facade keeps a server-side membership set per namespace: `set` adds the
/// key, `delete` removes it, and `clear` enumerates it to remove every key
/// ever written. The set can drift ahead of live keys when entries expire
/// server-side; `has()` reports tracked membership, not live presence, and
/// no reconciliation is attempted.
///
/// # Example
///
/// ```no_run
/// # use any_redis_store::{AnyRedisStore, MemoryClient};
/// # use any_redis_store::error::Result;
/// # async fn example() -> Result<()> {
/// let store = AnyRedisStore::new(&MemoryClient::new())?;
///
/// store.set("key", "value", None).await?;
/// let value = store.get("key").await?;
/// assert_eq!(value.as_deref(), Some("value"));
/// # Ok(())
/// # }
/// ```
pub struct AnyRedisStore {
    client: Arc<dyn PromiseCommands>,
    errors: broadcast::Sender<Error>,
    namespace: RwLock<String>,
}

impl AnyRedisStore {
    /// Create a store over the supplied client.
    ///
    /// Must be called from within a Tokio runtime: the classification probe
    /// and error-event forwarding are spawned onto the ambient runtime.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` when the client implements none of the
    /// supported calling conventions.
    pub fn new(client: &dyn CompatibleClient) -> Result<Self> {
        let normalized = adapter::create(client)?;

        let (errors, _) = broadcast::channel(ERROR_CHANNEL_CAPACITY);
        if let Some(rx) = normalized.errors() {
            forward_errors(rx, errors.clone());
        }

        Ok(AnyRedisStore {
            client: normalized,
            errors,
            namespace: RwLock::new(String::new()),
        })
    }

    /// Whether write-time TTLs are honored. Always true for this layer.
    pub fn ttl_support(&self) -> bool {
        true
    }

    /// The current namespace.
    pub fn namespace(&self) -> String {
        match self.namespace.read() {
            Ok(namespace) => namespace.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Retarget the namespace. Allowed at any time; operations already in
    /// flight keep the namespace they started with.
    pub fn set_namespace(&self, namespace: impl Into<String>) {
        let namespace = namespace.into();
        match self.namespace.write() {
            Ok(mut slot) => *slot = namespace,
            Err(poisoned) => *poisoned.into_inner() = namespace,
        }
    }

    /// The reserved key holding the current namespace's membership set.
    pub fn namespace_key(&self) -> String {
        format!("{}:{}", NAMESPACE_PREFIX, self.namespace())
    }

    /// Subscribe to error events from every adaptation layer beneath the
    /// facade (connection loss and other out-of-band client failures).
    pub fn subscribe_errors(&self) -> ErrorReceiver {
        self.errors.subscribe()
    }

    /// Fetch a key. A missing key resolves to `Ok(None)` regardless of which
    /// client variant is underneath.
    ///
    /// # Errors
    /// Returns `Err` if the underlying client fails; the error is propagated
    /// unchanged, with no retry.
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self.client.get(key).await?;
        if value.is_some() {
            debug!("✓ GET {} -> HIT", key);
        } else {
            debug!("✓ GET {} -> MISS", key);
        }
        Ok(value)
    }

    /// Write a key, optionally with a TTL, then record it in the namespace
    /// membership set.
    ///
    /// The value write and the membership write are two independent store
    /// operations; if the second fails after the first succeeded, no
    /// rollback is performed and the error is returned.
    ///
    /// # Errors
    /// Returns `Err` if either store call fails.
    pub async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        let expiry = ttl.map(|d| Expiry::Px(u64::try_from(d.as_millis()).unwrap_or(u64::MAX)));
        self.client.set(key, value, expiry).await?;

        let namespace_key = self.namespace_key();
        self.client.sadd(&namespace_key, key).await?;

        match expiry {
            Some(e) => debug!("✓ SET {} (TTL: {}ms)", key, e.time()),
            None => debug!("✓ SET {}", key),
        }
        Ok(())
    }

    /// Remove a key and its membership record.
    ///
    /// Returns `true` iff the store reported at least one key removed. The
    /// membership removal's outcome does not affect the return value: a
    /// failed `srem` leaves the set to drift and is only logged.
    ///
    /// # Errors
    /// Returns `Err` if the delete itself fails.
    pub async fn delete(&self, key: &str) -> Result<bool> {
        let removed = self.client.del(key).await?;

        let namespace_key = self.namespace_key();
        if let Err(e) = self.client.srem(&namespace_key, key).await {
            warn!(
                "membership removal of {} from {} failed; set may drift: {}",
                key, namespace_key, e
            );
        }

        debug!("✓ DELETE {} (removed: {})", key, removed);
        Ok(removed > 0)
    }

    /// Remove every key ever written under the current namespace, then the
    /// namespace's membership key itself.
    ///
    /// Keys are deleted individually, never as one multi-key delete: in a
    /// cluster deployment all keys of a single `del` must hash to the same
    /// slot, and per-key deletes are the only strategy portable across
    /// every topology. Deletes are issued concurrently and the call
    /// completes once all have settled.
    ///
    /// # Errors
    /// Returns `Err` if any single deletion fails, or the enumeration does.
    pub async fn clear(&self) -> Result<()> {
        let namespace_key = self.namespace_key();
        let members = self.client.smembers(&namespace_key).await?;

        let deletions = members.iter().map(|member| self.client.del(member));
        for outcome in futures::future::join_all(deletions).await {
            outcome?;
        }

        self.client.del(&namespace_key).await?;
        debug!("✓ CLEAR {} ({} keys)", namespace_key, members.len());
        Ok(())
    }

    /// Whether the key is currently tracked as a namespace member.
    ///
    /// This consults the membership set, not the live value, so it can
    /// report `true` for a key that has already expired server-side.
    ///
    /// # Errors
    /// Returns `Error::NotSupported` when the client lacks `sismember`.
    pub async fn has(&self, key: &str) -> Result<bool> {
        let namespace_key = self.namespace_key();
        self.client.sismember(&namespace_key, key).await
    }
}

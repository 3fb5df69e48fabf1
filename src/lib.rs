//! # any-redis-store
//!
//! A client-agnostic Redis storage adapter for generic key-value caches.
//!
//! ## Features
//!
//! - **Client Agnostic:** Works with callback-style clients, future-returning
//!   clients, and clients exposing uppercase command names
//! - **Runtime Classification:** The calling convention is detected at
//!   runtime; no configuration needed
//! - **Identity Preserving:** A client that already satisfies the normalized
//!   contract is passed through unchanged
//! - **Namespaced:** Per-namespace membership tracking makes bulk `clear`
//!   possible on a store with no native key enumeration
//! - **Cluster Friendly:** `clear` deletes keys individually, never as one
//!   multi-key command
//!
//! ## Quick Start
//!
//! ```ignore
//! use any_redis_store::{AnyRedisStore, MemoryClient};
//!
//! // 1. Bring any compatible client
//! let client = MemoryClient::new();
//!
//! // 2. The store classifies and adapts it automatically
//! let store = AnyRedisStore::new(&client)?;
//! store.set_namespace("sessions");
//!
//! // 3. Use it
//! store.set("key", "value", None).await?;
//! let value = store.get("key").await?;
//! store.clear().await?;
//! ```
//!
//! ## Adapting your own client
//!
//! Implement one of the command traits ([`CallbackCommands`],
//! [`PromiseCommands`], [`UppercaseCommands`]) for your client's surface,
//! then [`CompatibleClient`] to expose it. The store does the rest.

#[macro_use]
extern crate log;

pub mod adapter;
pub mod client;
pub mod error;
#[cfg(feature = "inmemory")]
pub mod memory;
#[cfg(feature = "redis")]
pub mod redis_pool;
pub mod store;

// Re-exports for convenience
pub use adapter::{create, CallbackAdapter, UppercaseAdapter};
pub use client::{
    classify, is_promise_client, is_uppercase_client, Callback, CallbackCommands, ClientKind,
    CompatibleClient, ErrorReceiver, Expiry, PromiseCommands, SetOptions, UppercaseCommands,
};
pub use error::{Error, Result};
#[cfg(feature = "inmemory")]
pub use memory::MemoryClient;
pub use store::{AnyRedisStore, NAMESPACE_PREFIX};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

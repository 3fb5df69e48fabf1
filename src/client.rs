//! Client contracts and runtime capability classification.
//!
//! Redis clients in the wild disagree on calling convention: some take a
//! trailing error-first callback, some return futures, and some expose the
//! future-returning commands under their uppercase wire names. This module
//! defines one trait per convention, an opaque handle ([`CompatibleClient`])
//! whose capability accessors stand in for duck-typed method-presence
//! checks, and [`classify`] which decides at runtime which convention a
//! supplied client speaks.

use crate::error::{Error, Result};
use futures::future::BoxFuture;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Key used by the classification probe. The probe is a real `get` whose
/// value is discarded; only the call shape matters.
pub const PROBE_KEY: &str = "hello";

/// Receiver half of a client's out-of-band error events.
pub type ErrorReceiver = broadcast::Receiver<Error>;

/// Error-first reply callback used by callback-style clients.
pub type Callback<T> = Box<dyn FnOnce(Result<T>) + Send + 'static>;

/// Write-time expiry forwarded to the underlying `SET`.
///
/// Only the millisecond mode is used by the store facade, matching the
/// `SET key value PX millis` wire form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    /// Expire the key after the given number of milliseconds.
    Px(u64),
}

impl Expiry {
    /// The wire mode token, forwarded positionally to callback clients.
    pub fn mode(&self) -> &'static str {
        match self {
            Expiry::Px(_) => "PX",
        }
    }

    /// The numeric argument paired with the mode token.
    pub fn time(&self) -> u64 {
        match self {
            Expiry::Px(millis) => *millis,
        }
    }
}

/// Options accepted by the uppercase `SET` command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetOptions {
    /// Expiry in milliseconds (`PX`).
    pub px: Option<u64>,
}

/// The calling conventions a supplied client may implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientKind {
    /// Commands take a trailing error-first callback.
    Callback,
    /// Commands return futures under the usual lowercase names.
    Promise,
    /// Commands return futures under uppercase wire names.
    UppercasePromise,
}

/// The callback calling convention.
///
/// Each command accepts a trailing [`Callback`] invoked exactly once with
/// the command's outcome. `set` takes the expiry as an optional pair so the
/// mode token and time can be forwarded positionally when present and
/// omitted entirely when absent.
pub trait CallbackCommands: Send + Sync {
    fn get(&self, key: &str, cb: Callback<Option<String>>);

    fn set(&self, key: &str, value: &str, expiry: Option<Expiry>, cb: Callback<()>);

    fn del(&self, key: &str, cb: Callback<u64>);

    fn sadd(&self, key: &str, member: &str, cb: Callback<()>);

    fn srem(&self, key: &str, member: &str, cb: Callback<()>);

    fn smembers(&self, key: &str, cb: Callback<Vec<String>>);

    /// Optional capability; clients without a native `sismember` keep the
    /// default, which reports [`Error::NotSupported`].
    fn sismember(&self, key: &str, member: &str, cb: Callback<bool>) {
        let _ = (key, member);
        cb(Err(Error::NotSupported(
            "sismember is not implemented by this client".to_string(),
        )));
    }

    /// Out-of-band error events, when the client emits them.
    fn errors(&self) -> Option<ErrorReceiver> {
        None
    }
}

/// The future-returning calling convention with lowercase command names.
///
/// This is the normalized contract every client is adapted to; the store
/// facade only ever talks to a `dyn PromiseCommands`.
pub trait PromiseCommands: Send + Sync {
    /// Fetch a key. A missing key resolves to `Ok(None)`.
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<String>>>;

    /// Write a key, optionally with a write-time expiry.
    fn set<'a>(
        &'a self,
        key: &'a str,
        value: &'a str,
        expiry: Option<Expiry>,
    ) -> BoxFuture<'a, Result<()>>;

    /// Remove a key, resolving to the number of keys actually removed.
    fn del<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<u64>>;

    fn sadd<'a>(&'a self, key: &'a str, member: &'a str) -> BoxFuture<'a, Result<()>>;

    fn srem<'a>(&'a self, key: &'a str, member: &'a str) -> BoxFuture<'a, Result<()>>;

    fn smembers<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Vec<String>>>;

    /// Optional capability; the default reports [`Error::NotSupported`].
    fn sismember<'a>(&'a self, key: &'a str, member: &'a str) -> BoxFuture<'a, Result<bool>> {
        let _ = (key, member);
        Box::pin(futures::future::ready(Err(Error::NotSupported(
            "sismember is not implemented by this client".to_string(),
        ))))
    }

    /// Out-of-band error events, when the client emits them.
    fn errors(&self) -> Option<ErrorReceiver> {
        None
    }
}

/// The future-returning calling convention with uppercase command names.
///
/// Method names deliberately mirror the adapted client's own surface, where
/// every command is exposed under its uppercase wire name and `SET` takes an
/// options struct instead of positional expiry arguments.
#[allow(non_snake_case)]
pub trait UppercaseCommands: Send + Sync {
    fn GET<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<String>>>;

    fn SET<'a>(
        &'a self,
        key: &'a str,
        value: &'a str,
        options: Option<SetOptions>,
    ) -> BoxFuture<'a, Result<()>>;

    fn DEL<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<u64>>;

    fn SADD<'a>(&'a self, key: &'a str, member: &'a str) -> BoxFuture<'a, Result<()>>;

    fn SREM<'a>(&'a self, key: &'a str, member: &'a str) -> BoxFuture<'a, Result<()>>;

    fn SMEMBERS<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Vec<String>>>;

    /// Optional capability; the default reports [`Error::NotSupported`].
    fn SISMEMBER<'a>(&'a self, key: &'a str, member: &'a str) -> BoxFuture<'a, Result<bool>> {
        let _ = (key, member);
        Box::pin(futures::future::ready(Err(Error::NotSupported(
            "SISMEMBER is not implemented by this client".to_string(),
        ))))
    }

    /// Out-of-band error events, when the client emits them.
    fn errors(&self) -> Option<ErrorReceiver> {
        None
    }
}

/// An opaque handle to whichever client the caller supplies.
///
/// Capability accessors return `None` when the client does not expose the
/// corresponding calling convention; [`classify`] inspects them the same way
/// a duck-typed port would check method presence. A client may expose more
/// than one surface (some clients carry both naming conventions).
///
/// Implementations should return clones of a single stored `Arc` so that the
/// factory's pass-through of a Promise-style client preserves identity
/// (`Arc::ptr_eq` holds between any two handles to the same client).
pub trait CompatibleClient: Send + Sync {
    fn callback_commands(&self) -> Option<Arc<dyn CallbackCommands>> {
        None
    }

    fn promise_commands(&self) -> Option<Arc<dyn PromiseCommands>> {
        None
    }

    fn uppercase_commands(&self) -> Option<Arc<dyn UppercaseCommands>> {
        None
    }
}

/// Determine which calling convention a client implements.
///
/// The probe `get` fires exactly once per call. Precedence is
/// uppercase-first: a client exposing both naming conventions classifies as
/// [`ClientKind::UppercasePromise`]. Anything that offers no future-returning
/// surface falls back to [`ClientKind::Callback`]; classification itself
/// never fails.
pub fn classify(client: &dyn CompatibleClient) -> ClientKind {
    if !probe_thenable(client) {
        return ClientKind::Callback;
    }

    if client.uppercase_commands().is_some() {
        ClientKind::UppercasePromise
    } else if client.promise_commands().is_some() {
        ClientKind::Promise
    } else {
        ClientKind::Callback
    }
}

/// Whether the client satisfies the lowercase future-returning contract.
pub fn is_promise_client(client: &dyn CompatibleClient) -> bool {
    client.promise_commands().is_some() && probe_thenable(client)
}

/// Whether the client satisfies the uppercase future-returning contract.
pub fn is_uppercase_client(client: &dyn CompatibleClient) -> bool {
    client.uppercase_commands().is_some() && probe_thenable(client)
}

/// Issue the probe `get` and report whether a future came back.
///
/// The probe is a real invocation against [`PROBE_KEY`], preferring the
/// lowercase surface when present. Its value is discarded, but the outcome
/// must still be observed so a rejected probe never surfaces as an
/// unhandled failure: the future is handed to the ambient runtime and any
/// error is logged.
fn probe_thenable(client: &dyn CompatibleClient) -> bool {
    let probe: Option<BoxFuture<'static, ()>> = if let Some(commands) = client.promise_commands() {
        Some(Box::pin(async move {
            if let Err(e) = commands.get(PROBE_KEY).await {
                error!("classification probe get({:?}) failed: {}", PROBE_KEY, e);
            }
        }))
    } else if let Some(commands) = client.uppercase_commands() {
        Some(Box::pin(async move {
            if let Err(e) = commands.GET(PROBE_KEY).await {
                error!("classification probe GET({:?}) failed: {}", PROBE_KEY, e);
            }
        }))
    } else {
        None
    };

    match probe {
        Some(fut) => {
            match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    handle.spawn(fut);
                }
                // No runtime means the probe cannot be polled; classification
                // still must not fail.
                Err(_) => debug!("no async runtime available; classification probe not polled"),
            }
            true
        }
        None => false,
    }
}

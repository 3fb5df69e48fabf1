//! Promise adapter over callback-style clients.

use super::{forward_errors, ERROR_CHANNEL_CAPACITY};
use crate::client::{Callback, CallbackCommands, ErrorReceiver, Expiry, PromiseCommands};
use crate::error::{Error, Result};
use futures::future::BoxFuture;
use std::sync::Arc;
use tokio::sync::{broadcast, oneshot};

/// Wraps a callback-style client behind the Promise surface.
///
/// Each command appends a callback that resolves a `oneshot` channel, the
/// channel's receiver becoming the returned future. Every call gets its own
/// channel, so calls are independently invocable and no serialization is
/// imposed beyond what the wrapped client provides.
///
/// If the wrapped client emits error events, the adapter subscribes at
/// construction and re-broadcasts every event on its own bus, so a single
/// subscriber above sees errors from any layer beneath.
pub struct CallbackAdapter {
    client: Arc<dyn CallbackCommands>,
    errors: broadcast::Sender<Error>,
}

impl CallbackAdapter {
    pub fn new(client: Arc<dyn CallbackCommands>) -> Self {
        let (errors, _) = broadcast::channel(ERROR_CHANNEL_CAPACITY);
        if let Some(rx) = client.errors() {
            forward_errors(rx, errors.clone());
        }
        CallbackAdapter { client, errors }
    }
}

/// Build a callback that resolves the paired `oneshot` sender.
fn reply_to<T: Send + 'static>(tx: oneshot::Sender<Result<T>>) -> Callback<T> {
    Box::new(move |outcome| {
        let _ = tx.send(outcome);
    })
}

/// Await a bridged reply. A client that drops the callback without invoking
/// it surfaces as a `ClientError` rather than hanging the caller.
async fn await_reply<T>(rx: oneshot::Receiver<Result<T>>) -> Result<T> {
    rx.await
        .map_err(|_| Error::ClientError("callback client dropped its reply".to_string()))?
}

impl PromiseCommands for CallbackAdapter {
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<String>>> {
        Box::pin(async move {
            let (tx, rx) = oneshot::channel();
            self.client.get(key, reply_to(tx));
            await_reply(rx).await
        })
    }

    fn set<'a>(
        &'a self,
        key: &'a str,
        value: &'a str,
        expiry: Option<Expiry>,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let (tx, rx) = oneshot::channel();
            // The expiry pair is forwarded positionally when present and
            // omitted entirely when absent.
            self.client.set(key, value, expiry, reply_to(tx));
            await_reply(rx).await
        })
    }

    fn del<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<u64>> {
        Box::pin(async move {
            let (tx, rx) = oneshot::channel();
            self.client.del(key, reply_to(tx));
            await_reply(rx).await
        })
    }

    fn sadd<'a>(&'a self, key: &'a str, member: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let (tx, rx) = oneshot::channel();
            self.client.sadd(key, member, reply_to(tx));
            await_reply(rx).await
        })
    }

    fn srem<'a>(&'a self, key: &'a str, member: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let (tx, rx) = oneshot::channel();
            self.client.srem(key, member, reply_to(tx));
            await_reply(rx).await
        })
    }

    fn smembers<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Vec<String>>> {
        Box::pin(async move {
            let (tx, rx) = oneshot::channel();
            self.client.smembers(key, reply_to(tx));
            await_reply(rx).await
        })
    }

    fn sismember<'a>(&'a self, key: &'a str, member: &'a str) -> BoxFuture<'a, Result<bool>> {
        Box::pin(async move {
            let (tx, rx) = oneshot::channel();
            self.client.sismember(key, member, reply_to(tx));
            await_reply(rx).await
        })
    }

    fn errors(&self) -> Option<ErrorReceiver> {
        Some(self.errors.subscribe())
    }
}

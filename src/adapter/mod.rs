//! Adapters that normalize any supported client to the Promise surface.

use crate::client::{classify, ClientKind, CompatibleClient, ErrorReceiver, PromiseCommands};
use crate::error::{Error, Result};
use std::sync::Arc;
use tokio::sync::broadcast;

pub mod callback;
pub mod uppercase;

pub use callback::CallbackAdapter;
pub use uppercase::UppercaseAdapter;

/// Capacity of the error-event buses created by adapters and the store.
pub(crate) const ERROR_CHANNEL_CAPACITY: usize = 16;

/// Produce a client satisfying [`PromiseCommands`], whatever the input shape.
///
/// A client already speaking the lowercase Promise convention is passed
/// through as the identical handle (`Arc::ptr_eq` holds), so callers that own
/// the connection still hold the original object. Uppercase clients are
/// wrapped in an [`UppercaseAdapter`], everything else in a
/// [`CallbackAdapter`].
///
/// This is the single entry point the store facade resolves clients through.
///
/// # Errors
///
/// Returns `Error::ConfigError` when the client exposes none of the
/// supported calling conventions.
pub fn create(client: &dyn CompatibleClient) -> Result<Arc<dyn PromiseCommands>> {
    match classify(client) {
        ClientKind::Promise => client.promise_commands().ok_or_else(|| {
            Error::ConfigError("client classified as Promise offers no lowercase surface".to_string())
        }),
        ClientKind::UppercasePromise => {
            let commands = client.uppercase_commands().ok_or_else(|| {
                Error::ConfigError(
                    "client classified as UppercasePromise offers no uppercase surface".to_string(),
                )
            })?;
            Ok(Arc::new(UppercaseAdapter::new(commands)))
        }
        ClientKind::Callback => {
            let commands = client.callback_commands().ok_or_else(|| {
                Error::ConfigError(
                    "client implements none of the supported calling conventions".to_string(),
                )
            })?;
            Ok(Arc::new(CallbackAdapter::new(commands)))
        }
    }
}

/// Forward every error event from `rx` onto `tx`.
///
/// Each wrapping layer forwards exactly once, so the outermost listener sees
/// a flat broadcast of errors from every layer beneath it. The task ends
/// when the source bus closes.
pub(crate) fn forward_errors(mut rx: ErrorReceiver, tx: broadcast::Sender<Error>) {
    let forward = async move {
        loop {
            match rx.recv().await {
                Ok(error) => {
                    let _ = tx.send(error);
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("error-event forwarding lagged; {} events dropped", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    };

    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(forward);
        }
        Err(_) => debug!("no async runtime available; error events will not be forwarded"),
    }
}

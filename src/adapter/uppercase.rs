//! Promise adapter over uppercase-command clients.

use super::{forward_errors, ERROR_CHANNEL_CAPACITY};
use crate::client::{ErrorReceiver, Expiry, PromiseCommands, SetOptions, UppercaseCommands};
use crate::error::Error;
use crate::error::Result;
use futures::future::BoxFuture;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Wraps a client whose commands already return futures but live under
/// uppercase wire names.
///
/// Pure name translation: `get → GET`, `set → SET`, `del → DEL`,
/// `sadd → SADD`, `srem → SREM`, `smembers → SMEMBERS`,
/// `sismember → SISMEMBER`. The positional expiry pair becomes the options
/// struct the uppercase `SET` expects.
pub struct UppercaseAdapter {
    client: Arc<dyn UppercaseCommands>,
    errors: broadcast::Sender<Error>,
}

impl UppercaseAdapter {
    pub fn new(client: Arc<dyn UppercaseCommands>) -> Self {
        let (errors, _) = broadcast::channel(ERROR_CHANNEL_CAPACITY);
        if let Some(rx) = client.errors() {
            forward_errors(rx, errors.clone());
        }
        UppercaseAdapter { client, errors }
    }
}

impl PromiseCommands for UppercaseAdapter {
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<String>>> {
        self.client.GET(key)
    }

    fn set<'a>(
        &'a self,
        key: &'a str,
        value: &'a str,
        expiry: Option<Expiry>,
    ) -> BoxFuture<'a, Result<()>> {
        match expiry {
            Some(Expiry::Px(millis)) => {
                self.client
                    .SET(key, value, Some(SetOptions { px: Some(millis) }))
            }
            None => self.client.SET(key, value, None),
        }
    }

    fn del<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<u64>> {
        self.client.DEL(key)
    }

    fn sadd<'a>(&'a self, key: &'a str, member: &'a str) -> BoxFuture<'a, Result<()>> {
        self.client.SADD(key, member)
    }

    fn srem<'a>(&'a self, key: &'a str, member: &'a str) -> BoxFuture<'a, Result<()>> {
        self.client.SREM(key, member)
    }

    fn smembers<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Vec<String>>> {
        self.client.SMEMBERS(key)
    }

    fn sismember<'a>(&'a self, key: &'a str, member: &'a str) -> BoxFuture<'a, Result<bool>> {
        self.client.SISMEMBER(key, member)
    }

    fn errors(&self) -> Option<ErrorReceiver> {
        Some(self.errors.subscribe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records every invocation so tests can assert the name translation.
    struct RecordingUppercaseClient {
        calls: Mutex<Vec<String>>,
        errors: broadcast::Sender<Error>,
    }

    impl RecordingUppercaseClient {
        fn new() -> Self {
            let (errors, _) = broadcast::channel(4);
            RecordingUppercaseClient {
                calls: Mutex::new(Vec::new()),
                errors,
            }
        }

        fn record(&self, call: String) {
            self.calls.lock().expect("Failed to lock calls").push(call);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().expect("Failed to lock calls").clone()
        }
    }

    #[allow(non_snake_case)]
    impl UppercaseCommands for RecordingUppercaseClient {
        fn GET<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<String>>> {
            self.record(format!("GET({})", key));
            Box::pin(futures::future::ready(Ok(Some("the value".to_string()))))
        }

        fn SET<'a>(
            &'a self,
            key: &'a str,
            value: &'a str,
            options: Option<SetOptions>,
        ) -> BoxFuture<'a, Result<()>> {
            match options.and_then(|o| o.px) {
                Some(px) => self.record(format!("SET({},{},px={})", key, value, px)),
                None => self.record(format!("SET({},{})", key, value)),
            }
            Box::pin(futures::future::ready(Ok(())))
        }

        fn DEL<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<u64>> {
            self.record(format!("DEL({})", key));
            Box::pin(futures::future::ready(Ok(1)))
        }

        fn SADD<'a>(&'a self, key: &'a str, member: &'a str) -> BoxFuture<'a, Result<()>> {
            self.record(format!("SADD({},{})", key, member));
            Box::pin(futures::future::ready(Ok(())))
        }

        fn SREM<'a>(&'a self, key: &'a str, member: &'a str) -> BoxFuture<'a, Result<()>> {
            self.record(format!("SREM({},{})", key, member));
            Box::pin(futures::future::ready(Ok(())))
        }

        fn SMEMBERS<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Vec<String>>> {
            self.record(format!("SMEMBERS({})", key));
            Box::pin(futures::future::ready(Ok(vec!["a".to_string()])))
        }

        fn SISMEMBER<'a>(&'a self, key: &'a str, member: &'a str) -> BoxFuture<'a, Result<bool>> {
            self.record(format!("SISMEMBER({},{})", key, member));
            Box::pin(futures::future::ready(Ok(true)))
        }

        fn errors(&self) -> Option<ErrorReceiver> {
            Some(self.errors.subscribe())
        }
    }

    #[tokio::test]
    async fn test_adapter_translates_names() {
        let client = Arc::new(RecordingUppercaseClient::new());
        let adapter = UppercaseAdapter::new(client.clone());

        assert_eq!(
            adapter.get("the key").await.expect("Failed to get"),
            Some("the value".to_string())
        );
        adapter.set("k", "v", None).await.expect("Failed to set");
        assert_eq!(adapter.del("k").await.expect("Failed to del"), 1);
        adapter.sadd("ns", "m").await.expect("Failed to sadd");
        adapter.srem("ns", "m").await.expect("Failed to srem");
        assert_eq!(
            adapter.smembers("ns").await.expect("Failed to smembers"),
            vec!["a".to_string()]
        );
        assert!(adapter.sismember("ns", "m").await.expect("Failed to sismember"));

        assert_eq!(
            client.calls(),
            vec![
                "GET(the key)",
                "SET(k,v)",
                "DEL(k)",
                "SADD(ns,m)",
                "SREM(ns,m)",
                "SMEMBERS(ns)",
                "SISMEMBER(ns,m)",
            ]
        );
    }

    #[tokio::test]
    async fn test_adapter_maps_px_expiry_into_options() {
        let client = Arc::new(RecordingUppercaseClient::new());
        let adapter = UppercaseAdapter::new(client.clone());

        adapter
            .set("k", "v", Some(Expiry::Px(500)))
            .await
            .expect("Failed to set");

        assert_eq!(client.calls(), vec!["SET(k,v,px=500)"]);
    }

    #[tokio::test]
    async fn test_adapter_forwards_error_events() {
        let client = Arc::new(RecordingUppercaseClient::new());
        let adapter = UppercaseAdapter::new(client.clone());
        let mut rx = adapter.errors().expect("Missing error bus");

        let emitted = Error::ClientError("connection lost".to_string());
        client
            .errors
            .send(emitted.clone())
            .expect("Failed to emit");

        let received = rx.recv().await.expect("Failed to receive");
        assert_eq!(received, emitted);
    }
}

//! Registry of in-flight executions
//!
//! Concurrent identical requests share one execution. The first caller for
//! a key spawns it and publishes a shared receiver under that key; later
//! callers clone the receiver and wait on the same result.
//!
//! The execution runs as its own task, so a caller that stops waiting does
//! not cancel it. Its registry slot is released by a drop guard owned by
//! the task, which fires on completion, on panic and on runtime shutdown.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use futures::channel::oneshot;
use futures::future::{FutureExt, Shared};
use optiq_domain::FetchError;
use parking_lot::Mutex;
use serde_json::Value;
use tracing::debug;

/// Result delivered to every caller of one execution
pub type FetchResult = Result<Value, FetchError>;

type PendingChannel = Shared<oneshot::Receiver<FetchResult>>;
type PendingMap = Arc<Mutex<HashMap<String, PendingChannel>>>;

/// Map from request key to the shared result of its running execution
///
/// Clones share the same map.
#[derive(Clone, Default)]
pub struct PendingRegistry {
    inner: PendingMap,
}

impl PendingRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach to the execution running under `key`, or start one
    ///
    /// Lookup and insertion happen under one lock, so at most one execution
    /// per key exists at any instant. `start` is only called when no
    /// execution was found; the future it returns is spawned onto the
    /// current tokio runtime.
    ///
    /// The slot is released when the execution settles, before its result
    /// is published. Work the execution does before settling (such as
    /// writing a cache) is therefore visible to anyone who no longer finds
    /// the slot.
    pub fn join_or_start<F, Fut>(&self, key: &str, start: F) -> PendingRequest
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = FetchResult> + Send + 'static,
    {
        let mut map = self.inner.lock();

        if let Some(channel) = map.get(key) {
            debug!(key, "Attaching to in-flight request");
            return PendingRequest { channel: channel.clone(), attached: true };
        }

        let (sender, receiver) = oneshot::channel();
        let release = ReleaseOnDrop { map: Arc::clone(&self.inner), key: key.to_owned() };
        let execution = start();

        tokio::spawn(async move {
            let result = execution.await;
            // Release first: later callers either get this channel or
            // start a new execution.
            drop(release);
            sender.send(result).ok();
        });

        let channel = receiver.shared();
        map.insert(key.to_owned(), channel.clone());
        PendingRequest { channel, attached: false }
    }

    /// Whether an execution is currently registered under `key`
    pub fn contains(&self, key: &str) -> bool {
        self.inner.lock().contains_key(key)
    }

    /// Number of executions in flight
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Whether no execution is in flight
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for PendingRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingRegistry").field("in_flight", &self.len()).finish()
    }
}

/// Handle on a shared execution
#[must_use = "a pending request does nothing unless waited on"]
pub struct PendingRequest {
    channel: PendingChannel,
    attached: bool,
}

impl PendingRequest {
    /// `true` if this handle joined an execution started by another caller
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Wait for the execution's result
    ///
    /// An execution that ended without producing a result (it panicked, or
    /// the runtime shut down) is reported as a network failure.
    pub async fn wait(self) -> FetchResult {
        match self.channel.await {
            Ok(result) => result,
            Err(oneshot::Canceled) => {
                Err(FetchError::network("Request execution ended without a result"))
            }
        }
    }
}

impl std::fmt::Debug for PendingRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingRequest").field("attached", &self.attached).finish_non_exhaustive()
    }
}

struct ReleaseOnDrop {
    map: PendingMap,
    key: String,
}

impl Drop for ReleaseOnDrop {
    fn drop(&mut self) {
        self.map.lock().remove(&self.key);
    }
}

use crate::breadcrumb::Breadcrumb;
use crate::event::Event;
use futures::future::BoxFuture;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

/// Callback consulted before a breadcrumb is appended to the log.
///
/// Runs synchronously; returning `false` vetoes the append and stops
/// evaluating later callbacks.
pub type OnBreadcrumb = Arc<dyn Fn(&mut Breadcrumb) -> bool + Send + Sync>;

type SyncFn = dyn Fn(&mut Event) -> bool + Send + Sync;
type FutureFn = dyn Fn(&mut Event) -> BoxFuture<'static, bool> + Send + Sync;
type ContinuationFn =
    dyn Fn(&mut Event, CompletionHandle) -> Option<BoxFuture<'static, ()>> + Send + Sync;

/// Callback consulted for every candidate event.
///
/// Three calling conventions are supported, each adapted uniformly by the
/// chain runner rather than detected per call site:
///
/// - [`OnError::sync`]: return `false` to discard the event.
/// - [`OnError::future`]: return a future; resolving `false` discards.
/// - [`OnError::callback`]: settle the [`CompletionHandle`], optionally
///   returning a future that drives asynchronous work first.
pub enum OnError {
    Sync(Box<SyncFn>),
    Future(Box<FutureFn>),
    Callback(Box<ContinuationFn>),
}

impl OnError {
    pub fn sync(f: impl Fn(&mut Event) -> bool + Send + Sync + 'static) -> Self {
        OnError::Sync(Box::new(f))
    }

    pub fn future(f: impl Fn(&mut Event) -> BoxFuture<'static, bool> + Send + Sync + 'static) -> Self {
        OnError::Future(Box::new(f))
    }

    pub fn callback(
        f: impl Fn(&mut Event, CompletionHandle) -> Option<BoxFuture<'static, ()>>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        OnError::Callback(Box::new(f))
    }
}

impl std::fmt::Debug for OnError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OnError::Sync(_) => f.write_str("OnError::Sync(..)"),
            OnError::Future(_) => f.write_str("OnError::Future(..)"),
            OnError::Callback(_) => f.write_str("OnError::Callback(..)"),
        }
    }
}

/// Continuation handed to callback-style error middleware.
///
/// The first settlement wins; every later call is a no-op, so a middleware
/// that both returns a future and invokes the continuation cannot
/// double-resolve the chain.
#[derive(Clone)]
pub struct CompletionHandle {
    tx: Arc<Mutex<Option<oneshot::Sender<bool>>>>,
}

impl CompletionHandle {
    pub fn new() -> (Self, oneshot::Receiver<bool>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                tx: Arc::new(Mutex::new(Some(tx))),
            },
            rx,
        )
    }

    /// Settle with an explicit keep/discard decision.
    pub fn resolve(&self, keep: bool) {
        let sender = self.tx.lock().ok().and_then(|mut slot| slot.take());
        if let Some(tx) = sender {
            let _ = tx.send(keep);
        }
    }

    /// Permit delivery.
    pub fn ok(&self) {
        self.resolve(true);
    }

    /// Veto delivery, recording the reason.
    pub fn fail(&self, error: impl std::fmt::Display) {
        tracing::warn!(target: "shrike", "onError continuation failed: {error}");
        self.resolve(false);
    }
}

impl std::fmt::Debug for CompletionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CompletionHandle")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_settlement_wins() {
        let (handle, rx) = CompletionHandle::new();
        handle.resolve(false);
        handle.resolve(true);
        assert_eq!(rx.await, Ok(false));
    }

    #[tokio::test]
    async fn test_fail_vetoes() {
        let (handle, rx) = CompletionHandle::new();
        handle.fail("backend unreachable");
        assert_eq!(rx.await, Ok(false));
    }

    #[tokio::test]
    async fn test_dropped_handle_closes_channel() {
        let (handle, rx) = CompletionHandle::new();
        drop(handle);
        assert!(rx.await.is_err());
    }

    #[tokio::test]
    async fn test_clones_share_one_settlement() {
        let (handle, rx) = CompletionHandle::new();
        let clone = handle.clone();
        clone.ok();
        handle.resolve(false);
        assert_eq!(rx.await, Ok(true));
    }
}

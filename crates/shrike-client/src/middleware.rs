use futures::future::{BoxFuture, FutureExt};
use shrike_core::{CompletionHandle, Event, Logger, OnError};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Run the error middleware chain over a candidate event.
///
/// Every callback is invoked exactly once, synchronously and in
/// registration order; each invocation is adapted into a future resolving
/// to its keep/discard outcome. The caller joins the futures and ANDs the
/// outcomes, so a veto settling late still suppresses delivery and no
/// transport call can happen before every outcome is known.
pub fn run_chain(
    callbacks: &[OnError],
    event: &mut Event,
    logger: Option<Arc<dyn Logger>>,
) -> Vec<BoxFuture<'static, bool>> {
    callbacks
        .iter()
        .map(|callback| adapt(callback, event, logger.clone()))
        .collect()
}

fn adapt(
    callback: &OnError,
    event: &mut Event,
    logger: Option<Arc<dyn Logger>>,
) -> BoxFuture<'static, bool> {
    match callback {
        OnError::Sync(f) => {
            let outcome = match catch_unwind(AssertUnwindSafe(|| f(event))) {
                Ok(keep) => keep,
                Err(_) => {
                    warn(&logger, "onError callback panicked; discarding event");
                    false
                }
            };
            futures::future::ready(outcome).boxed()
        }
        OnError::Future(f) => match catch_unwind(AssertUnwindSafe(|| f(event))) {
            Ok(outcome) => async move {
                match AssertUnwindSafe(outcome).catch_unwind().await {
                    Ok(keep) => keep,
                    Err(_) => {
                        warn(&logger, "onError callback panicked; discarding event");
                        false
                    }
                }
            }
            .boxed(),
            Err(_) => {
                warn(&logger, "onError callback panicked; discarding event");
                futures::future::ready(false).boxed()
            }
        },
        OnError::Callback(f) => {
            let (handle, rx) = CompletionHandle::new();
            match catch_unwind(AssertUnwindSafe(|| f(event, handle))) {
                Ok(work) => async move {
                    // Drive any returned future first; the continuation is
                    // the sole source of the decision.
                    if let Some(future) = work {
                        if AssertUnwindSafe(future).catch_unwind().await.is_err() {
                            warn(&logger, "onError callback panicked; discarding event");
                            return false;
                        }
                    }
                    match rx.await {
                        Ok(keep) => keep,
                        Err(_) => {
                            warn(
                                &logger,
                                "onError continuation dropped without resolving; keeping event",
                            );
                            true
                        }
                    }
                }
                .boxed(),
                Err(_) => {
                    warn(&logger, "onError callback panicked; discarding event");
                    futures::future::ready(false).boxed()
                }
            }
        }
    }
}

fn warn(logger: &Option<Arc<dyn Logger>>, message: &str) {
    if let Some(logger) = logger {
        logger.warn(message);
    }
}

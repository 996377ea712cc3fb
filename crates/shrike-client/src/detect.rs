use shrike_core::ErrorReport;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Once, OnceLock, PoisonError};
use tracing::debug;

/// Callback invoked with the report captured from a global signal.
pub type SignalHandler = Arc<dyn Fn(ErrorReport) + Send + Sync>;

/// Registration seam for runtime-wide error signals.
///
/// Registration happens at client start only for the detection toggles
/// that survived config normalization; a disabled toggle means the
/// corresponding method is never called.
pub trait GlobalListeners: Send + Sync {
    /// Listen for unhandled exceptions (panics).
    fn register_error_handler(&self, handler: SignalHandler) -> ListenerHandle;

    /// Listen for unhandled rejections (asynchronous failures reported via
    /// [`report_unhandled_rejection`]).
    fn register_rejection_handler(&self, handler: SignalHandler) -> ListenerHandle;
}

/// Explicit handle to one registration. Unregistering is idempotent and
/// also happens when the handle is dropped, so listeners never outlive
/// the client that installed them.
pub struct ListenerHandle {
    unregister: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

impl ListenerHandle {
    pub fn new(unregister: impl FnOnce() + Send + 'static) -> Self {
        Self {
            unregister: Mutex::new(Some(Box::new(unregister))),
        }
    }

    pub fn unregister(&self) {
        let action = self
            .unregister
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(action) = action {
            action();
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.unregister();
    }
}

impl std::fmt::Debug for ListenerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ListenerHandle")
    }
}

type HandlerRegistry = Mutex<HashMap<u64, SignalHandler>>;

static ERROR_HANDLERS: OnceLock<HandlerRegistry> = OnceLock::new();
static REJECTION_HANDLERS: OnceLock<HandlerRegistry> = OnceLock::new();
static NEXT_HANDLER_ID: AtomicU64 = AtomicU64::new(0);
static PANIC_HOOK: Once = Once::new();

fn error_handlers() -> &'static HandlerRegistry {
    ERROR_HANDLERS.get_or_init(|| Mutex::new(HashMap::new()))
}

fn rejection_handlers() -> &'static HandlerRegistry {
    REJECTION_HANDLERS.get_or_init(|| Mutex::new(HashMap::new()))
}

fn snapshot(registry: &'static HandlerRegistry) -> Vec<SignalHandler> {
    registry
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .values()
        .cloned()
        .collect()
}

fn insert(registry: &'static HandlerRegistry, handler: SignalHandler) -> ListenerHandle {
    let id = NEXT_HANDLER_ID.fetch_add(1, Ordering::SeqCst);
    registry
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(id, handler);
    ListenerHandle::new(move || {
        registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
    })
}

/// Report an asynchronous failure that no task handled.
///
/// Spawned-task glue (or application code observing a failed join) feeds
/// rejections through here; every client with rejection detection enabled
/// receives the report through its normal dispatch path.
pub fn report_unhandled_rejection(report: impl Into<ErrorReport>) {
    let report = report.into();
    for handler in snapshot(rejection_handlers()) {
        handler(report.clone());
    }
}

/// Process-wide default listener implementation: a chained panic hook for
/// unhandled exceptions and a shared registry for rejections.
#[derive(Debug, Default)]
pub struct RuntimeListeners;

impl RuntimeListeners {
    pub fn new() -> Self {
        Self
    }

    fn install_panic_hook() {
        PANIC_HOOK.call_once(|| {
            let previous = std::panic::take_hook();
            std::panic::set_hook(Box::new(move |info| {
                let report = report_from_panic(info);
                for handler in snapshot(error_handlers()) {
                    handler(report.clone());
                }
                previous(info);
            }));
        });
    }
}

impl GlobalListeners for RuntimeListeners {
    fn register_error_handler(&self, handler: SignalHandler) -> ListenerHandle {
        Self::install_panic_hook();
        debug!("Registered unhandled-exception listener");
        insert(error_handlers(), handler)
    }

    fn register_rejection_handler(&self, handler: SignalHandler) -> ListenerHandle {
        debug!("Registered unhandled-rejection listener");
        insert(rejection_handlers(), handler)
    }
}

fn report_from_panic(info: &std::panic::PanicInfo<'_>) -> ErrorReport {
    let payload = info.payload();
    let message = if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unhandled panic".to_string()
    };
    ErrorReport::new("panic", message)
}

/// Test double mirroring a global listener registry: records what was
/// registered and lets tests fire synthetic signals.
#[derive(Default)]
pub struct RecordingListeners {
    error_handlers: Mutex<HashMap<u64, SignalHandler>>,
    rejection_handlers: Mutex<HashMap<u64, SignalHandler>>,
    error_registrations: AtomicU64,
    rejection_registrations: AtomicU64,
    next_id: AtomicU64,
}

impl RecordingListeners {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Total number of registration calls, including unregistered ones.
    pub fn error_registration_count(&self) -> u64 {
        self.error_registrations.load(Ordering::SeqCst)
    }

    pub fn rejection_registration_count(&self) -> u64 {
        self.rejection_registrations.load(Ordering::SeqCst)
    }

    pub fn active_error_handlers(&self) -> usize {
        self.error_handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn active_rejection_handlers(&self) -> usize {
        self.rejection_handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Fire a synthetic unhandled exception at every registered handler.
    pub fn trigger_error(&self, report: ErrorReport) {
        let handlers: Vec<_> = self
            .error_handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        for handler in handlers {
            handler(report.clone());
        }
    }

    pub fn trigger_rejection(&self, report: ErrorReport) {
        let handlers: Vec<_> = self
            .rejection_handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        for handler in handlers {
            handler(report.clone());
        }
    }
}

impl GlobalListeners for Arc<RecordingListeners> {
    fn register_error_handler(&self, handler: SignalHandler) -> ListenerHandle {
        self.error_registrations.fetch_add(1, Ordering::SeqCst);
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.error_handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, handler);
        let me = Arc::clone(self);
        ListenerHandle::new(move || {
            me.error_handlers
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&id);
        })
    }

    fn register_rejection_handler(&self, handler: SignalHandler) -> ListenerHandle {
        self.rejection_registrations.fetch_add(1, Ordering::SeqCst);
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.rejection_handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, handler);
        let me = Arc::clone(self);
        ListenerHandle::new(move || {
            me.rejection_handlers
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&id);
        })
    }
}

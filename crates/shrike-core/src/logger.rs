use std::sync::Arc;

/// Console-shaped logging surface exposed to SDK users.
///
/// The internal pipeline reports its own failures (vetoed events, storage
/// problems, middleware panics) through this trait so that embedding
/// applications control where diagnostics end up.
pub trait Logger: Send + Sync {
    fn debug(&self, message: &str);
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
}

/// Default logger backed by the `tracing` macros.
///
/// Captured when the configuration is built, so later changes to the global
/// subscriber dispatch do not alter which backend the client reports
/// through.
#[derive(Debug, Default, Clone)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn debug(&self, message: &str) {
        tracing::debug!(target: "shrike", "{message}");
    }

    fn info(&self, message: &str) {
        tracing::info!(target: "shrike", "{message}");
    }

    fn warn(&self, message: &str) {
        tracing::warn!(target: "shrike", "{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "shrike", "{message}");
    }
}

/// How the internal logger should be wired.
#[derive(Clone, Default)]
pub enum LoggerSpec {
    /// Use the tracing-backed [`TracingLogger`].
    #[default]
    Standard,
    /// Suppress all internal logging.
    Disabled,
    /// Report through a user-supplied logger, passed through unchanged.
    Custom(Arc<dyn Logger>),
}

impl LoggerSpec {
    /// Resolve into the logger handed around the pipeline.
    /// `None` means logging is disabled.
    pub fn resolve(&self) -> Option<Arc<dyn Logger>> {
        match self {
            LoggerSpec::Standard => Some(Arc::new(TracingLogger)),
            LoggerSpec::Disabled => None,
            LoggerSpec::Custom(logger) => Some(Arc::clone(logger)),
        }
    }
}

impl std::fmt::Debug for LoggerSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoggerSpec::Standard => f.write_str("LoggerSpec::Standard"),
            LoggerSpec::Disabled => f.write_str("LoggerSpec::Disabled"),
            LoggerSpec::Custom(_) => f.write_str("LoggerSpec::Custom(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_spec_resolves_to_logger() {
        assert!(LoggerSpec::Standard.resolve().is_some());
    }

    #[test]
    fn test_disabled_spec_resolves_to_none() {
        assert!(LoggerSpec::Disabled.resolve().is_none());
    }

    #[test]
    fn test_custom_spec_passes_logger_through() {
        struct Capture;
        impl Logger for Capture {
            fn debug(&self, _: &str) {}
            fn info(&self, _: &str) {}
            fn warn(&self, _: &str) {}
            fn error(&self, _: &str) {}
        }

        let custom: Arc<dyn Logger> = Arc::new(Capture);
        let spec = LoggerSpec::Custom(Arc::clone(&custom));
        let resolved = spec.resolve().unwrap();
        assert!(Arc::ptr_eq(&custom, &resolved));
    }
}

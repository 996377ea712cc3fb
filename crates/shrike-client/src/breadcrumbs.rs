use shrike_core::{Breadcrumb, BreadcrumbType, Config, Logger, OnBreadcrumb};
use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Capped, most-recent-first log of breadcrumbs.
///
/// `append` runs the breadcrumb middleware chain and the type allow-list
/// before inserting; `snapshot` is a non-destructive read used when
/// building an event.
pub struct BreadcrumbLog {
    entries: VecDeque<Breadcrumb>,
    max: usize,
    enabled_types: Option<Vec<BreadcrumbType>>,
    callbacks: Vec<OnBreadcrumb>,
    logger: Option<Arc<dyn Logger>>,
}

impl BreadcrumbLog {
    pub fn from_config(config: &Config) -> Self {
        Self {
            entries: VecDeque::new(),
            max: config.max_breadcrumbs,
            enabled_types: config.enabled_breadcrumb_types.clone(),
            callbacks: config.on_breadcrumb.clone(),
            logger: config.logger.clone(),
        }
    }

    /// Append a breadcrumb unless a callback or the allow-list vetoes it.
    /// Returns whether the breadcrumb was kept.
    pub fn append(&mut self, mut crumb: Breadcrumb) -> bool {
        // Callbacks run in registration order; the first `false`
        // short-circuits the rest of the chain.
        for callback in &self.callbacks {
            match catch_unwind(AssertUnwindSafe(|| callback(&mut crumb))) {
                Ok(true) => {}
                Ok(false) => {
                    self.log_debug("Breadcrumb vetoed by onBreadcrumb callback");
                    return false;
                }
                Err(_) => {
                    self.log_warn("onBreadcrumb callback panicked; discarding breadcrumb");
                    return false;
                }
            }
        }

        if let Some(types) = &self.enabled_types {
            if !types.contains(&crumb.kind) {
                self.log_debug(&format!(
                    "Discarding breadcrumb of disabled type '{}'",
                    crumb.kind
                ));
                return false;
            }
        }

        self.entries.push_front(crumb);
        self.entries.truncate(self.max);
        true
    }

    /// Current contents, most recent first.
    pub fn snapshot(&self) -> Vec<Breadcrumb> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn log_debug(&self, message: &str) {
        if let Some(logger) = &self.logger {
            logger.debug(message);
        }
    }

    fn log_warn(&self, message: &str) {
        if let Some(logger) = &self.logger {
            logger.warn(message);
        }
    }
}

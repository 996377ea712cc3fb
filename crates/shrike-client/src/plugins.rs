use crate::client::Client;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

/// Extension loaded into a client for the lifetime of a session.
///
/// `destroy` is optional: implementors that clean up on session pause
/// override both `destroy` and `has_destroy`. The capability is resolved
/// once at registration, not probed at each lifecycle transition.
pub trait Plugin: Send + Sync {
    fn load(&self, client: &Client);

    fn destroy(&self) {}

    fn has_destroy(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PluginState {
    Unloaded,
    Loaded,
}

struct RegisteredPlugin {
    plugin: Arc<dyn Plugin>,
    can_destroy: bool,
}

/// Loads every registered plugin when a session becomes active and
/// destroys the destroy-capable ones when it pauses. Identity is by
/// registration position, not by name.
pub struct PluginManager {
    plugins: Vec<RegisteredPlugin>,
    state: Mutex<PluginState>,
}

impl PluginManager {
    pub fn new(plugins: Vec<Arc<dyn Plugin>>) -> Self {
        let plugins = plugins
            .into_iter()
            .map(|plugin| RegisteredPlugin {
                can_destroy: plugin.has_destroy(),
                plugin,
            })
            .collect();

        Self {
            plugins,
            state: Mutex::new(PluginState::Unloaded),
        }
    }

    pub fn is_loaded(&self) -> bool {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) == PluginState::Loaded
    }

    /// Invoke `load(client)` on every plugin in registration order.
    pub fn load_all(&self, client: &Client) {
        for (index, registered) in self.plugins.iter().enumerate() {
            let plugin = Arc::clone(&registered.plugin);
            if catch_unwind(AssertUnwindSafe(|| plugin.load(client))).is_err() {
                warn!("Plugin #{index} panicked during load; skipping it");
            }
        }
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = PluginState::Loaded;
        debug!("Loaded {} plugin(s)", self.plugins.len());
    }

    /// Invoke `destroy()` on every destroy-capable plugin.
    pub fn destroy_all(&self) {
        for (index, registered) in self.plugins.iter().enumerate() {
            if !registered.can_destroy {
                continue;
            }
            let plugin = Arc::clone(&registered.plugin);
            if catch_unwind(AssertUnwindSafe(|| plugin.destroy())).is_err() {
                warn!("Plugin #{index} panicked during destroy");
            }
        }
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = PluginState::Unloaded;
    }
}

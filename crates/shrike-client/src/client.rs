use crate::breadcrumbs::BreadcrumbLog;
use crate::detect::{GlobalListeners, ListenerHandle, RuntimeListeners};
use crate::identity;
use crate::middleware;
use crate::plugins::{Plugin, PluginManager};
use crate::redact::redact_metadata;
use crate::session::Session;
use serde_json::{Map, Value};
use shrike_core::{
    AppInfo, Breadcrumb, BreadcrumbType, Config, ConfigBuilder, DeviceInfo, ErrorReport, Event,
    FeatureFlag, FeatureFlagSet, Logger, Result, ShrikeError, User,
};
use shrike_storage::{DeviceStore, FileStore, MemoryStore};
use shrike_transport::{EventTransport, HttpTransport};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::{debug, info, instrument, warn};

/// The error-monitoring client: builds events, runs them through the
/// filter chains and hands survivors to the transport.
///
/// Cheap to clone; all clones share one pipeline.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    config: Arc<Config>,
    logger: Option<Arc<dyn Logger>>,
    breadcrumbs: Mutex<BreadcrumbLog>,
    features: Mutex<FeatureFlagSet>,
    metadata: Mutex<Map<String, Value>>,
    user: RwLock<User>,
    context: RwLock<Option<String>>,
    sessions: Mutex<SessionState>,
    plugins: PluginManager,
    transport: Arc<dyn EventTransport>,
    runtime: tokio::runtime::Handle,
    listeners: Mutex<Vec<ListenerHandle>>,
}

#[derive(Default)]
struct SessionState {
    active: Option<Session>,
    paused: Option<Session>,
}

/// Wires a configuration together with plugins and collaborator
/// overrides. The defaults are the HTTP transport, the filesystem device
/// store and the process-wide listener registry.
pub struct ClientBuilder {
    config: ConfigBuilder,
    plugins: Vec<Arc<dyn Plugin>>,
    transport: Option<Arc<dyn EventTransport>>,
    store: Option<Arc<dyn DeviceStore>>,
    listeners: Option<Arc<dyn GlobalListeners>>,
}

impl ClientBuilder {
    pub fn new(config: impl Into<ConfigBuilder>) -> Self {
        Self {
            config: config.into(),
            plugins: Vec::new(),
            transport: None,
            store: None,
            listeners: None,
        }
    }

    /// Adjust the configuration in place.
    pub fn configure(mut self, f: impl FnOnce(ConfigBuilder) -> ConfigBuilder) -> Self {
        self.config = f(self.config);
        self
    }

    pub fn plugin(mut self, plugin: Arc<dyn Plugin>) -> Self {
        self.plugins.push(plugin);
        self
    }

    pub fn plugins(mut self, plugins: impl IntoIterator<Item = Arc<dyn Plugin>>) -> Self {
        self.plugins.extend(plugins);
        self
    }

    pub fn transport(mut self, transport: Arc<dyn EventTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn store(mut self, store: Arc<dyn DeviceStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn global_listeners(mut self, listeners: impl GlobalListeners + 'static) -> Self {
        self.listeners = Some(Arc::new(listeners));
        self
    }

    /// Construct the client without starting a session; plugins stay
    /// unloaded until one starts.
    pub fn create(self) -> Result<Client> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| ShrikeError::Runtime {
            message: "Shrike requires a running Tokio runtime".to_string(),
        })?;

        let mut config = self.config.build();

        let store: Arc<dyn DeviceStore> = match self.store {
            Some(store) => store,
            None => match FileStore::new() {
                Ok(store) => Arc::new(store),
                Err(e) => {
                    warn!(target: "shrike", "Device storage unavailable ({e}); identifiers will not persist");
                    Arc::new(MemoryStore::new())
                }
            },
        };

        config.user = identity::resolve_user(
            std::mem::take(&mut config.user),
            config.generate_anonymous_id,
            store.as_ref(),
            config.logger.as_ref(),
        );

        let transport: Arc<dyn EventTransport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new().map_err(|e| ShrikeError::Config {
                message: format!("Failed to create HTTP transport: {e}"),
            })?),
        };

        let listener_seam: Arc<dyn GlobalListeners> = self
            .listeners
            .unwrap_or_else(|| Arc::new(RuntimeListeners::new()));

        let logger = config.logger.clone();
        let breadcrumbs = BreadcrumbLog::from_config(&config);
        let features = FeatureFlagSet::from_flags(config.feature_flags.iter().cloned());
        let metadata = config.metadata.clone();
        let user = config.user.clone();
        let context = config.context.clone();
        let plugins = PluginManager::new(self.plugins);

        let client = Client {
            inner: Arc::new(ClientInner {
                config: Arc::new(config),
                logger,
                breadcrumbs: Mutex::new(breadcrumbs),
                features: Mutex::new(features),
                metadata: Mutex::new(metadata),
                user: RwLock::new(user),
                context: RwLock::new(context),
                sessions: Mutex::new(SessionState::default()),
                plugins,
                transport,
                runtime,
                listeners: Mutex::new(Vec::new()),
            }),
        };

        client.register_global_listeners(listener_seam.as_ref());
        info!(target: "shrike", "Client created");
        Ok(client)
    }

    /// Construct the client and immediately start a session, loading
    /// every registered plugin.
    pub fn start(self) -> Result<Client> {
        let client = self.create()?;
        client.start_session();
        Ok(client)
    }
}

impl Client {
    pub fn builder(config: impl Into<ConfigBuilder>) -> ClientBuilder {
        ClientBuilder::new(config)
    }

    /// Construct a client with default collaborators and no session.
    pub fn create(config: impl Into<ConfigBuilder>) -> Result<Self> {
        ClientBuilder::new(config).create()
    }

    /// Construct a client with default collaborators and start a session.
    pub fn start(config: impl Into<ConfigBuilder>) -> Result<Self> {
        ClientBuilder::new(config).start()
    }

    /// The active, immutable configuration.
    pub fn config(&self) -> Arc<Config> {
        Arc::clone(&self.inner.config)
    }

    /// Report an error.
    ///
    /// Returns synchronously; asynchronous middleware resolves in the
    /// background and the transport is only invoked once every callback's
    /// outcome is settled and none vetoed. Never panics or returns an
    /// error: every internal failure degrades to "event not delivered"
    /// plus a log line.
    #[instrument(skip(self, error))]
    pub fn notify(&self, error: impl Into<ErrorReport>) {
        let report = error.into();
        let mut event = self.build_event(&report);

        // Callbacks run synchronously here, in registration order; each
        // is adapted into an outcome future joined in the spawned task.
        let outcomes = middleware::run_chain(
            &self.inner.config.on_error,
            &mut event,
            self.inner.logger.clone(),
        );

        // Recorded after the event's snapshot was taken: the crumb shows
        // up on subsequent events only.
        self.leave_error_breadcrumb(&report);

        let transport = Arc::clone(&self.inner.transport);
        let config = Arc::clone(&self.inner.config);
        let logger = self.inner.logger.clone();

        self.inner.runtime.spawn(async move {
            let keep = futures::future::join_all(outcomes)
                .await
                .into_iter()
                .all(|keep| keep);

            if !keep {
                log_debug(&logger, "Event vetoed by an onError callback");
                return;
            }

            if !config.should_notify() {
                log_debug(
                    &logger,
                    &format!(
                        "Release stage '{}' is not enabled; discarding event",
                        config.release_stage
                    ),
                );
                return;
            }

            if let Err(e) = transport
                .post_event(event, logger.clone(), Arc::clone(&config))
                .await
            {
                log_warn(&logger, &format!("Failed to deliver event: {e}"));
            }
        });
    }

    /// Report a std error, capturing its display output.
    pub fn notify_error(&self, error: &dyn std::error::Error) {
        self.notify(ErrorReport::from_error(error));
    }

    /// Record a `manual`-typed breadcrumb.
    pub fn leave_breadcrumb(&self, message: impl Into<String>) {
        self.append_breadcrumb(Breadcrumb::manual(message));
    }

    /// Record a breadcrumb with an explicit type and metadata.
    pub fn leave_breadcrumb_full(
        &self,
        message: impl Into<String>,
        metadata: Option<Map<String, Value>>,
        kind: BreadcrumbType,
    ) {
        self.append_breadcrumb(Breadcrumb::new(message, metadata, kind));
    }

    /// Record a `log`-typed breadcrumb; used by the log-capture layer.
    pub fn log_breadcrumb(&self, message: &str) {
        self.append_breadcrumb(Breadcrumb::new(message, None, BreadcrumbType::Log));
    }

    pub fn get_user(&self) -> User {
        self.inner
            .user
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_user(&self, user: User) {
        *self
            .inner
            .user
            .write()
            .unwrap_or_else(PoisonError::into_inner) = user;
    }

    pub fn set_context(&self, context: Option<String>) {
        *self
            .inner
            .context
            .write()
            .unwrap_or_else(PoisonError::into_inner) = context;
    }

    /// Add or replace a top-level metadata section for future events.
    pub fn add_metadata(&self, section: impl Into<String>, value: Value) {
        self.inner
            .metadata
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(section.into(), value);
    }

    pub fn clear_metadata(&self, section: &str) {
        self.inner
            .metadata
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(section);
    }

    pub fn add_feature_flag(&self, name: impl Into<String>, variant: Option<String>) {
        self.inner
            .features
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .add(name, variant);
    }

    pub fn add_feature_flags(&self, flags: impl IntoIterator<Item = FeatureFlag>) {
        self.inner
            .features
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .merge(flags);
    }

    pub fn clear_feature_flag(&self, name: &str) {
        self.inner
            .features
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear(name);
    }

    pub fn clear_feature_flags(&self) {
        self.inner
            .features
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear_all();
    }

    /// Start a fresh session and load every registered plugin.
    #[instrument(skip(self))]
    pub fn start_session(&self) {
        {
            let mut sessions = self
                .inner
                .sessions
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            let session = Session::new();
            info!(target: "shrike", "Session started: {}", session.id);
            sessions.active = Some(session);
            sessions.paused = None;
        }
        self.inner.plugins.load_all(self);
    }

    /// Pause the active session and destroy destroy-capable plugins.
    #[instrument(skip(self))]
    pub fn pause_session(&self) {
        {
            let mut sessions = self
                .inner
                .sessions
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if let Some(active) = sessions.active.take() {
                info!(target: "shrike", "Session paused: {}", active.id);
                sessions.paused = Some(active);
            }
        }
        self.inner.plugins.destroy_all();
    }

    /// Resume the paused session (or start a new one) and reload plugins.
    #[instrument(skip(self))]
    pub fn resume_session(&self) {
        {
            let mut sessions = self
                .inner
                .sessions
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            let session = sessions.paused.take().unwrap_or_default();
            info!(target: "shrike", "Session resumed: {}", session.id);
            sessions.active = Some(session);
        }
        self.inner.plugins.load_all(self);
    }

    pub fn current_session(&self) -> Option<Session> {
        self.inner
            .sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .active
            .clone()
    }

    /// Whether the registered plugins are currently loaded.
    pub fn plugins_loaded(&self) -> bool {
        self.inner.plugins.is_loaded()
    }

    fn append_breadcrumb(&self, crumb: Breadcrumb) {
        self.inner
            .breadcrumbs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .append(crumb);
    }

    fn leave_error_breadcrumb(&self, report: &ErrorReport) {
        let mut metadata = Map::new();
        metadata.insert(
            "errorClass".to_string(),
            Value::String(report.error_class.clone()),
        );
        metadata.insert("message".to_string(), Value::String(report.message.clone()));
        self.append_breadcrumb(Breadcrumb::new(
            report.error_class.clone(),
            Some(metadata),
            BreadcrumbType::Error,
        ));
    }

    /// Assemble the enriched event for one report. Every shared source is
    /// read under its lock within this one call, so concurrent dispatches
    /// each see a consistent snapshot.
    fn build_event(&self, report: &ErrorReport) -> Event {
        let config = &self.inner.config;
        Event {
            api_key: config.api_key.clone(),
            exceptions: vec![report.clone()],
            app: AppInfo {
                app_type: config.app_type.clone(),
                version: config.app_version.clone(),
                release_stage: Some(config.release_stage.clone()),
            },
            device: DeviceInfo::capture(),
            breadcrumbs: self
                .inner
                .breadcrumbs
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .snapshot(),
            feature_flags: self
                .inner
                .features
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
            metadata: redact_metadata(
                &self
                    .inner
                    .metadata
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner),
                &config.redacted_keys,
            ),
            user: self
                .inner
                .user
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
            context: self
                .inner
                .context
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
        }
    }

    fn register_global_listeners(&self, seam: &dyn GlobalListeners) {
        let toggles = self.inner.config.enabled_error_types;
        let mut handles = Vec::new();

        if toggles.unhandled_exceptions {
            let weak = Arc::downgrade(&self.inner);
            handles.push(seam.register_error_handler(Arc::new(move |report| {
                if let Some(inner) = weak.upgrade() {
                    Client { inner }.notify(report);
                }
            })));
        }

        if toggles.unhandled_rejections {
            let weak = Arc::downgrade(&self.inner);
            handles.push(seam.register_rejection_handler(Arc::new(move |report| {
                if let Some(inner) = weak.upgrade() {
                    Client { inner }.notify(report);
                }
            })));
        }

        if !handles.is_empty() {
            debug!(target: "shrike", "Registered {} global listener(s)", handles.len());
            self.inner
                .listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .extend(handles);
        }
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("api_key", &self.inner.config.api_key)
            .field("release_stage", &self.inner.config.release_stage)
            .finish()
    }
}

fn log_debug(logger: &Option<Arc<dyn Logger>>, message: &str) {
    if let Some(logger) = logger {
        logger.debug(message);
    }
}

fn log_warn(logger: &Option<Arc<dyn Logger>>, message: &str) {
    if let Some(logger) = logger {
        logger.warn(message);
    }
}

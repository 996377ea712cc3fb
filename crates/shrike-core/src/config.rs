use crate::breadcrumb::BreadcrumbType;
use crate::callbacks::{OnBreadcrumb, OnError};
use crate::feature_flags::FeatureFlag;
use crate::logger::{Logger, LoggerSpec};
use crate::user::User;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::Arc;

pub const DEFAULT_MAX_BREADCRUMBS: usize = 25;
pub const DEFAULT_RELEASE_STAGE: &str = "production";
pub const DEFAULT_NOTIFY_ENDPOINT: &str = "https://notify.shrike.dev";
pub const DEFAULT_SESSIONS_ENDPOINT: &str = "https://sessions.shrike.dev";

/// Where surviving events and session payloads are delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub notify: String,
    pub sessions: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            notify: DEFAULT_NOTIFY_ENDPOINT.to_string(),
            sessions: DEFAULT_SESSIONS_ENDPOINT.to_string(),
        }
    }
}

/// A metadata key selector: either an exact literal or a pattern.
#[derive(Debug, Clone)]
pub enum RedactedKey {
    Literal(String),
    Pattern(Regex),
}

impl RedactedKey {
    pub fn literal(key: impl Into<String>) -> Self {
        RedactedKey::Literal(key.into())
    }

    pub fn pattern(pattern: Regex) -> Self {
        RedactedKey::Pattern(pattern)
    }

    /// Key-name matching only; values are never inspected.
    pub fn matches(&self, key: &str) -> bool {
        match self {
            RedactedKey::Literal(literal) => literal == key,
            RedactedKey::Pattern(pattern) => pattern.is_match(key),
        }
    }
}

/// Raw per-type detection toggles as supplied by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ErrorTypeToggles {
    pub unhandled_exceptions: Option<bool>,
    pub unhandled_rejections: Option<bool>,
}

/// Normalized detection toggles after precedence rules are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnabledErrorTypes {
    pub unhandled_exceptions: bool,
    pub unhandled_rejections: bool,
}

/// Immutable-after-start configuration record.
///
/// Produced by [`ConfigBuilder::build`]; every option is fully populated,
/// never partially defaulted.
pub struct Config {
    pub api_key: String,
    pub app_type: Option<String>,
    pub app_version: Option<String>,
    pub context: Option<String>,
    pub release_stage: String,
    pub enabled_release_stages: Option<Vec<String>>,
    pub enabled_breadcrumb_types: Option<Vec<BreadcrumbType>>,
    pub max_breadcrumbs: usize,
    pub endpoints: Endpoints,
    /// Resolved internal logger; `None` when logging is disabled.
    pub logger: Option<Arc<dyn Logger>>,
    pub redacted_keys: Vec<RedactedKey>,
    pub feature_flags: Vec<FeatureFlag>,
    pub metadata: Map<String, Value>,
    pub user: User,
    pub on_error: Vec<OnError>,
    pub on_breadcrumb: Vec<OnBreadcrumb>,
    pub auto_detect_errors: bool,
    pub enabled_error_types: EnabledErrorTypes,
    pub generate_anonymous_id: bool,
}

impl Config {
    pub fn builder(api_key: impl Into<String>) -> ConfigBuilder {
        ConfigBuilder::new(api_key)
    }

    /// A configuration with only the identifying key set and every other
    /// option defaulted.
    pub fn from_api_key(api_key: impl Into<String>) -> Self {
        ConfigBuilder::new(api_key).build()
    }

    /// Release-stage gating: events pass when no allow-list is configured
    /// or the active stage is a member.
    pub fn should_notify(&self) -> bool {
        match &self.enabled_release_stages {
            None => true,
            Some(stages) => stages.iter().any(|s| s == &self.release_stage),
        }
    }

    /// Breadcrumb type allow-list; `None` accepts every type.
    pub fn allows_breadcrumb_type(&self, kind: BreadcrumbType) -> bool {
        match &self.enabled_breadcrumb_types {
            None => true,
            Some(types) => types.contains(&kind),
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key)
            .field("app_type", &self.app_type)
            .field("app_version", &self.app_version)
            .field("context", &self.context)
            .field("release_stage", &self.release_stage)
            .field("enabled_release_stages", &self.enabled_release_stages)
            .field("enabled_breadcrumb_types", &self.enabled_breadcrumb_types)
            .field("max_breadcrumbs", &self.max_breadcrumbs)
            .field("endpoints", &self.endpoints)
            .field("logger", &self.logger.as_ref().map(|_| "<logger>"))
            .field("redacted_keys", &self.redacted_keys)
            .field("user", &self.user)
            .field("on_error", &self.on_error.len())
            .field("on_breadcrumb", &self.on_breadcrumb.len())
            .field("auto_detect_errors", &self.auto_detect_errors)
            .field("enabled_error_types", &self.enabled_error_types)
            .field("generate_anonymous_id", &self.generate_anonymous_id)
            .finish()
    }
}

/// Accumulates raw options and normalizes them into a [`Config`].
#[derive(Default)]
pub struct ConfigBuilder {
    api_key: String,
    app_type: Option<String>,
    app_version: Option<String>,
    context: Option<String>,
    release_stage: Option<String>,
    enabled_release_stages: Option<Vec<String>>,
    enabled_breadcrumb_types: Option<Vec<BreadcrumbType>>,
    max_breadcrumbs: Option<usize>,
    endpoints: Option<Endpoints>,
    logger: LoggerSpec,
    redacted_keys: Vec<RedactedKey>,
    feature_flags: Vec<FeatureFlag>,
    metadata: Map<String, Value>,
    user: User,
    on_error: Vec<OnError>,
    on_breadcrumb: Vec<OnBreadcrumb>,
    auto_detect_errors: Option<bool>,
    error_type_toggles: ErrorTypeToggles,
    generate_anonymous_id: Option<bool>,
}

impl ConfigBuilder {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    pub fn app_type(mut self, app_type: impl Into<String>) -> Self {
        self.app_type = Some(app_type.into());
        self
    }

    pub fn app_version(mut self, app_version: impl Into<String>) -> Self {
        self.app_version = Some(app_version.into());
        self
    }

    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn release_stage(mut self, release_stage: impl Into<String>) -> Self {
        self.release_stage = Some(release_stage.into());
        self
    }

    pub fn enabled_release_stages(
        mut self,
        stages: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.enabled_release_stages = Some(stages.into_iter().map(Into::into).collect());
        self
    }

    pub fn enabled_breadcrumb_types(
        mut self,
        types: impl IntoIterator<Item = BreadcrumbType>,
    ) -> Self {
        self.enabled_breadcrumb_types = Some(types.into_iter().collect());
        self
    }

    pub fn max_breadcrumbs(mut self, max: usize) -> Self {
        self.max_breadcrumbs = Some(max);
        self
    }

    pub fn endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = Some(endpoints);
        self
    }

    pub fn logger(mut self, spec: LoggerSpec) -> Self {
        self.logger = spec;
        self
    }

    pub fn redacted_key(mut self, key: RedactedKey) -> Self {
        self.redacted_keys.push(key);
        self
    }

    pub fn redacted_keys(mut self, keys: impl IntoIterator<Item = RedactedKey>) -> Self {
        self.redacted_keys.extend(keys);
        self
    }

    pub fn feature_flag(mut self, name: impl Into<String>, variant: Option<String>) -> Self {
        self.feature_flags.push(FeatureFlag::new(name, variant));
        self
    }

    pub fn feature_flags(mut self, flags: impl IntoIterator<Item = FeatureFlag>) -> Self {
        self.feature_flags.extend(flags);
        self
    }

    pub fn metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn metadata_section(mut self, section: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(section.into(), value);
        self
    }

    pub fn user(mut self, user: User) -> Self {
        self.user = user;
        self
    }

    pub fn on_error(mut self, callback: OnError) -> Self {
        self.on_error.push(callback);
        self
    }

    pub fn on_breadcrumb(mut self, callback: OnBreadcrumb) -> Self {
        self.on_breadcrumb.push(callback);
        self
    }

    pub fn auto_detect_errors(mut self, enabled: bool) -> Self {
        self.auto_detect_errors = Some(enabled);
        self
    }

    pub fn enabled_error_types(mut self, toggles: ErrorTypeToggles) -> Self {
        self.error_type_toggles = toggles;
        self
    }

    pub fn generate_anonymous_id(mut self, enabled: bool) -> Self {
        self.generate_anonymous_id = Some(enabled);
        self
    }

    /// Normalize into a fully-populated configuration.
    ///
    /// Precedence for detection toggles: disabling `auto_detect_errors`
    /// suppresses both specific toggles regardless of their own values;
    /// otherwise each specific toggle defaults to active and an explicit
    /// `false` is honored.
    pub fn build(self) -> Config {
        let auto_detect_errors = self.auto_detect_errors.unwrap_or(true);
        let enabled_error_types = if auto_detect_errors {
            EnabledErrorTypes {
                unhandled_exceptions: self.error_type_toggles.unhandled_exceptions.unwrap_or(true),
                unhandled_rejections: self.error_type_toggles.unhandled_rejections.unwrap_or(true),
            }
        } else {
            EnabledErrorTypes {
                unhandled_exceptions: false,
                unhandled_rejections: false,
            }
        };

        Config {
            api_key: self.api_key,
            app_type: self.app_type,
            app_version: self.app_version,
            context: self.context,
            release_stage: self
                .release_stage
                .unwrap_or_else(|| DEFAULT_RELEASE_STAGE.to_string()),
            enabled_release_stages: self.enabled_release_stages,
            enabled_breadcrumb_types: self.enabled_breadcrumb_types,
            max_breadcrumbs: self.max_breadcrumbs.unwrap_or(DEFAULT_MAX_BREADCRUMBS),
            endpoints: self.endpoints.unwrap_or_default(),
            // Captured here, not looked up at log time.
            logger: self.logger.resolve(),
            redacted_keys: self.redacted_keys,
            feature_flags: self.feature_flags,
            metadata: self.metadata,
            user: self.user,
            on_error: self.on_error,
            on_breadcrumb: self.on_breadcrumb,
            auto_detect_errors,
            enabled_error_types,
            generate_anonymous_id: self.generate_anonymous_id.unwrap_or(true),
        }
    }
}

impl From<&str> for ConfigBuilder {
    fn from(api_key: &str) -> Self {
        ConfigBuilder::new(api_key)
    }
}

impl From<String> for ConfigBuilder {
    fn from(api_key: String) -> Self {
        ConfigBuilder::new(api_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_api_key_fills_every_default() {
        let config = Config::from_api_key("key-1");
        assert_eq!(config.api_key, "key-1");
        assert_eq!(config.release_stage, DEFAULT_RELEASE_STAGE);
        assert_eq!(config.max_breadcrumbs, DEFAULT_MAX_BREADCRUMBS);
        assert_eq!(config.endpoints, Endpoints::default());
        assert!(config.logger.is_some());
        assert!(config.enabled_release_stages.is_none());
        assert!(config.enabled_breadcrumb_types.is_none());
        assert!(config.auto_detect_errors);
        assert!(config.enabled_error_types.unhandled_exceptions);
        assert!(config.enabled_error_types.unhandled_rejections);
        assert!(config.generate_anonymous_id);
        assert!(config.user.id.is_none());
        assert!(config.metadata.is_empty());
    }

    #[test]
    fn test_bare_key_equivalent_to_structured_default() {
        let bare = Config::from_api_key("key-2");
        let structured = ConfigBuilder::new("key-2").build();
        assert_eq!(bare.api_key, structured.api_key);
        assert_eq!(bare.release_stage, structured.release_stage);
        assert_eq!(bare.max_breadcrumbs, structured.max_breadcrumbs);
        assert_eq!(bare.endpoints, structured.endpoints);
        assert_eq!(bare.enabled_error_types, structured.enabled_error_types);
        assert_eq!(bare.generate_anonymous_id, structured.generate_anonymous_id);
    }

    #[test]
    fn test_auto_detect_disabled_overrides_explicit_toggles() {
        let config = ConfigBuilder::new("key")
            .auto_detect_errors(false)
            .enabled_error_types(ErrorTypeToggles {
                unhandled_exceptions: Some(true),
                unhandled_rejections: Some(true),
            })
            .build();

        assert!(!config.enabled_error_types.unhandled_exceptions);
        assert!(!config.enabled_error_types.unhandled_rejections);
    }

    #[test]
    fn test_specific_toggles_default_active() {
        for auto in [None, Some(true)] {
            let mut builder = ConfigBuilder::new("key");
            if let Some(auto) = auto {
                builder = builder.auto_detect_errors(auto);
            }
            let config = builder.build();
            assert!(config.enabled_error_types.unhandled_exceptions);
            assert!(config.enabled_error_types.unhandled_rejections);
        }
    }

    #[test]
    fn test_explicit_false_toggle_is_honored_independently() {
        let config = ConfigBuilder::new("key")
            .enabled_error_types(ErrorTypeToggles {
                unhandled_exceptions: Some(false),
                unhandled_rejections: None,
            })
            .build();

        assert!(!config.enabled_error_types.unhandled_exceptions);
        assert!(config.enabled_error_types.unhandled_rejections);

        let config = ConfigBuilder::new("key")
            .enabled_error_types(ErrorTypeToggles {
                unhandled_exceptions: None,
                unhandled_rejections: Some(false),
            })
            .build();

        assert!(config.enabled_error_types.unhandled_exceptions);
        assert!(!config.enabled_error_types.unhandled_rejections);
    }

    #[test]
    fn test_disabled_logger_resolves_to_none() {
        let config = ConfigBuilder::new("key").logger(LoggerSpec::Disabled).build();
        assert!(config.logger.is_none());
    }

    #[test]
    fn test_custom_logger_passes_through() {
        struct Quiet;
        impl Logger for Quiet {
            fn debug(&self, _: &str) {}
            fn info(&self, _: &str) {}
            fn warn(&self, _: &str) {}
            fn error(&self, _: &str) {}
        }

        let custom: Arc<dyn Logger> = Arc::new(Quiet);
        let config = ConfigBuilder::new("key")
            .logger(LoggerSpec::Custom(Arc::clone(&custom)))
            .build();
        assert!(Arc::ptr_eq(&custom, config.logger.as_ref().unwrap()));
    }

    #[test]
    fn test_release_stage_gating() {
        let config = ConfigBuilder::new("key").build();
        assert!(config.should_notify());

        let config = ConfigBuilder::new("key")
            .release_stage("development")
            .enabled_release_stages(["staging", "production"])
            .build();
        assert!(!config.should_notify());

        for stage in ["staging", "production"] {
            let config = ConfigBuilder::new("key")
                .release_stage(stage)
                .enabled_release_stages(["staging", "production"])
                .build();
            assert!(config.should_notify(), "stage {stage} should pass");
        }
    }

    #[test]
    fn test_breadcrumb_type_allow_list() {
        let config = ConfigBuilder::new("key").build();
        assert!(config.allows_breadcrumb_type(BreadcrumbType::Error));

        let config = ConfigBuilder::new("key")
            .enabled_breadcrumb_types([BreadcrumbType::Log, BreadcrumbType::Manual])
            .build();
        assert!(config.allows_breadcrumb_type(BreadcrumbType::Log));
        assert!(config.allows_breadcrumb_type(BreadcrumbType::Manual));
        assert!(!config.allows_breadcrumb_type(BreadcrumbType::Error));
    }

    #[test]
    fn test_redacted_key_matching() {
        let literal = RedactedKey::literal("password");
        assert!(literal.matches("password"));
        assert!(!literal.matches("password2"));

        let pattern = RedactedKey::pattern(Regex::new("^secret-[a-z]+$").unwrap());
        assert!(pattern.matches("secret-token"));
        assert!(!pattern.matches("public-token"));
    }

    #[test]
    fn test_metadata_and_flags_carried_through() {
        let config = ConfigBuilder::new("key")
            .metadata_section("request", serde_json::json!({ "id": 42 }))
            .feature_flag("flag1", Some("red".to_string()))
            .feature_flag("flag2", None)
            .build();

        assert_eq!(config.metadata["request"]["id"], 42);
        assert_eq!(config.feature_flags.len(), 2);
        assert_eq!(config.feature_flags[0].name, "flag1");
    }
}

pub mod breadcrumb;
pub mod callbacks;
pub mod config;
pub mod error;
pub mod event;
pub mod feature_flags;
pub mod logger;
pub mod user;

pub use breadcrumb::{Breadcrumb, BreadcrumbType};
pub use callbacks::{CompletionHandle, OnBreadcrumb, OnError};
pub use config::{
    Config, ConfigBuilder, EnabledErrorTypes, Endpoints, ErrorTypeToggles, RedactedKey,
};
pub use error::{Result, ShrikeError};
pub use event::{AppInfo, DeviceInfo, ErrorReport, Event};
pub use feature_flags::{FeatureFlag, FeatureFlagSet};
pub use logger::{Logger, LoggerSpec, TracingLogger};
pub use user::User;

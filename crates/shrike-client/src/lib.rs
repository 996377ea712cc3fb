//! # Shrike Client
//!
//! The event-reporting pipeline of the Shrike error-monitoring SDK: raw
//! errors become enriched events, run through the configurable filter
//! chains, and are handed to the transport when they survive.
//!
//! ## Quick start
//!
//! ```ignore
//! use shrike_client::Client;
//!
//! #[tokio::main]
//! async fn main() -> shrike_core::Result<()> {
//!     let client = Client::start("my-api-key")?;
//!     client.leave_breadcrumb("app booted");
//!     client.notify("something went wrong");
//!     Ok(())
//! }
//! ```

pub mod breadcrumbs;
pub mod client;
pub mod detect;
pub mod identity;
pub mod log_capture;
pub mod middleware;
pub mod plugins;
pub mod redact;
pub mod session;

pub use breadcrumbs::BreadcrumbLog;
pub use client::{Client, ClientBuilder};
pub use detect::{
    report_unhandled_rejection, GlobalListeners, ListenerHandle, RecordingListeners,
    RuntimeListeners, SignalHandler,
};
pub use identity::USER_ID_STORAGE_KEY;
pub use log_capture::BreadcrumbLayer;
pub use plugins::{Plugin, PluginManager};
pub use redact::{redact_metadata, REDACTED};
pub use session::Session;

// Re-export the surface callers need to configure a client.
pub use shrike_core::{
    Breadcrumb, BreadcrumbType, CompletionHandle, Config, ConfigBuilder, Endpoints, ErrorReport,
    ErrorTypeToggles, Event, FeatureFlag, Logger, LoggerSpec, OnBreadcrumb, OnError, RedactedKey,
    Result, ShrikeError, User,
};

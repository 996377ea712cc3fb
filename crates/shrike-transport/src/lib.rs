//! Delivery collaborators for the event pipeline.
//!
//! The pipeline hands each surviving event to an [`EventTransport`]
//! exactly once; what happens on the wire (and whether a failed delivery
//! is retried) is the transport's concern, not the pipeline's.

pub mod error;
pub mod http;
pub mod mock;

pub use error::{Result, TransportError};
pub use http::HttpTransport;
pub use mock::{PostedEvent, RecordingTransport};

use async_trait::async_trait;
use shrike_core::{Config, Event, Logger};
use std::sync::Arc;

/// Receives fully-enriched events that passed every filter.
#[async_trait]
pub trait EventTransport: Send + Sync {
    /// Deliver one event. Invoked at most once per surviving event,
    /// together with the active configuration and the internal logger.
    async fn post_event(
        &self,
        event: Event,
        logger: Option<Arc<dyn Logger>>,
        config: Arc<Config>,
    ) -> Result<()>;
}

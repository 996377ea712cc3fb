use crate::error::Result;
use crate::EventTransport;
use async_trait::async_trait;
use shrike_core::{Config, Event, Logger};
use std::sync::{Arc, Mutex};

/// One captured `post_event` call.
#[derive(Clone)]
pub struct PostedEvent {
    pub event: Event,
    pub logger: Option<Arc<dyn Logger>>,
    pub config: Arc<Config>,
}

/// Transport double that records every delivery instead of sending it.
/// Useful in tests and for local development without network access.
#[derive(Default)]
pub struct RecordingTransport {
    calls: Mutex<Vec<PostedEvent>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<PostedEvent> {
        self.calls.lock().unwrap().clone()
    }

    /// The nth captured call, if delivery got that far.
    pub fn call(&self, index: usize) -> Option<PostedEvent> {
        self.calls.lock().unwrap().get(index).cloned()
    }
}

#[async_trait]
impl EventTransport for RecordingTransport {
    async fn post_event(
        &self,
        event: Event,
        logger: Option<Arc<dyn Logger>>,
        config: Arc<Config>,
    ) -> Result<()> {
        self.calls.lock().unwrap().push(PostedEvent {
            event,
            logger,
            config,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shrike_core::{ConfigBuilder, DeviceInfo, ErrorReport};

    fn sample_event(api_key: &str) -> Event {
        Event {
            api_key: api_key.to_string(),
            exceptions: vec![ErrorReport::new("Error", "boom")],
            app: Default::default(),
            device: DeviceInfo::capture(),
            breadcrumbs: Vec::new(),
            feature_flags: Default::default(),
            metadata: Default::default(),
            user: Default::default(),
            context: None,
        }
    }

    #[tokio::test]
    async fn test_records_calls_in_order() {
        let transport = RecordingTransport::new();
        let config = Arc::new(ConfigBuilder::new("key").build());

        for message in ["first", "second"] {
            let mut event = sample_event("key");
            event.exceptions[0].message = message.to_string();
            transport
                .post_event(event, None, Arc::clone(&config))
                .await
                .unwrap();
        }

        assert_eq!(transport.call_count(), 2);
        let calls = transport.calls();
        assert_eq!(calls[0].event.exceptions[0].message, "first");
        assert_eq!(calls[1].event.exceptions[0].message, "second");
        assert!(Arc::ptr_eq(&calls[0].config, &config));
    }
}

use crate::error::{Result, TransportError};
use crate::EventTransport;
use async_trait::async_trait;
use reqwest::header;
use shrike_core::{Config, Event, Logger};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

const DELIVERY_TIMEOUT: Duration = Duration::from_secs(30);

/// Delivers events as JSON POSTs to the configured notify endpoint.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static("shrike/0.1.0"),
        );

        let client = reqwest::Client::builder()
            .timeout(DELIVERY_TIMEOUT)
            .default_headers(headers)
            .build()
            .map_err(|e| TransportError::Configuration {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl EventTransport for HttpTransport {
    #[instrument(skip(self, event, _logger, config), fields(endpoint = %config.endpoints.notify))]
    async fn post_event(
        &self,
        event: Event,
        _logger: Option<Arc<dyn Logger>>,
        config: Arc<Config>,
    ) -> Result<()> {
        debug!("Delivering event to {}", config.endpoints.notify);

        let response = self
            .client
            .post(&config.endpoints.notify)
            .header("Shrike-Api-Key", &config.api_key)
            .json(&event)
            .send()
            .await
            .map_err(|e| TransportError::Http {
                operation: "post_event".to_string(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Rejected {
                status: status.as_u16(),
            });
        }

        debug!("Event delivered ({})", status);
        Ok(())
    }
}

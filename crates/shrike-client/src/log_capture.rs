use crate::client::Client;
use tracing::field::{Field, Visit};
use tracing::Subscriber;
use tracing_subscriber::layer::{Context, Layer};

/// Layer that mirrors emitted log lines into `log`-typed breadcrumbs, so
/// application logging shows up as context on delivered events.
///
/// Install it on the subscriber stack alongside the usual fmt layer:
///
/// ```ignore
/// use tracing_subscriber::layer::SubscriberExt;
/// let subscriber = tracing_subscriber::registry()
///     .with(BreadcrumbLayer::new(client.clone()));
/// ```
pub struct BreadcrumbLayer {
    client: Client,
}

impl BreadcrumbLayer {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: Option<String>,
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" && self.message.is_none() {
            self.message = Some(format!("{:?}", value));
        }
    }
}

impl<S> Layer<S> for BreadcrumbLayer
where
    S: Subscriber + for<'lookup> tracing_subscriber::registry::LookupSpan<'lookup>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        // The pipeline's own diagnostics must not feed back into the log.
        if event.metadata().target().starts_with("shrike") {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        if let Some(message) = visitor.message {
            self.client.log_breadcrumb(&message);
        }
    }
}

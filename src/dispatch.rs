//! Delivering payloads without blocking the server

use crate::host::BackgroundExecutor;
use discord_webhook::{DeliveryError, Transport, Url, WebhookPayload};
use futures::FutureExt;
use std::{fmt::Debug, sync::Arc};

/// Starts every line the plugin logs about failed deliveries
pub const LOG_PREFIX: &str = "[DiscordCommandLogger]";

/// Told about every delivery that failed. Successes are silent
pub trait DeliveryLog: Send + Sync {
    fn failed(&self, error: &DeliveryError);
}

/// Writes failures to the log as errors
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLog;

impl DeliveryLog for TracingLog {
    fn failed(&self, error: &DeliveryError) {
        tracing::error!("{}", failure_line(error));
    }
}

pub fn failure_line(error: &DeliveryError) -> String {
    format!("{LOG_PREFIX} Error sending webhook: {error}")
}

/// Sends payloads to one webhook, one attempt each
#[derive(Clone)]
pub struct Dispatcher {
    url: Url,
    transport: Arc<dyn Transport>,
    executor: Arc<dyn BackgroundExecutor>,
    log: Arc<dyn DeliveryLog>,
}

impl Dispatcher {
    pub fn new(
        url: Url,
        transport: Arc<dyn Transport>,
        executor: Arc<dyn BackgroundExecutor>,
    ) -> Self {
        Self {
            url,
            transport,
            executor,
            log: Arc::new(TracingLog),
        }
    }

    #[must_use]
    pub fn with_log(mut self, log: Arc<dyn DeliveryLog>) -> Self {
        self.log = log;
        self
    }

    /// Serialize `payload` and hand its delivery to the background executor.
    /// Returns without waiting for the request
    pub fn dispatch(&self, payload: &WebhookPayload) {
        let body = match payload.to_json() {
            Ok(body) => body,
            Err(err) => {
                tracing::error!("{LOG_PREFIX} Couldn't serialize webhook payload: {err}");
                return;
            }
        };

        let url = self.url.clone();
        let transport = Arc::clone(&self.transport);
        let log = Arc::clone(&self.log);

        self.executor.submit(
            async move {
                if let Err(err) = transport.execute(&url, body).await {
                    log.failed(&err);
                }
            }
            .boxed(),
        );
    }
}

impl Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The path holds the webhook token
        f.debug_struct("Dispatcher")
            .field("host", &self.url.host_str())
            .field("transport", &self.transport)
            .finish_non_exhaustive()
    }
}

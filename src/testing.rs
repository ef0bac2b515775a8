//! Stand-ins for the network and the server's task pool

use crate::{dispatch::DeliveryLog, host::BackgroundExecutor};
use async_trait::async_trait;
use discord_webhook::{webhook_url, ClientOptions, DeliveryError, Transport, Url, WebhookClient};
use futures::future::BoxFuture;
use parking_lot::Mutex;
use tokio::net::TcpListener;

#[derive(Debug)]
enum Failure {
    Status(u16, &'static str),
    /// Nothing listens at this address
    Unreachable(Url),
}

/// Records requests instead of sending them
#[derive(Debug, Default)]
pub struct MockTransport {
    requests: Mutex<Vec<(Url, String)>>,
    failure: Option<Failure>,
}

impl MockTransport {
    pub fn succeeding() -> Self {
        Self::default()
    }

    pub fn failing(status: u16, body: &'static str) -> Self {
        Self {
            failure: Some(Failure::Status(status, body)),
            ..Self::default()
        }
    }

    /// Sends every request to a closed local port, so each one fails before
    /// there is an HTTP status
    pub async fn unreachable() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        drop(listener);

        Self {
            failure: Some(Failure::Unreachable(
                webhook_url(&format!("http://{address}/api/webhooks/1/token")).unwrap(),
            )),
            ..Self::default()
        }
    }

    pub fn requests(&self) -> Vec<(Url, String)> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, url: &Url, body: String) -> Result<(), DeliveryError> {
        self.requests.lock().push((url.clone(), body.clone()));

        match &self.failure {
            Some(Failure::Status(status, body)) => Err(DeliveryError::Status {
                status: *status,
                body: (*body).to_string(),
            }),
            Some(Failure::Unreachable(closed)) => {
                let client = WebhookClient::new(ClientOptions::default()).unwrap();
                client.execute(closed, body).await
            }
            None => Ok(()),
        }
    }
}

/// Holds submitted tasks until [`QueuedExecutor::run_all`]
#[derive(Default)]
pub struct QueuedExecutor(Mutex<Vec<BoxFuture<'static, ()>>>);

impl QueuedExecutor {
    pub fn pending(&self) -> usize {
        self.0.lock().len()
    }

    pub async fn run_all(&self) {
        let tasks = std::mem::take(&mut *self.0.lock());

        for task in tasks {
            task.await;
        }
    }
}

impl BackgroundExecutor for QueuedExecutor {
    fn submit(&self, task: BoxFuture<'static, ()>) {
        self.0.lock().push(task);
    }
}

#[derive(Debug, Default)]
pub struct RecordingLog(Mutex<Vec<String>>);

impl RecordingLog {
    pub fn lines(&self) -> Vec<String> {
        self.0.lock().clone()
    }
}

impl DeliveryLog for RecordingLog {
    fn failed(&self, error: &DeliveryError) {
        self.0.lock().push(crate::dispatch::failure_line(error));
    }
}

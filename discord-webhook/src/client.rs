use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client, StatusCode};
use std::{error::Error as _, fmt::Debug, time::Duration};
use url::Url;

/// How long a single delivery may take, connecting included
pub const TIMEOUT: Duration = Duration::from_secs(10);

#[derive(thiserror::Error, Debug)]
/// The [`WebhookClient`] couldn't be created
pub enum ClientError {
    /// reqwest refused the client configuration, usually a TLS backend issue
    #[error("Couldn't build the HTTP client: {0}")]
    Build(#[from] reqwest::Error),
    /// The webhook URL couldn't be parsed
    #[error("Invalid webhook URL: {0}")]
    Url(#[from] url::ParseError),
}

#[derive(thiserror::Error, Debug)]
/// A single delivery attempt failed
pub enum DeliveryError {
    /// The request never got a response: connection, TLS or timeout
    #[error("{} (HTTP: 0)", chain(.0))]
    Transport(reqwest::Error),
    /// Discord answered with anything but `200 OK`
    #[error("{body} (HTTP: {status})")]
    Status {
        /// The HTTP status code of the response
        status: u16,
        /// The response body, Discord puts the JSON error in here
        body: String,
    },
}

impl DeliveryError {
    /// The HTTP status of the response, if there was one
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Transport(_) => None,
            Self::Status { status, .. } => Some(*status),
        }
    }
}

impl From<reqwest::Error> for DeliveryError {
    fn from(error: reqwest::Error) -> Self {
        // The URL contains the webhook token
        Self::Transport(error.without_url())
    }
}

/// Join an error with all of its sources, reqwest hides the useful part in
/// there
fn chain(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();

    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }

    message
}

/// Something able to POST a JSON body to a webhook
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    /// Make exactly one delivery attempt, succeeding only on `200 OK`
    async fn execute(&self, url: &Url, body: String) -> Result<(), DeliveryError>;
}

/// Options for [`WebhookClient::new`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientOptions {
    /// Verify the server's TLS certificate. Turning this off lets anyone on
    /// the path read and forge deliveries
    pub verify_tls: bool,
    /// Total time allowed per request
    pub timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            verify_tls: true,
            timeout: TIMEOUT,
        }
    }
}

/// A pooled HTTP client for executing webhooks
#[derive(Debug, Clone)]
pub struct WebhookClient {
    http: Client,
}

impl WebhookClient {
    /// Creates a new client
    ///
    /// # Errors
    /// Returns [`ClientError::Build`] if the TLS backend can't be initialised
    pub fn new(options: ClientOptions) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(options.timeout)
            .danger_accept_invalid_certs(!options.verify_tls)
            .build()?;

        Ok(Self { http })
    }
}

#[async_trait]
impl Transport for WebhookClient {
    async fn execute(&self, url: &Url, body: String) -> Result<(), DeliveryError> {
        let response = self
            .http
            .post(url.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::OK {
            return Ok(());
        }

        Err(DeliveryError::Status {
            status: status.as_u16(),
            body: response.text().await.unwrap_or_default(),
        })
    }
}

/// Parse a webhook URL, asking Discord to wait for the message to be created
///
/// Without `wait=true` Discord answers `204 No Content` before the message
/// exists, so failures to post would go unnoticed.
///
/// # Errors
/// Returns [`ClientError::Url`] if `raw` isn't a valid absolute URL
pub fn webhook_url(raw: &str) -> Result<Url, ClientError> {
    let mut url = Url::parse(raw.trim())?;

    if !url.query_pairs().any(|(key, _)| key == "wait") {
        url.query_pairs_mut().append_pair("wait", "true");
    }

    Ok(url)
}

//! Executing Discord webhooks straight from their URL, a companion to the
//! [Twilight ecosystem](https://api.twilight.rs) models
//!
//! Refer to the modules' docs for more

#![warn(clippy::nursery, clippy::pedantic)]

/// The HTTP client that delivers payloads
pub mod client;
/// The bodies accepted by the execute webhook endpoint
pub mod payload;

pub use client::{webhook_url, ClientError, ClientOptions, DeliveryError, Transport, WebhookClient};
pub use payload::WebhookPayload;
pub use url::Url;

use serde::Serialize;
use twilight_model::channel::message::Embed;

/// A JSON body for `POST /webhooks/{id}/{token}`
///
/// Only the fields used for logging are modelled, Discord fills in the rest
/// from the webhook's own settings.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum WebhookPayload {
    /// A plain text message
    Plain {
        /// Overrides the webhook's display name
        username: String,
        /// The message text, at most 2000 characters
        content: String,
    },
    /// A message made of rich embeds
    Rich {
        /// Overrides the webhook's display name
        username: String,
        /// Overrides the webhook's avatar
        avatar_url: String,
        /// Up to 10 embeds
        embeds: Vec<Embed>,
    },
}

impl WebhookPayload {
    /// The name the message will be posted under
    #[must_use]
    pub fn username(&self) -> &str {
        match self {
            Self::Plain { username, .. } | Self::Rich { username, .. } => username,
        }
    }

    /// Serialize the payload into the request body
    ///
    /// # Errors
    /// Returns the [`serde_json::Error`] if an embed can't be serialized
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

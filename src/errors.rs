use std::{io, path::PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    // Config
    #[error(
        "Webhook URL not configured! Set it in {}, for example: \
         webhook-url = \"https://discord.com/api/webhooks/<id>/<token>\"",
        .path.display()
    )]
    MissingWebhookUrl { path: PathBuf },

    #[error("Couldn't access config at {}: {source}", .path.display())]
    ConfigIo { path: PathBuf, source: io::Error },

    // Webhook
    #[error(transparent)]
    Client(#[from] discord_webhook::ClientError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

//! Enabling and disabling the plugin on a server

use crate::{
    config::{self, Config},
    dispatch::{DeliveryLog, Dispatcher, TracingLog},
    errors::Result,
    host::Server,
    listener::CommandListener,
};
use discord_webhook::{webhook_url, ClientOptions, Transport, Url, WebhookClient};
use std::sync::Arc;

/// The enabled plugin
#[derive(Debug)]
pub struct CommandLogger {
    config: Arc<Config>,
}

impl CommandLogger {
    /// Load the config and start logging commands from `server`
    ///
    /// Nothing is registered if this fails, the plugin stays disabled
    pub fn enable(server: &mut dyn Server) -> Result<Self> {
        let enabled = Self::try_enable(server);

        if let Err(err) = &enabled {
            tracing::error!("{err}");
            tracing::error!("Discord Command Logger disabled");
        }

        enabled
    }

    fn try_enable(server: &mut dyn Server) -> Result<Self> {
        let config = Config::load(&server.data_dir())?;
        let url = webhook_url(config.webhook_url()?)?;

        let client = WebhookClient::new(ClientOptions {
            verify_tls: config.verify_tls,
            ..ClientOptions::default()
        })?;

        Ok(Self::start(server, config, url, Arc::new(client)))
    }

    /// Register the listener, delivering through `transport`
    pub fn start(
        server: &mut dyn Server,
        config: Config,
        url: Url,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self::start_with_log(server, config, url, transport, Arc::new(TracingLog))
    }

    /// [`CommandLogger::start`], reporting failed deliveries to `log`
    pub fn start_with_log(
        server: &mut dyn Server,
        mut config: Config,
        url: Url,
        transport: Arc<dyn Transport>,
        log: Arc<dyn DeliveryLog>,
    ) -> Self {
        config.sanitise();

        if !config::looks_like_discord_webhook(url.as_str()) {
            tracing::warn!(
                "The webhook URL in {} doesn't look like a Discord webhook",
                config.path.display()
            );
        }

        if !config.verify_tls {
            tracing::warn!("TLS certificate verification is disabled for webhook deliveries");
        }

        let config = Arc::new(config);
        let dispatcher = Dispatcher::new(url, transport, server.executor()).with_log(log);
        let listener = CommandListener::new(Arc::clone(&config), dispatcher, server.motd());

        server.events().register(Arc::new(listener));

        tracing::info!("Discord Command Logger enabled");

        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn disable(self) {
        tracing::info!("Discord Command Logger disabled");
    }
}

//! The plugin's `config.toml`, created with defaults on first run

use crate::errors::{Error, Result};
use chrono::format::{Item, StrftimeItems};
use lazy_regex::regex_is_match;
use serde::Deserialize;
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use twilight_validate::embed::COLOR_MAXIMUM;

pub const FILE_NAME: &str = "config.toml";

/// Environment variable taking precedence over `webhook-url`
pub const WEBHOOK_URL_VAR: &str = "WEBHOOK_URL";

/// Green
pub const DEFAULT_PLAYER_COLOR: u32 = 65280;
/// Red
pub const DEFAULT_CONSOLE_COLOR: u32 = 16711680;
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "[%Y-%m-%d %H:%M:%S]";

const DEFAULT_CONFIG: &str = r#"# Discord Command Logger

# The webhook every command is posted to. Required!
# Channel Settings > Integrations > Webhooks > Copy Webhook URL
webhook-url = ""

# Log commands run by players
log-player-commands = true

# Log commands run from the server console
log-console-commands = true

# Embed colours as packed RGB integers
embed-color-player = 65280
embed-color-console = 16711680

# "embed" for a rich embed, "plain" for a single line of text
message-style = "embed"

# strftime format of the timestamp that starts plain messages
timestamp-format = "[%Y-%m-%d %H:%M:%S]"

# Verify the webhook server's TLS certificate
verify-tls = true
"#;

/// How a command is presented in Discord
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MessageStyle {
    /// A rich embed with one field per detail
    #[default]
    Embed,
    /// A single line of markdown
    Plain,
}

/// Settings, immutable once loaded
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    pub webhook_url: String,
    pub log_player_commands: bool,
    pub log_console_commands: bool,
    pub embed_color_player: Option<u32>,
    pub embed_color_console: Option<u32>,
    pub message_style: MessageStyle,
    pub timestamp_format: String,
    pub verify_tls: bool,

    /// Where this config was loaded from
    #[serde(skip)]
    pub path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            webhook_url: String::new(),
            log_player_commands: true,
            log_console_commands: true,
            embed_color_player: None,
            embed_color_console: None,
            message_style: MessageStyle::default(),
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
            verify_tls: true,
            path: PathBuf::new(),
        }
    }
}

/// What was found on disk
enum Contents {
    Valid(Config),
    /// Missing or empty
    Absent,
    Corrupt(String),
}

impl Config {
    /// Load `config.toml` from `data_dir`, with [`WEBHOOK_URL_VAR`] overriding
    /// the webhook URL
    pub fn load(data_dir: &Path) -> Result<Self> {
        Self::load_with(data_dir, env::var(WEBHOOK_URL_VAR).ok())
    }

    pub fn load_with(data_dir: &Path, webhook_override: Option<String>) -> Result<Self> {
        let path = data_dir.join(FILE_NAME);

        let mut config = match Self::read(&path) {
            Contents::Valid(config) => config,
            Contents::Absent => {
                tracing::info!("Creating default config at {}", path.display());
                Self::write_default(&path)?;
                Self::reload(&path)
            }
            Contents::Corrupt(reason) => {
                tracing::warn!(
                    "Couldn't read config at {}, regenerating defaults: {reason}",
                    path.display()
                );
                Self::set_aside(&path);
                Self::write_default(&path)?;
                Self::reload(&path)
            }
        };

        if let Some(url) = webhook_override.filter(|url| !url.trim().is_empty()) {
            tracing::debug!("Using webhook URL from {WEBHOOK_URL_VAR}");
            config.webhook_url = url;
        }

        config.path = path;
        config.sanitise();

        Ok(config)
    }

    fn read(path: &Path) -> Contents {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Contents::Absent,
            Err(err) => return Contents::Corrupt(err.to_string()),
        };

        if content.trim().is_empty() {
            return Contents::Absent;
        }

        match toml::from_str(&content) {
            Ok(config) => Contents::Valid(config),
            Err(err) => Contents::Corrupt(err.message().to_string()),
        }
    }

    /// Read the file that was just written
    fn reload(path: &Path) -> Self {
        match Self::read(path) {
            Contents::Valid(config) => config,
            Contents::Absent | Contents::Corrupt(_) => Self::default(),
        }
    }

    fn write_default(path: &Path) -> Result<()> {
        let io_error = |source| Error::ConfigIo {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }

        fs::write(path, DEFAULT_CONFIG).map_err(io_error)
    }

    /// Keep a corrupt config around for the operator instead of overwriting it
    fn set_aside(path: &Path) {
        let broken = path.with_extension("toml.broken");

        match fs::rename(path, &broken) {
            Ok(()) => tracing::warn!("Moved the old config to {}", broken.display()),
            Err(err) => tracing::warn!("Couldn't move the old config aside: {err}"),
        }
    }

    /// Replace values Discord or chrono would reject with their defaults
    pub(crate) fn sanitise(&mut self) {
        let is_valid_format = !self.timestamp_format.is_empty()
            && !StrftimeItems::new(&self.timestamp_format).any(|item| matches!(item, Item::Error));

        if !is_valid_format {
            tracing::warn!(
                "Invalid timestamp-format {:?}, using {DEFAULT_TIMESTAMP_FORMAT:?}",
                self.timestamp_format
            );
            self.timestamp_format = DEFAULT_TIMESTAMP_FORMAT.to_string();
        }

        for (key, color) in [
            ("embed-color-player", &mut self.embed_color_player),
            ("embed-color-console", &mut self.embed_color_console),
        ] {
            if let Some(value) = color.filter(|value| *value > COLOR_MAXIMUM) {
                tracing::warn!("{key} {value} is larger than {COLOR_MAXIMUM}, using the default");
                *color = None;
            }
        }
    }

    /// The configured webhook URL
    ///
    /// # Errors
    /// [`Error::MissingWebhookUrl`] if it is empty
    pub fn webhook_url(&self) -> Result<&str> {
        match self.webhook_url.trim() {
            "" => Err(Error::MissingWebhookUrl {
                path: self.path.clone(),
            }),
            url => Ok(url),
        }
    }

    pub fn player_color(&self) -> u32 {
        self.embed_color_player.unwrap_or(DEFAULT_PLAYER_COLOR)
    }

    pub fn console_color(&self) -> u32 {
        self.embed_color_console.unwrap_or(DEFAULT_CONSOLE_COLOR)
    }
}

/// Whether `url` has the shape of a Discord webhook URL
pub fn looks_like_discord_webhook(url: &str) -> bool {
    regex_is_match!(
        r#"^https://(?:(?:ptb|canary)\.)?discord(?:app)?\.com/api(?:/v\d+)?/webhooks/\d+/[\w-]+/?(?:\?.*)?$"#,
        url
    )
}

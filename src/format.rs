//! Turning an executed command into a webhook payload

use crate::{
    config::{Config, MessageStyle, DEFAULT_TIMESTAMP_FORMAT},
    event::CommandKind,
};
use chrono::{DateTime, Local};
use discord_webhook::WebhookPayload;
use once_cell::sync::Lazy;
use std::{borrow::Cow, env, fmt::Write, fs};
use twilight_model::{channel::message::Embed, util::Timestamp};
use twilight_util::builder::embed::{
    EmbedBuilder, EmbedFieldBuilder, EmbedFooterBuilder, ImageSource,
};
use twilight_validate::embed::{FIELD_VALUE_LENGTH, FOOTER_TEXT_LENGTH};

pub const USERNAME: &str = "Command Logger";
pub const AVATAR_URL: &str = "https://mc-heads.net/avatar/MHF_Exclamation/512";
pub const FOOTER_ICON_URL: &str = "https://mc-heads.net/head/MHF_Chest/64";
pub const TITLE: &str = "🔧 Command Executed";

/// Longest `content` Discord accepts
const CONTENT_LENGTH: usize = 2000;
/// The code block around the command
const CODE_BLOCK_LENGTH: usize = 6;

static TIMEZONE: Lazy<String> = Lazy::new(timezone_name);

/// A command that should be logged
#[derive(Debug, Clone, Copy)]
pub struct LoggedCommand<'a> {
    pub executor: &'a str,
    /// Always starts with `/`
    pub command: &'a str,
    pub kind: CommandKind,
}

/// Build the payload in the configured style
pub fn payload(
    command: &LoggedCommand,
    config: &Config,
    motd: &str,
    now: DateTime<Local>,
) -> WebhookPayload {
    match config.message_style {
        MessageStyle::Embed => WebhookPayload::Rich {
            username: USERNAME.to_string(),
            avatar_url: AVATAR_URL.to_string(),
            embeds: vec![embed(command, config, motd, now)],
        },
        MessageStyle::Plain => WebhookPayload::Plain {
            username: USERNAME.to_string(),
            content: plain(command, &config.timestamp_format, now),
        },
    }
}

/// `{timestamp} COMMAND: `{command}` was sent by **{executor}**`
pub fn plain(command: &LoggedCommand, timestamp_format: &str, now: DateTime<Local>) -> String {
    let timestamp = timestamp(now, timestamp_format);
    let line = |text: &str| {
        format!(
            "{timestamp} COMMAND: `{text}` was sent by **{executor}**",
            executor = command.executor,
        )
    };

    let content = line(command.command);
    let length = content.chars().count();

    if length <= CONTENT_LENGTH {
        return content;
    }

    let overhead = length - command.command.chars().count();

    if overhead < CONTENT_LENGTH {
        return line(&truncate(command.command, CONTENT_LENGTH - overhead));
    }

    // The executor and timestamp alone don't fit
    truncate(&line(&truncate(command.command, 1)), CONTENT_LENGTH).into_owned()
}

/// `now` in `format`, or in the default format if chrono can't render `format`
fn timestamp(now: DateTime<Local>, format: &str) -> String {
    let mut timestamp = String::new();

    if write!(timestamp, "{}", now.format(format)).is_err() {
        tracing::warn!("Invalid timestamp-format {format:?}, using {DEFAULT_TIMESTAMP_FORMAT:?}");
        return now.format(DEFAULT_TIMESTAMP_FORMAT).to_string();
    }

    timestamp
}

pub fn embed(command: &LoggedCommand, config: &Config, motd: &str, now: DateTime<Local>) -> Embed {
    let color = match command.kind {
        CommandKind::Console => config.console_color(),
        CommandKind::Player => config.player_color(),
    };

    let mut footer = EmbedFooterBuilder::new(truncate(
        &format!("Server: {motd}"),
        FOOTER_TEXT_LENGTH,
    ));
    if let Ok(icon) = ImageSource::url(FOOTER_ICON_URL) {
        footer = footer.icon_url(icon);
    }

    let mut embed = EmbedBuilder::new()
        .title(TITLE)
        .color(color)
        .field(EmbedFieldBuilder::new("👤 Executor", command.executor).inline())
        .field(EmbedFieldBuilder::new(
            "⚡ Command",
            format!(
                "```{}```",
                truncate(command.command, FIELD_VALUE_LENGTH - CODE_BLOCK_LENGTH)
            ),
        ))
        .field(
            EmbedFieldBuilder::new(
                "🕐 Time",
                format!(
                    "{time} ({zone})",
                    time = now.format("%Y-%m-%d %H:%M:%S"),
                    zone = *TIMEZONE
                ),
            )
            .inline(),
        )
        .field(EmbedFieldBuilder::new("📍 Type", command.kind.to_string()).inline())
        .footer(footer);

    if let Ok(timestamp) = Timestamp::from_secs(now.timestamp()) {
        embed = embed.timestamp(timestamp);
    }

    let embed = embed.build();

    if let Err(err) = twilight_validate::embed::embed(&embed) {
        tracing::warn!("Discord is likely to reject this embed: {err}");
    }

    embed
}

/// Cut `text` down to `max` characters, marking the cut with an ellipsis
fn truncate(text: &str, max: usize) -> Cow<'_, str> {
    if text.chars().count() <= max {
        return Cow::Borrowed(text);
    }

    let mut truncated: String = text.chars().take(max.saturating_sub(1)).collect();
    truncated.push('…');

    Cow::Owned(truncated)
}

/// The name of the system's timezone, falling back to its UTC offset
fn timezone_name() -> String {
    if let Some(tz) = env::var("TZ")
        .ok()
        .map(|tz| tz.trim_start_matches(':').to_string())
        .filter(|tz| !tz.is_empty())
    {
        return tz;
    }

    // Usually a link to /usr/share/zoneinfo/Europe/London
    if let Ok(target) = fs::read_link("/etc/localtime") {
        if let Some((_, name)) = target.to_string_lossy().split_once("zoneinfo/") {
            return name.to_string();
        }
    }

    if let Ok(name) = fs::read_to_string("/etc/timezone") {
        let name = name.trim();
        if !name.is_empty() {
            return name.to_string();
        }
    }

    Local::now().format("UTC%:z").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use test_case::test_case;

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
    }

    fn steve() -> LoggedCommand<'static> {
        LoggedCommand {
            executor: "Steve",
            command: "/gamemode creative",
            kind: CommandKind::Player,
        }
    }

    fn console(command: &str) -> LoggedCommand<'_> {
        LoggedCommand {
            executor: "Console",
            command,
            kind: CommandKind::Console,
        }
    }

    #[test]
    fn embed_has_fields_in_order() {
        let embed = embed(&steve(), &Config::default(), "A Minecraft Server", now());

        let fields: Vec<_> = embed
            .fields
            .iter()
            .map(|field| (field.name.as_str(), field.inline))
            .collect();

        assert_eq!(embed.title.as_deref(), Some(TITLE));
        assert_eq!(
            fields,
            vec![
                ("👤 Executor", true),
                ("⚡ Command", false),
                ("🕐 Time", true),
                ("📍 Type", true),
            ]
        );
    }

    #[test]
    fn embed_values() {
        let embed = embed(&steve(), &Config::default(), "A Minecraft Server", now());

        assert_eq!(embed.fields[0].value, "Steve");
        assert_eq!(embed.fields[1].value, "```/gamemode creative```");
        assert!(embed.fields[2].value.starts_with("2024-01-02 03:04:05 ("));
        assert!(embed.fields[2].value.ends_with(')'));
        assert_eq!(embed.fields[3].value, "Player Command");
    }

    #[test]
    fn embed_footer_and_timestamp() {
        let embed = embed(&console("/stop"), &Config::default(), "A Minecraft Server", now());
        let footer = embed.footer.unwrap();

        assert_eq!(footer.text, "Server: A Minecraft Server");
        assert_eq!(footer.icon_url.as_deref(), Some(FOOTER_ICON_URL));
        assert_eq!(
            embed.timestamp,
            Some(Timestamp::from_secs(now().timestamp()).unwrap())
        );
    }

    #[test_case(CommandKind::Console, None, None, 16711680 ; "Console default")]
    #[test_case(CommandKind::Player, None, None, 65280 ; "Player default")]
    #[test_case(CommandKind::Console, Some(1), Some(2), 2 ; "Console configured")]
    #[test_case(CommandKind::Player, Some(1), Some(2), 1 ; "Player configured")]
    fn embed_color(kind: CommandKind, player: Option<u32>, console: Option<u32>, expected: u32) {
        let config = Config {
            embed_color_player: player,
            embed_color_console: console,
            ..Config::default()
        };
        let command = LoggedCommand {
            executor: "Alex",
            command: "/help",
            kind,
        };

        assert_eq!(embed(&command, &config, "", now()).color, Some(expected));
    }

    #[test]
    fn long_command_fits_in_field() {
        let long = format!("/say {}", "a".repeat(2000));
        let embed = embed(&console(&long), &Config::default(), "", now());
        let value = &embed.fields[1].value;

        assert_eq!(value.chars().count(), FIELD_VALUE_LENGTH);
        assert!(value.ends_with("…```"));
        assert!(twilight_validate::embed::embed(&embed).is_ok());
    }

    #[test]
    fn plain_message() {
        assert_eq!(
            plain(&console("/stop"), "[%Y-%m-%d %H:%M:%S]", now()),
            "[2024-01-02 03:04:05] COMMAND: `/stop` was sent by **Console**"
        );
    }

    #[test]
    fn plain_message_uses_format() {
        assert_eq!(
            plain(&steve(), "%H:%M", now()),
            "03:04 COMMAND: `/gamemode creative` was sent by **Steve**"
        );
    }

    #[test]
    fn long_plain_message_fits() {
        let long = format!("/say {}", "a".repeat(3000));
        let content = plain(&console(&long), "[%Y-%m-%d %H:%M:%S]", now());

        assert_eq!(content.chars().count(), CONTENT_LENGTH);
        assert!(content.ends_with("…` was sent by **Console**"));
    }

    #[test_case("a".repeat(3000), "[%Y-%m-%d %H:%M:%S]".to_string() ; "Long executor")]
    #[test_case("Steve".to_string(), "%Y".repeat(1000) ; "Long timestamp")]
    fn oversized_frame_is_cut(executor: String, format: String) {
        let command = LoggedCommand {
            executor: &executor,
            command: "/stop",
            kind: CommandKind::Player,
        };

        let content = plain(&command, &format, now());

        assert_eq!(content.chars().count(), CONTENT_LENGTH);
        assert!(content.ends_with('…'));
    }

    #[test_case("%Y-%m-%" ; "Dangling percent")]
    #[test_case("%Y-%m-%d %" ; "Trailing percent")]
    fn unrenderable_format_uses_default(format: &str) {
        assert_eq!(
            plain(&console("/stop"), format, now()),
            "[2024-01-02 03:04:05] COMMAND: `/stop` was sent by **Console**"
        );
    }

    #[test]
    fn style_selects_payload() {
        let embed_payload = payload(&steve(), &Config::default(), "motd", now());
        let plain_payload = payload(
            &steve(),
            &Config {
                message_style: MessageStyle::Plain,
                ..Config::default()
            },
            "motd",
            now(),
        );

        assert!(matches!(
            embed_payload,
            WebhookPayload::Rich { ref avatar_url, ref embeds, .. }
                if avatar_url == AVATAR_URL && embeds.len() == 1
        ));
        assert!(matches!(plain_payload, WebhookPayload::Plain { .. }));
        assert_eq!(embed_payload.username(), USERNAME);
        assert_eq!(plain_payload.username(), USERNAME);
    }

    #[test]
    fn rich_payload_json() {
        let json = payload(&steve(), &Config::default(), "motd", now())
            .to_json()
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["username"], USERNAME);
        assert_eq!(value["embeds"][0]["fields"][1]["name"], "⚡ Command");
        assert_eq!(
            value["embeds"][0]["fields"][1]["value"],
            "```/gamemode creative```"
        );
        assert_eq!(value["embeds"][0]["color"], 65280);
    }
}

use crate::{
    config::Config,
    dispatch::Dispatcher,
    event::{CommandEvent, CommandKind},
    format::{self, LoggedCommand},
    host::CommandHandler,
};
use chrono::Local;
use std::sync::Arc;

/// Forwards executed commands to the webhook, honouring the per-sender
/// toggles
#[derive(Debug)]
pub struct CommandListener {
    config: Arc<Config>,
    dispatcher: Dispatcher,
    motd: String,
}

impl CommandListener {
    pub fn new(config: Arc<Config>, dispatcher: Dispatcher, motd: String) -> Self {
        Self {
            config,
            dispatcher,
            motd,
        }
    }

    fn is_enabled(&self, kind: CommandKind) -> bool {
        match kind {
            CommandKind::Console => self.config.log_console_commands,
            CommandKind::Player => self.config.log_player_commands,
        }
    }
}

impl CommandHandler for CommandListener {
    fn on_command(&self, event: &CommandEvent) {
        let (executor, kind) = event.sender.classify();

        if !self.is_enabled(kind) {
            tracing::trace!("Not logging {kind}: {event}");
            return;
        }

        let Some(command) = event.normalized_command() else {
            tracing::debug!("Ignoring empty command from {executor}");
            return;
        };

        let payload = format::payload(
            &LoggedCommand {
                executor,
                command: &command,
                kind,
            },
            &self.config,
            &self.motd,
            Local::now(),
        );

        self.dispatcher.dispatch(&payload);
    }
}

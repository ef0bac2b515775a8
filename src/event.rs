use std::fmt::Display;

/// Who ran a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sender {
    /// The server console
    Console,
    /// An in-game player, by name
    Player(String),
}

/// The label shown as the "Type" of a logged command
#[derive(strum::Display, strum::AsRefStr, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    #[strum(serialize = "Console Command")]
    Console,
    #[strum(serialize = "Player Command")]
    Player,
}

impl Sender {
    /// The name to log the command under, and what kind of command it is
    pub fn classify(&self) -> (&str, CommandKind) {
        match self {
            Sender::Console => ("Console", CommandKind::Console),
            Sender::Player(name) => (name, CommandKind::Player),
        }
    }
}

/// A command that the server has executed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandEvent {
    pub sender: Sender,
    /// The command as typed, with or without the leading `/`
    pub command: String,
}

impl CommandEvent {
    pub fn console(command: impl Into<String>) -> Self {
        Self {
            sender: Sender::Console,
            command: command.into(),
        }
    }

    pub fn player(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            sender: Sender::Player(name.into()),
            command: command.into(),
        }
    }

    /// The command with a leading `/`, or `None` if nothing was run
    pub fn normalized_command(&self) -> Option<String> {
        match self.command.trim() {
            "" | "/" => None,
            command if command.starts_with('/') => Some(command.to_string()),
            command => Some(format!("/{command}")),
        }
    }
}

impl Display for CommandEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (executor, _) = self.sender.classify();

        write!(f, "{executor} ran {command}", command = self.command.trim())
    }
}

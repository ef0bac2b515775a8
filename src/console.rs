//! A minimal server driven by standard input, for running the plugin on its
//! own
//!
//! Every line is executed as a console command, except `@<ign> <command>`
//! which is executed as the player `<ign>`.

use crate::{
    event::CommandEvent,
    host::{BackgroundExecutor, EventBus, EventSource, Server, TokioExecutor},
};
use lazy_regex::regex_captures;
use std::{env, path::PathBuf, sync::Arc, time::Duration};
use tokio::runtime::Handle;

pub const DEFAULT_DATA_DIR: &str = "plugins/DiscordCommandLogger";
pub const DEFAULT_MOTD: &str = "A Minecraft Server";

#[derive(Debug)]
pub struct ConsoleServer {
    bus: EventBus,
    data_dir: PathBuf,
    motd: String,
    executor: Arc<TokioExecutor>,
}

impl ConsoleServer {
    pub fn new(data_dir: PathBuf, motd: String, handle: Handle) -> Self {
        Self {
            bus: EventBus::new(),
            data_dir,
            motd,
            executor: Arc::new(TokioExecutor::new(handle)),
        }
    }

    /// Configured by `DATA_DIR` and `SERVER_MOTD`
    pub fn from_env(handle: Handle) -> Self {
        Self::new(
            env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR)),
            env::var("SERVER_MOTD").unwrap_or_else(|_| DEFAULT_MOTD.to_string()),
            handle,
        )
    }

    /// Execute one line of input
    pub fn execute(&self, line: &str) {
        if let Some(event) = parse_line(line) {
            tracing::info!("{event}");
            self.bus.publish(&event);
        }
    }

    /// Give in-flight deliveries up to `timeout` to finish
    pub async fn shutdown(&self, timeout: Duration) {
        self.executor.drain(timeout).await;
    }
}

impl Server for ConsoleServer {
    fn motd(&self) -> String {
        self.motd.clone()
    }

    fn data_dir(&self) -> PathBuf {
        self.data_dir.clone()
    }

    fn events(&mut self) -> &mut dyn EventSource {
        &mut self.bus
    }

    fn executor(&self) -> Arc<dyn BackgroundExecutor> {
        self.executor.clone()
    }
}

/// Turn a line of input into the command it runs
pub fn parse_line(line: &str) -> Option<CommandEvent> {
    let line = line.trim();

    if line.is_empty() {
        return None;
    }

    if !line.starts_with('@') {
        return Some(CommandEvent::console(line));
    }

    match regex_captures!(r#"^@([A-Za-z0-9_]{1,16})\s+(\S.*)$"#, line) {
        Some((_, ign, command)) => Some(CommandEvent::player(ign, command)),
        None => {
            tracing::warn!("Expected `@<ign> <command>`, got {line:?}");
            None
        }
    }
}

//! The parts of the game server the plugin talks to

use crate::event::CommandEvent;
use futures::future::{self, BoxFuture};
use parking_lot::Mutex;
use std::{fmt::Debug, path::PathBuf, sync::Arc, time::Duration};
use tokio::{runtime::Handle, task::JoinHandle};

/// Receives every command the server executes
pub trait CommandHandler: Send + Sync {
    /// Called on the server's thread, must return quickly
    fn on_command(&self, event: &CommandEvent);
}

/// Somewhere command handlers can be registered
pub trait EventSource {
    fn register(&mut self, handler: Arc<dyn CommandHandler>);
}

/// Runs work off the server's thread. Tasks are fire-and-forget
pub trait BackgroundExecutor: Send + Sync {
    fn submit(&self, task: BoxFuture<'static, ()>);
}

/// The server a plugin is enabled on
pub trait Server {
    /// The server's message of the day
    fn motd(&self) -> String;
    /// The plugin's private data directory
    fn data_dir(&self) -> PathBuf;
    fn events(&mut self) -> &mut dyn EventSource;
    fn executor(&self) -> Arc<dyn BackgroundExecutor>;
}

/// Spawns tasks onto a tokio runtime, keeping track of the unfinished ones
#[derive(Debug)]
pub struct TokioExecutor {
    handle: Handle,
    running: Mutex<Vec<JoinHandle<()>>>,
}

impl TokioExecutor {
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            running: Mutex::new(Vec::new()),
        }
    }

    /// Wait up to `timeout` for every submitted task to finish
    pub async fn drain(&self, timeout: Duration) {
        let running = std::mem::take(&mut *self.running.lock());
        let count = running.len();

        if count == 0 {
            return;
        }

        tracing::debug!("Waiting for {count} task(s) to finish");

        if tokio::time::timeout(timeout, future::join_all(running))
            .await
            .is_err()
        {
            tracing::warn!("Tasks took longer than {timeout:?} to finish, abandoning them");
        }
    }
}

impl BackgroundExecutor for TokioExecutor {
    fn submit(&self, task: BoxFuture<'static, ()>) {
        let spawned = self.handle.spawn(task);

        let mut running = self.running.lock();
        running.retain(|task| !task.is_finished());
        running.push(spawned);
    }
}

/// An in-process [`EventSource`] which hands each published event to every
/// handler, in registration order
#[derive(Default)]
pub struct EventBus {
    handlers: Vec<Arc<dyn CommandHandler>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, event: &CommandEvent) {
        tracing::trace!("Publishing {event}");

        for handler in &self.handlers {
            handler.on_command(event);
        }
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

impl EventSource for EventBus {
    fn register(&mut self, handler: Arc<dyn CommandHandler>) {
        self.handlers.push(handler);
    }
}

impl Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

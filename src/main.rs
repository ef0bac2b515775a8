//! Runs the Discord Command Logger against a server whose console is
//! standard input

use command_logger::{console::ConsoleServer, CommandLogger};
use discord_webhook::client::TIMEOUT;
use std::process::ExitCode;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    runtime::Handle,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let mut server = ConsoleServer::from_env(Handle::current());

    // The reason has already been logged
    let Ok(plugin) = CommandLogger::enable(&mut server) else {
        return ExitCode::FAILURE;
    };

    let result = run(&server).await;

    plugin.disable();
    server.shutdown(TIMEOUT).await;

    match result {
        Ok(Stop::EndOfInput) => ExitCode::SUCCESS,
        // The stdin reader thread can't be cancelled and would keep the
        // runtime alive until the next line
        Ok(Stop::Interrupted) => std::process::exit(130),
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Why [`run`] returned
enum Stop {
    EndOfInput,
    Interrupted,
}

/// Execute stdin line by line until it closes or Ctrl-C is pressed
async fn run(server: &ConsoleServer) -> anyhow::Result<Stop> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => server.execute(&line),
                None => return Ok(Stop::EndOfInput),
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutting down...");
                return Ok(Stop::Interrupted);
            }
        }
    }
}

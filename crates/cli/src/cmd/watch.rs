//! Run a page session driven by stdin
//!
//! One command per line:
//! - `load`, `visible`, `click`: page events
//! - `hash <hash>`: navigate, then a hash change event
//! - `message <json>`: a runtime message, e.g. `{"type":"ping"}`
//! - `quit` (or end of input): wait for pending work and exit

use crate::host::ConsolePage;
use crate::util::Paths;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use runtime::{PageEvent, PageSession, RuntimeMessage};
use std::sync::Arc;
use tm_core::SystemClock;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

/// Parsed stdin line
#[derive(Debug, PartialEq)]
enum Input {
    Event(PageEvent),
    Navigate(String),
    Message(RuntimeMessage),
    Quit,
}

fn parse_line(line: &str) -> Result<Option<Input>> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let input = match word {
        "" => return Ok(None),
        "load" => Input::Event(PageEvent::Load),
        "visible" => Input::Event(PageEvent::VisibilityChange),
        "click" => Input::Event(PageEvent::Click {
            on_trim_toggle: false,
        }),
        "hash" if !rest.is_empty() => Input::Navigate(rest.to_string()),
        "hash" => anyhow::bail!("Usage: hash <location-hash>"),
        "message" => Input::Message(
            serde_json::from_str(rest).context("Invalid message JSON")?,
        ),
        "quit" | "exit" => Input::Quit,
        other => anyhow::bail!("Unknown command: {}", other),
    };
    Ok(Some(input))
}

pub async fn run(paths: &Paths, hash: &str) -> Result<()> {
    let config = paths.load_config()?;
    let storage = paths.open_storage()?;
    let page = ConsolePage::new(hash);

    let session = PageSession::new(
        storage,
        Arc::clone(&page),
        Arc::new(SystemClock),
        config.session_config(),
    );
    let listener = session.start().await;
    info!(hash, "Page session started");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read stdin")?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else { break };

        match parse_line(&line) {
            Ok(None) => {}
            Ok(Some(Input::Quit)) => break,
            Ok(Some(Input::Event(event))) => session.on_event(event),
            Ok(Some(Input::Navigate(hash))) => {
                page.navigate(&hash);
                session.on_event(PageEvent::HashChange);
            }
            Ok(Some(Input::Message(message))) => {
                if let Some(response) = session.on_message(&message).await {
                    println!("{}", serde_json::to_string(&response)?);
                }
            }
            Err(e) => {
                warn!(error = %e, "Ignoring input line");
                eprintln!("{} {}", "error:".red(), e);
            }
        }
    }

    session.settle().await;
    listener.abort();
    Ok(())
}

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{load_settings, ChatSession, SessionHandle};
use session_store::{seed, SessionStore};
use shared::protocol::ViewEvent;
use tokio::{
    sync::broadcast::{self, error::RecvError},
    time::{sleep, Duration},
};
use tracing::info;

mod script;

use script::{load_script, ScriptStep};

/// Replays a scripted consultation against the interaction engine and prints
/// every view event followed by the final view as JSON.
#[derive(Parser, Debug)]
struct Args {
    /// JSON array of script steps.
    #[arg(long)]
    script: PathBuf,
    /// JSON array of seed messages; the built-in opening conversation is used otherwise.
    #[arg(long)]
    seed: Option<PathBuf>,
    /// Settings file; defaults to `consult.toml` when present.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Run on the async runtime with real waits instead of the logical clock.
    #[arg(long)]
    realtime: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let settings = load_settings(args.config.as_deref())?;
    let store = match &args.seed {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read seed '{}'", path.display()))?;
            let messages = seed::parse_seed(&raw)
                .with_context(|| format!("invalid seed '{}'", path.display()))?;
            SessionStore::from_seed(messages)?
        }
        None => SessionStore::from_seed(seed::consultation_opening())?,
    };
    let steps = load_script(&args.script)?;
    info!(steps = steps.len(), realtime = args.realtime, "replaying script");

    let session = ChatSession::new(settings, store);
    let session = if args.realtime {
        replay_realtime(session, steps).await?
    } else {
        replay_logical(session, steps)?
    };

    println!("{}", serde_json::to_string_pretty(&session.view())?);
    Ok(())
}

fn replay_logical(mut session: ChatSession, steps: Vec<ScriptStep>) -> Result<ChatSession> {
    for step in steps {
        let events = match step {
            ScriptStep::Wait { wait_ms } => session.advance(wait_ms),
            ScriptStep::Append { append } => rejected_or(session.append_message(append)),
            ScriptStep::Intent(intent) => rejected_or(session.apply(intent)),
        };
        for event in &events {
            print_event(event)?;
        }
    }
    // Let pending timers and animations run out.
    while let Some(wakeup) = session.next_wakeup() {
        for event in &session.advance_to(wakeup) {
            print_event(event)?;
        }
    }
    Ok(session)
}

async fn replay_realtime(session: ChatSession, steps: Vec<ScriptStep>) -> Result<ChatSession> {
    let handle = SessionHandle::spawn(session);
    let printer = tokio::spawn(forward_events(handle.subscribe(), print_event));

    for step in steps {
        match step {
            ScriptStep::Wait { wait_ms } => sleep(Duration::from_millis(wait_ms)).await,
            ScriptStep::Append { append } => handle.append(append).await?,
            ScriptStep::Intent(intent) => handle.submit(intent).await?,
        }
    }
    // Flush queued commands before stopping.
    handle.snapshot().await?;
    let session = handle.shutdown().await?;
    printer.await.context("event printer failed")?;
    Ok(session)
}

/// Hands every broadcast event to `sink` until the channel closes. A lagging
/// receiver skips what it missed and keeps going.
async fn forward_events(
    mut events: broadcast::Receiver<ViewEvent>,
    mut sink: impl FnMut(&ViewEvent) -> Result<()>,
) {
    loop {
        match events.recv().await {
            Ok(event) => {
                if let Err(err) = sink(&event) {
                    tracing::error!(error = %err, "failed to print event");
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "event printer fell behind");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

fn rejected_or(
    result: Result<Vec<ViewEvent>, shared::error::ChatError>,
) -> Vec<ViewEvent> {
    result.unwrap_or_else(|err| {
        tracing::warn!(error = %err, "step rejected");
        vec![ViewEvent::Rejected(err.into())]
    })
}

fn print_event(event: &ViewEvent) -> Result<()> {
    println!("{}", serde_json::to_string(event)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn forwarding_survives_a_lagged_receiver() {
        let (sender, receiver) = broadcast::channel(2);
        for _ in 0..3 {
            sender.send(ViewEvent::ReactionPickerClosed).expect("send");
        }
        sender.send(ViewEvent::SessionEnded).expect("send");
        drop(sender);

        let mut seen = Vec::new();
        forward_events(receiver, |event| {
            seen.push(event.clone());
            Ok(())
        })
        .await;

        assert_eq!(
            seen,
            vec![ViewEvent::ReactionPickerClosed, ViewEvent::SessionEnded]
        );
    }
}

//! Async driver that owns a [`ChatSession`] on a tokio task, maps wall-clock
//! time onto the engine's logical clock and fans view events out to subscribers.

use anyhow::{anyhow, Context, Result};
use shared::{
    domain::Message,
    error::ErrorReport,
    protocol::{ChatView, Intent, ViewEvent},
};
use tokio::{
    sync::{broadcast, mpsc, oneshot},
    task::JoinHandle,
    time::{self, Duration, Instant},
};
use tracing::{debug, info, warn};

use crate::session::ChatSession;

const COMMAND_BUFFER: usize = 64;
const EVENT_BUFFER: usize = 1024;

#[derive(Debug)]
enum RuntimeCommand {
    Intent(Intent),
    Append(Message),
    Snapshot(oneshot::Sender<ChatView>),
    Shutdown,
}

pub struct SessionHandle {
    commands: mpsc::Sender<RuntimeCommand>,
    events: broadcast::Sender<ViewEvent>,
    task: JoinHandle<ChatSession>,
}

impl SessionHandle {
    /// Moves `session` onto a background task. Must be called inside a tokio runtime.
    pub fn spawn(session: ChatSession) -> Self {
        let (commands, receiver) = mpsc::channel(COMMAND_BUFFER);
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        let task = tokio::spawn(run(session, receiver, events.clone()));
        Self {
            commands,
            events,
            task,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ViewEvent> {
        self.events.subscribe()
    }

    /// Queues an intent. Rejections arrive as [`ViewEvent::Rejected`].
    pub async fn submit(&self, intent: Intent) -> Result<()> {
        self.send(RuntimeCommand::Intent(intent)).await
    }

    /// Queues a message from another participant.
    pub async fn append(&self, message: Message) -> Result<()> {
        self.send(RuntimeCommand::Append(message)).await
    }

    pub async fn snapshot(&self) -> Result<ChatView> {
        let (reply, view) = oneshot::channel();
        self.send(RuntimeCommand::Snapshot(reply)).await?;
        view.await.context("session runtime dropped snapshot request")
    }

    /// Stops the driver and hands back the session in its final state.
    pub async fn shutdown(self) -> Result<ChatSession> {
        self.send(RuntimeCommand::Shutdown).await?;
        self.task.await.context("session runtime task failed")
    }

    async fn send(&self, command: RuntimeCommand) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| anyhow!("session runtime has stopped"))
    }
}

async fn run(
    mut session: ChatSession,
    mut commands: mpsc::Receiver<RuntimeCommand>,
    events: broadcast::Sender<ViewEvent>,
) -> ChatSession {
    let clock = LogicalClock::start(session.now_ms());
    info!(now_ms = session.now_ms(), "session runtime started");

    loop {
        let wakeup = session.next_wakeup().and_then(|at| clock.instant_for(at));
        tokio::select! {
            command = commands.recv() => {
                publish(&events, session.advance_to(clock.now_ms()));
                match command {
                    Some(RuntimeCommand::Intent(intent)) => match session.apply(intent) {
                        Ok(emitted) => publish(&events, emitted),
                        Err(err) => {
                            warn!(error = %err, "intent rejected");
                            publish(&events, [ViewEvent::Rejected(ErrorReport::from(err))]);
                        }
                    },
                    Some(RuntimeCommand::Append(message)) => match session.append_message(message) {
                        Ok(emitted) => publish(&events, emitted),
                        Err(err) => {
                            warn!(error = %err, "message rejected");
                            publish(&events, [ViewEvent::Rejected(ErrorReport::from(err))]);
                        }
                    },
                    Some(RuntimeCommand::Snapshot(reply)) => {
                        if reply.send(session.view()).is_err() {
                            debug!("snapshot requester went away");
                        }
                    }
                    Some(RuntimeCommand::Shutdown) | None => break,
                }
            }
            _ = sleep_until(wakeup) => {
                publish(&events, session.advance_to(clock.now_ms()));
            }
        }
    }

    info!(now_ms = session.now_ms(), "session runtime stopped");
    session
}

fn publish(events: &broadcast::Sender<ViewEvent>, emitted: impl IntoIterator<Item = ViewEvent>) {
    for event in emitted {
        // No subscribers is fine; the view can always be pulled with a snapshot.
        let _ = events.send(event);
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Anchors the session's logical milliseconds to a tokio instant.
struct LogicalClock {
    origin: Instant,
    base_ms: u64,
}

impl LogicalClock {
    fn start(base_ms: u64) -> Self {
        Self {
            origin: Instant::now(),
            base_ms,
        }
    }

    fn now_ms(&self) -> u64 {
        let elapsed = u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.base_ms.saturating_add(elapsed)
    }

    /// `None` when the deadline lies beyond what the platform clock can represent.
    fn instant_for(&self, logical_ms: u64) -> Option<Instant> {
        self.origin
            .checked_add(Duration::from_millis(logical_ms.saturating_sub(self.base_ms)))
    }
}

#[cfg(test)]
#[path = "tests/runtime_tests.rs"]
mod tests;
